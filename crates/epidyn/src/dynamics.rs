// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::register;
use crate::trend::TrendOptions;
use chrono::NaiveDate;
use epidyn_core::{DateAxis, EpiError, EpiResult, Observation, PhaseSpan, STATE_VARIABLES, StateTable};
use epidyn_models::{OdeModel, validate_tau};
use std::marker::PhantomData;

/// Phase-dependent dynamics of one ODE model over a fixed date range.
///
/// Owns the date-indexed state table and the instance-wide tau setting.
/// Registration and segmentation replace the table wholesale, so a failed
/// call leaves the previous table intact.
#[derive(Clone, Debug)]
pub struct Dynamics<M: OdeModel> {
    pub(crate) table: StateTable,
    pub(crate) tau: Option<u32>,
    pub(crate) name: Option<String>,
    _model: PhantomData<M>,
}

impl<M: OdeModel> Dynamics<M> {
    /// Creates an empty instance over the closed range `[first, last]`.
    pub fn new(first: NaiveDate, last: NaiveDate) -> EpiResult<Self> {
        let axis = DateAxis::new(first, last)?;
        let param_names = M::PARAMETERS.iter().map(|&n| n.to_string()).collect();
        Ok(Self {
            table: StateTable::new(axis, param_names),
            tau: None,
            name: None,
            _model: PhantomData,
        })
    }

    /// Creates an instance and registers `rows` in one step.
    pub fn from_data(first: NaiveDate, last: NaiveDate, rows: &[Observation]) -> EpiResult<Self> {
        let mut dynamics = Self::new(first, last)?;
        dynamics.register(rows)?;
        Ok(dynamics)
    }

    /// Creates an instance seeded with the model's sample initial state and
    /// parameter values on the first date, with tau preset to 1440.
    pub fn from_sample(first: NaiveDate, last: NaiveDate) -> EpiResult<Self> {
        let mut dynamics = Self::new(first, last)?;
        dynamics.tau = Some(1440);
        dynamics.name = Some("Sample data".to_string());
        let initial = M::sample_initial();
        let mut row = Observation::new(first).with_state(
            initial.susceptible,
            initial.infected,
            initial.fatal,
            initial.recovered,
        );
        for (&name, value) in M::PARAMETERS.iter().zip(M::sample_params()) {
            row = row.with_param(name, value);
        }
        dynamics.register(&[row])?;
        Ok(dynamics)
    }

    pub fn table(&self) -> &StateTable {
        &self.table
    }

    pub fn phases(&self) -> Vec<PhaseSpan> {
        self.table.phases()
    }

    /// Number of phases in the current partition.
    pub fn phase_count(&self) -> usize {
        self.table.phases().len()
    }

    /// Real-world minutes represented by one simulated day, if set.
    pub fn tau(&self) -> Option<u32> {
        self.tau
    }

    pub fn set_tau(&mut self, tau: u32) -> EpiResult<()> {
        self.tau = Some(validate_tau(tau)?);
        Ok(())
    }

    /// Optional display label for the instance.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Replaces the registered data with `rows` and re-derives the phase
    /// partition from parameter changes.
    ///
    /// A fresh all-missing table is built over the same axis, the rows are
    /// overlaid by date (later rows overwrite earlier cells of the same
    /// date), and the first date is required to carry all four state
    /// variables. Parameter columns are then forward-filled; each date where
    /// the filled parameter vector changes becomes an implicit change point
    /// and the table is re-segmented from scratch at those dates, so any
    /// earlier manual segmentation is superseded.
    ///
    /// Returns the reconciled records, one per axis date, with parameters
    /// forward-filled.
    pub fn register(&mut self, rows: &[Observation]) -> EpiResult<Vec<Observation>> {
        let mut table = StateTable::new(*self.table.axis(), self.table.param_names().to_vec());
        register::overlay(&mut table, rows);
        if table.first_state().is_none() {
            return Err(EpiError::missing_data(
                table.axis().first(),
                format!(
                    "all of {} must be observed on the first date",
                    STATE_VARIABLES.join(", ")
                ),
            ));
        }
        let filled = table.forward_filled_params();
        let points = register::derive_change_points(&filled, table.axis());
        self.table = table.segmented(&points, true)?;
        Ok(self.records())
    }

    /// The reconciled table as one record per axis date, with parameter
    /// values forward-filled from the phase that defined them.
    pub fn records(&self) -> Vec<Observation> {
        let filled = self.table.forward_filled_params();
        let names = self.table.param_names().to_vec();
        self.table
            .axis()
            .iter()
            .enumerate()
            .map(|(idx, date)| {
                let mut row = Observation::new(date);
                row.state = self.table.state_at(idx);
                for (param, name) in names.iter().enumerate() {
                    if let Some(value) = filled[idx][param] {
                        row = row.with_param(name.clone(), value);
                    }
                }
                row
            })
            .collect()
    }

    /// Re-segments the table at `points`; with `overwrite` the existing
    /// phase partition is discarded first, otherwise the points refine it.
    ///
    /// An empty `points` runs trend analysis with default options and
    /// segments at the detected change points instead, under the same
    /// `overwrite` flag.
    pub fn segment(&mut self, points: &[NaiveDate], overwrite: bool) -> EpiResult<()> {
        if points.is_empty() {
            self.segment_with_trend(&TrendOptions::default(), overwrite)?;
            return Ok(());
        }
        self.table = self.table.segmented(points, overwrite)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Dynamics;
    use chrono::NaiveDate;
    use epidyn_core::{EpiError, Observation};
    use epidyn_models::{OdeModel, Sir};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn new_instance_is_one_phase_with_no_tau() {
        let dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        assert_eq!(dynamics.table().len(), 10);
        assert_eq!(dynamics.phases().len(), 1);
        assert_eq!(dynamics.tau(), None);
        assert_eq!(dynamics.name(), None);
    }

    #[test]
    fn register_requires_a_fully_observed_first_date() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        let rows = [Observation::new(date(2020, 1, 2)).with_state(990.0, 10.0, 0.0, 0.0)];
        let err = dynamics.register(&rows).expect_err("first date is missing");
        assert!(matches!(err, EpiError::MissingData { .. }));
        assert!(err.to_string().contains("2020-01-01"));
    }

    #[test]
    fn register_derives_phases_from_parameter_changes() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        let rows = [
            Observation::new(date(2020, 1, 1))
                .with_state(990.0, 10.0, 0.0, 0.0)
                .with_param("rho", 0.2)
                .with_param("sigma", 0.075),
            Observation::new(date(2020, 1, 5)).with_param("rho", 0.4),
        ];
        dynamics.register(&rows).expect("valid registration");
        let phases = dynamics.phases();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].start, date(2020, 1, 1));
        assert_eq!(phases[0].end, date(2020, 1, 4));
        assert_eq!(phases[1].start, date(2020, 1, 5));
        assert_eq!(phases[1].end, date(2020, 1, 10));
    }

    #[test]
    fn register_supersedes_manual_segmentation() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        let rows = [Observation::new(date(2020, 1, 1))
            .with_state(990.0, 10.0, 0.0, 0.0)
            .with_param("rho", 0.2)
            .with_param("sigma", 0.075)];
        dynamics.register(&rows).expect("valid registration");
        dynamics
            .segment(&[date(2020, 1, 4)], true)
            .expect("valid manual point");
        assert_eq!(dynamics.phases().len(), 2);
        dynamics.register(&rows).expect("valid registration");
        assert_eq!(dynamics.phases().len(), 1);
    }

    #[test]
    fn records_forward_fill_parameters() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 4)).expect("valid range");
        let rows = [Observation::new(date(2020, 1, 1))
            .with_state(990.0, 10.0, 0.0, 0.0)
            .with_param("rho", 0.2)
            .with_param("sigma", 0.075)];
        let records = dynamics.register(&rows).expect("valid registration");
        assert_eq!(records.len(), 4);
        for record in &records {
            assert_eq!(record.param("rho"), Some(0.2));
            assert_eq!(record.param("sigma"), Some(0.075));
        }
        assert_eq!(records[0].state[0], Some(990.0));
        assert_eq!(records[1].state[0], None);
    }

    #[test]
    fn from_sample_presets_tau_and_seeds_the_first_date() {
        let dynamics: Dynamics<Sir> =
            Dynamics::from_sample(date(2022, 1, 1), date(2022, 6, 29)).expect("valid sample");
        assert_eq!(dynamics.tau(), Some(1440));
        assert_eq!(dynamics.name(), Some("Sample data"));
        assert_eq!(dynamics.phases().len(), 1);
        let initial = Sir::sample_initial();
        let state = dynamics.table().state_at(0);
        assert_eq!(state[0], Some(initial.susceptible));
        assert_eq!(state[1], Some(initial.infected));
    }

    #[test]
    fn set_tau_rejects_values_that_do_not_divide_a_day() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        assert!(dynamics.set_tau(720).is_ok());
        assert_eq!(dynamics.tau(), Some(720));
        assert!(dynamics.set_tau(7).is_err());
        assert_eq!(dynamics.tau(), Some(720));
    }
}
