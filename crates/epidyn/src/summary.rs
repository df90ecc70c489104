// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::dynamics::Dynamics;
use chrono::NaiveDate;
use epidyn_models::OdeModel;

/// One row of the phase-indexed summary table.
///
/// Derived quantities are `None` whenever the inputs they need are not
/// available: the reproduction number and day parameters need a complete
/// parameter set, and day parameters additionally need tau. The population
/// comes from the fully observed state on the phase's first date; a phase
/// without one inherits the previous phase's value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSummary {
    pub phase: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
    pub model: String,
    pub population: Option<f64>,
    /// Parameter name/value pairs in model order, forward-filled.
    pub parameters: Vec<(String, Option<f64>)>,
    pub reproduction_number: Option<f64>,
    pub tau: Option<u32>,
    /// Derived per-day quantities in [`OdeModel::DAY_PARAMETERS`] order.
    pub day_parameters: Vec<(String, Option<f64>)>,
}

impl<M: OdeModel> Dynamics<M> {
    /// Summarizes the current phase partition, one row per phase.
    ///
    /// Works on whatever is registered so far; missing inputs surface as
    /// `None` cells rather than errors, since the summary is a report and
    /// not a computation gate.
    pub fn summary(&self) -> Vec<PhaseSummary> {
        let filled = self.table.forward_filled_params();
        let names = self.table.param_names().to_vec();
        // The axis-wide total is conserved by every model, so it stands in
        // for phases whose start date has no observed state.
        let base_population = self.table.first_state().map(|s| s.iter().sum::<f64>());
        let mut carried_population = None;

        self.table
            .phases()
            .iter()
            .map(|span| {
                let row = &filled[span.start_idx];
                let parameters: Vec<(String, Option<f64>)> =
                    names.iter().cloned().zip(row.iter().copied()).collect();

                let state = self.table.state_at(span.start_idx);
                if let (Some(s), Some(i), Some(f), Some(r)) =
                    (state[0], state[1], state[2], state[3])
                {
                    carried_population = Some(s + i + f + r);
                }
                let population = carried_population;

                let values: Option<Vec<f64>> = row.iter().copied().collect();
                let model = match (base_population, &values) {
                    (Some(pop), Some(v)) => M::new(pop, v).ok(),
                    _ => None,
                };
                let reproduction_number = model.as_ref().map(|m| m.reproduction_number());
                let day_values: Vec<Option<f64>> = match (&model, self.tau) {
                    (Some(m), Some(tau)) => m.day_parameters(tau).into_iter().map(Some).collect(),
                    _ => vec![None; M::DAY_PARAMETERS.len()],
                };
                let day_parameters = M::DAY_PARAMETERS
                    .iter()
                    .map(|&n| n.to_string())
                    .zip(day_values)
                    .collect();

                PhaseSummary {
                    phase: span.id,
                    start: span.start,
                    end: span.end,
                    days: span.days(),
                    model: M::NAME.to_string(),
                    population,
                    parameters,
                    reproduction_number,
                    tau: self.tau,
                    day_parameters,
                }
            })
            .collect()
    }
}
