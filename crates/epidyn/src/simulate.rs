// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::dynamics::Dynamics;
use chrono::NaiveDate;
use epidyn_core::{EpiError, EpiResult, STATE_VARIABLES};
use epidyn_models::{OdeModel, SifrState, integrate};

/// Simulated trajectory over the full date axis.
///
/// `rows[i]` holds the variable values on `dates[i]`, aligned with
/// `variables`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedFrame {
    pub dates: Vec<NaiveDate>,
    pub variables: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

fn phase_params(
    row: &[Option<f64>],
    names: &[String],
    phase_start: NaiveDate,
) -> EpiResult<Vec<f64>> {
    let mut values = Vec::with_capacity(row.len());
    for (name, value) in names.iter().zip(row) {
        match value {
            Some(v) => values.push(*v),
            None => {
                return Err(EpiError::missing_data(
                    phase_start,
                    format!("parameter {name} is undefined for the phase starting here"),
                ));
            }
        }
    }
    Ok(values)
}

impl<M: OdeModel> Dynamics<M> {
    /// Integrates the ODE model piecewise over the phase partition.
    ///
    /// Phase 0 starts from the registered first-date state; every later
    /// phase starts from the final simulated state of the previous phase,
    /// carried in model-native variables so the hand-off is exact even for
    /// models whose canonical transform is lossy. Registered observations
    /// after the first date never re-seed the trajectory.
    ///
    /// With `model_specific` the result keeps the model-native variables;
    /// otherwise each row is converted back to the four canonical columns.
    pub fn simulate(&self, model_specific: bool) -> EpiResult<SimulatedFrame> {
        let tau = self.tau.ok_or_else(|| EpiError::configuration("tau"))?;
        let first = self.table.first_state().ok_or_else(|| {
            EpiError::missing_data(
                self.table.axis().first(),
                format!(
                    "all of {} must be registered before simulation",
                    STATE_VARIABLES.join(", ")
                ),
            )
        })?;

        let filled = self.table.forward_filled_params();
        let names = self.table.param_names().to_vec();
        let initial = SifrState::new(first[0], first[1], first[2], first[3]);

        let mut y = M::transform(&initial);
        let mut native_rows: Vec<Vec<f64>> = Vec::with_capacity(self.table.len());
        for span in self.table.phases() {
            let params = phase_params(&filled[span.start_idx], &names, span.start)?;
            let population = M::inverse_transform(&y).total();
            let model = M::new(population, &params)?;
            let rows = integrate(&model, &y, span.days(), tau)?;
            if let Some(last) = rows.last() {
                y = last.clone();
            }
            native_rows.extend(rows);
        }

        let (variables, rows) = if model_specific {
            let variables = M::VARIABLES.iter().map(|&v| v.to_string()).collect();
            (variables, native_rows)
        } else {
            let variables = STATE_VARIABLES.iter().map(|&v| v.to_string()).collect();
            let canonical = native_rows
                .iter()
                .map(|row| M::inverse_transform(row).as_array().to_vec())
                .collect();
            (variables, canonical)
        };

        Ok(SimulatedFrame {
            dates: self.table.axis().iter().collect(),
            variables,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedFrame;
    use crate::dynamics::Dynamics;
    use chrono::NaiveDate;
    use epidyn_core::{EpiError, Observation};
    use epidyn_models::{Sir, Sird};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn two_phase_dynamics() -> Dynamics<Sir> {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 30)).expect("valid range");
        let rows = [
            Observation::new(date(2020, 1, 1))
                .with_state(990.0, 10.0, 0.0, 0.0)
                .with_param("rho", 0.2)
                .with_param("sigma", 0.075),
            Observation::new(date(2020, 1, 15)).with_param("rho", 0.05),
        ];
        dynamics.register(&rows).expect("valid registration");
        dynamics.set_tau(1440).expect("valid tau");
        dynamics
    }

    #[test]
    fn missing_tau_is_a_configuration_error() {
        let mut dynamics = two_phase_dynamics();
        dynamics.tau = None;
        let err = dynamics.simulate(false).expect_err("tau is unset");
        assert_eq!(err, EpiError::configuration("tau"));
    }

    #[test]
    fn output_covers_the_whole_axis_with_canonical_columns() {
        let dynamics = two_phase_dynamics();
        let frame = dynamics.simulate(false).expect("valid simulation");
        assert_eq!(frame.dates.len(), 30);
        assert_eq!(frame.dates[0], date(2020, 1, 1));
        assert_eq!(frame.dates[29], date(2020, 1, 30));
        assert_eq!(
            frame.variables,
            vec!["Susceptible", "Infected", "Fatal", "Recovered"]
        );
        assert_eq!(frame.rows.len(), 30);
        assert_eq!(frame.rows[0], vec![990.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn model_specific_output_uses_native_variables() {
        let dynamics = two_phase_dynamics();
        let frame = dynamics.simulate(true).expect("valid simulation");
        assert_eq!(
            frame.variables,
            vec!["Susceptible", "Infected", "Fatal or Recovered"]
        );
        assert_eq!(frame.rows[0], vec![990.0, 10.0, 0.0]);
    }

    #[test]
    fn phase_boundary_carries_the_previous_final_state() {
        let dynamics = two_phase_dynamics();
        let frame = dynamics.simulate(true).expect("valid simulation");
        // Phase 1 starts on 2020-01-15 (index 14) from the final state of
        // phase 0 on 2020-01-14 (index 13).
        assert_eq!(frame.rows[14], frame.rows[13]);
        assert_ne!(frame.rows[15], frame.rows[14]);
    }

    #[test]
    fn population_is_conserved_across_phases() {
        let dynamics = two_phase_dynamics();
        let frame = dynamics.simulate(false).expect("valid simulation");
        for (row, day) in frame.rows.iter().zip(&frame.dates) {
            let total: f64 = row.iter().sum();
            assert!((total - 1000.0).abs() < 1e-6, "total {total} on {day}");
        }
    }

    #[test]
    fn registered_observations_after_the_first_date_do_not_reseed() {
        let mut seeded = two_phase_dynamics();
        // An outlier observation mid-run must not affect the trajectory.
        let with_outlier = [
            Observation::new(date(2020, 1, 1))
                .with_state(990.0, 10.0, 0.0, 0.0)
                .with_param("rho", 0.2)
                .with_param("sigma", 0.075),
            Observation::new(date(2020, 1, 10)).with_state(1.0, 2.0, 3.0, 4.0),
            Observation::new(date(2020, 1, 15)).with_param("rho", 0.05),
        ];
        seeded.register(&with_outlier).expect("valid registration");
        let baseline = two_phase_dynamics().simulate(false).expect("baseline run");
        let outlier = seeded.simulate(false).expect("outlier run");
        assert_eq!(baseline.rows, outlier.rows);
    }

    #[test]
    fn undefined_phase_parameters_fail_with_the_phase_start_date() {
        let mut dynamics: Dynamics<Sir> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        let rows = [Observation::new(date(2020, 1, 1))
            .with_state(990.0, 10.0, 0.0, 0.0)
            .with_param("rho", 0.2)];
        dynamics.register(&rows).expect("valid registration");
        dynamics.set_tau(1440).expect("valid tau");
        let err = dynamics.simulate(false).expect_err("sigma is undefined");
        assert!(err.to_string().contains("sigma"));
        assert!(err.to_string().contains("2020-01-01"));
    }

    #[test]
    fn exact_round_trip_model_agrees_between_native_and_canonical_output() {
        let mut dynamics: Dynamics<Sird> =
            Dynamics::new(date(2020, 1, 1), date(2020, 1, 20)).expect("valid range");
        let rows = [Observation::new(date(2020, 1, 1))
            .with_state(990.0, 10.0, 0.0, 0.0)
            .with_param("kappa", 0.005)
            .with_param("rho", 0.2)
            .with_param("sigma", 0.075)];
        dynamics.register(&rows).expect("valid registration");
        dynamics.set_tau(720).expect("valid tau");
        let native = dynamics.simulate(true).expect("native run");
        let canonical = dynamics.simulate(false).expect("canonical run");
        for (n, c) in native.rows.iter().zip(&canonical.rows) {
            // Native order is S, I, R, F; canonical is S, I, F, R.
            assert_eq!(c, &vec![n[0], n[1], n[3], n[2]]);
        }
    }

    #[test]
    fn frames_compare_by_value() {
        let frame = SimulatedFrame {
            dates: vec![date(2020, 1, 1)],
            variables: vec!["Susceptible".to_string()],
            rows: vec![vec![990.0]],
        };
        assert_eq!(frame.clone(), frame);
    }
}
