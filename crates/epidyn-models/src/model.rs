// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use epidyn_core::{EpiError, EpiResult};

/// The four canonical state variables at one instant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SifrState {
    pub susceptible: f64,
    pub infected: f64,
    pub fatal: f64,
    pub recovered: f64,
}

impl SifrState {
    pub fn new(susceptible: f64, infected: f64, fatal: f64, recovered: f64) -> Self {
        Self {
            susceptible,
            infected,
            fatal,
            recovered,
        }
    }

    /// Total population represented by this state.
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.fatal + self.recovered
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.susceptible, self.infected, self.fatal, self.recovered]
    }
}

/// SIR-derived ODE model contract.
///
/// Rate parameters are per tau interval (one integrator step), matching the
/// convention that one simulated day spans `1440 / tau` steps.
pub trait OdeModel: Sized {
    /// Human-readable model name, e.g. `"SIR"`.
    const NAME: &'static str;
    /// Ordered parameter names; registration and simulation use this order.
    const PARAMETERS: &'static [&'static str];
    /// Derived per-day quantities reported in summaries.
    const DAY_PARAMETERS: &'static [&'static str];
    /// Model-native variable names, in state-vector order.
    const VARIABLES: &'static [&'static str];

    fn new(population: f64, params: &[f64]) -> EpiResult<Self>;

    /// Evaluates the right-hand side `dy/dt` at state `y` (autonomous).
    fn rhs(&self, y: &[f64], dydt: &mut [f64]);

    /// Canonical {S, I, F, R} to model-native variables.
    fn transform(state: &SifrState) -> Vec<f64>;

    /// Model-native variables back to canonical {S, I, F, R}.
    fn inverse_transform(native: &[f64]) -> SifrState;

    /// Phase-dependent reproduction number surrogate.
    fn reproduction_number(&self) -> f64;

    /// Values aligned with [`Self::DAY_PARAMETERS`] for the given tau.
    fn day_parameters(&self, tau: u32) -> Vec<f64>;

    /// Parameter values used by sample-data construction.
    fn sample_params() -> Vec<f64>;

    /// Initial state used by sample-data construction.
    fn sample_initial() -> SifrState;

    /// y-coordinate source of the S-R trend plane.
    fn s_equivalent(state: &SifrState) -> f64 {
        state.susceptible
    }

    /// x-coordinate source of the S-R trend plane.
    fn r_equivalent(state: &SifrState) -> f64 {
        state.fatal + state.recovered
    }
}

/// Common validation for model constructors.
pub(crate) fn validate_model_inputs(
    name: &str,
    expected: &[&str],
    population: f64,
    params: &[f64],
) -> EpiResult<()> {
    if !population.is_finite() || population <= 0.0 {
        return Err(EpiError::invalid_input(format!(
            "{name} population must be finite and > 0; got {population}"
        )));
    }
    if params.len() != expected.len() {
        return Err(EpiError::invalid_input(format!(
            "{name} expects {} parameter values {:?}; got {}",
            expected.len(),
            expected,
            params.len()
        )));
    }
    for (pname, &value) in expected.iter().zip(params) {
        if !value.is_finite() || value < 0.0 {
            return Err(EpiError::invalid_input(format!(
                "{name} parameter {pname} must be finite and >= 0; got {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::SifrState;

    #[test]
    fn total_sums_all_four_variables() {
        let state = SifrState::new(990.0, 10.0, 2.0, 8.0);
        assert_eq!(state.total(), 1010.0);
        assert_eq!(state.as_array(), [990.0, 10.0, 2.0, 8.0]);
    }
}
