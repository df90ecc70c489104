// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::{OdeModel, SifrState, validate_model_inputs};
use crate::solver::MINUTES_PER_DAY;
use epidyn_core::EpiResult;

/// Basic SIR model.
///
/// Native variables fold Fatal into Recovered, so the inverse transform
/// reports all removed cases as Recovered and Fatal as 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sir {
    population: f64,
    /// Effective contact rate per tau interval.
    rho: f64,
    /// Recovery rate per tau interval.
    sigma: f64,
}

impl Sir {
    pub fn population(&self) -> f64 {
        self.population
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl OdeModel for Sir {
    const NAME: &'static str = "SIR";
    const PARAMETERS: &'static [&'static str] = &["rho", "sigma"];
    const DAY_PARAMETERS: &'static [&'static str] = &["1/beta [day]", "1/gamma [day]"];
    const VARIABLES: &'static [&'static str] = &["Susceptible", "Infected", "Fatal or Recovered"];

    fn new(population: f64, params: &[f64]) -> EpiResult<Self> {
        validate_model_inputs(Self::NAME, Self::PARAMETERS, population, params)?;
        Ok(Self {
            population,
            rho: params[0],
            sigma: params[1],
        })
    }

    fn rhs(&self, y: &[f64], dydt: &mut [f64]) {
        let (s, i) = (y[0], y[1]);
        let infection = self.rho * s * i / self.population;
        let removal = self.sigma * i;
        dydt[0] = -infection;
        dydt[1] = infection - removal;
        dydt[2] = removal;
    }

    fn transform(state: &SifrState) -> Vec<f64> {
        vec![
            state.susceptible,
            state.infected,
            state.fatal + state.recovered,
        ]
    }

    fn inverse_transform(native: &[f64]) -> SifrState {
        SifrState::new(native[0], native[1], 0.0, native[2])
    }

    fn reproduction_number(&self) -> f64 {
        if self.sigma > 0.0 {
            self.rho / self.sigma
        } else {
            f64::INFINITY
        }
    }

    fn day_parameters(&self, tau: u32) -> Vec<f64> {
        let days_per_step = f64::from(tau) / f64::from(MINUTES_PER_DAY);
        let inverse_rate = |rate: f64| {
            if rate > 0.0 {
                days_per_step / rate
            } else {
                f64::INFINITY
            }
        };
        vec![inverse_rate(self.rho), inverse_rate(self.sigma)]
    }

    fn sample_params() -> Vec<f64> {
        vec![0.2, 0.075]
    }

    fn sample_initial() -> SifrState {
        SifrState::new(999_000.0, 1000.0, 0.0, 0.0)
    }
}
