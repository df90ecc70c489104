// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::NaiveDate;

/// Names of the four canonical state variables, in column order.
pub const STATE_VARIABLES: [&str; 4] = ["Susceptible", "Infected", "Fatal", "Recovered"];

/// One observation row supplied to registration.
///
/// Any subset of the state variables and parameter values may be present.
/// Parameter names that the owning model does not define are ignored at
/// registration time.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// Susceptible, Infected, Fatal, Recovered in [`STATE_VARIABLES`] order.
    pub state: [Option<f64>; 4],
    /// Named ODE parameter values.
    pub params: Vec<(String, f64)>,
}

impl Observation {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            state: [None; 4],
            params: Vec::new(),
        }
    }

    /// Sets all four state variables at once.
    pub fn with_state(mut self, susceptible: f64, infected: f64, fatal: f64, recovered: f64) -> Self {
        self.state = [
            Some(susceptible),
            Some(infected),
            Some(fatal),
            Some(recovered),
        ];
        self
    }

    pub fn with_variable(mut self, idx: usize, value: f64) -> Self {
        if idx < 4 {
            self.state[idx] = Some(value);
        }
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        // Last write wins when the same name appears twice.
        self.params
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}
