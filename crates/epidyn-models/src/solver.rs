// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::OdeModel;
use epidyn_core::{EpiError, EpiResult};

pub const MINUTES_PER_DAY: u32 = 1440;

/// Checks that tau is a divisor of 1440 within `1..=1440`, so that one day
/// is a whole number of integrator steps.
pub fn validate_tau(tau: u32) -> EpiResult<u32> {
    if tau == 0 || tau > MINUTES_PER_DAY || MINUTES_PER_DAY % tau != 0 {
        return Err(EpiError::invalid_input(format!(
            "tau must be a divisor of {MINUTES_PER_DAY} in 1..={MINUTES_PER_DAY} [min]; got {tau}"
        )));
    }
    Ok(tau)
}

/// One classical Runge-Kutta step of size `dt` in tau units.
fn rk4_step<M: OdeModel>(model: &M, y: &mut [f64], dt: f64, scratch: &mut Rk4Scratch) {
    let n = y.len();
    model.rhs(y, &mut scratch.k1);
    for i in 0..n {
        scratch.tmp[i] = y[i] + 0.5 * dt * scratch.k1[i];
    }
    model.rhs(&scratch.tmp, &mut scratch.k2);
    for i in 0..n {
        scratch.tmp[i] = y[i] + 0.5 * dt * scratch.k2[i];
    }
    model.rhs(&scratch.tmp, &mut scratch.k3);
    for i in 0..n {
        scratch.tmp[i] = y[i] + dt * scratch.k3[i];
    }
    model.rhs(&scratch.tmp, &mut scratch.k4);
    for i in 0..n {
        y[i] += dt / 6.0
            * (scratch.k1[i] + 2.0 * scratch.k2[i] + 2.0 * scratch.k3[i] + scratch.k4[i]);
    }
}

struct Rk4Scratch {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4Scratch {
    fn new(n: usize) -> Self {
        Self {
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            tmp: vec![0.0; n],
        }
    }
}

/// Integrates `model` over `days` dates at step size tau.
///
/// Returns one model-native state row per date; row 0 is `initial`
/// unchanged, so a phase of `d` dates maps to exactly `d` rows.
pub fn integrate<M: OdeModel>(
    model: &M,
    initial: &[f64],
    days: usize,
    tau: u32,
) -> EpiResult<Vec<Vec<f64>>> {
    validate_tau(tau)?;
    if days == 0 {
        return Err(EpiError::invalid_input("integration span must be >= 1 day"));
    }
    let dim = M::VARIABLES.len();
    if initial.len() != dim {
        return Err(EpiError::invalid_input(format!(
            "{} initial state must have {dim} variables {:?}; got {}",
            M::NAME,
            M::VARIABLES,
            initial.len()
        )));
    }
    if initial.iter().any(|v| !v.is_finite()) {
        return Err(EpiError::invalid_input(format!(
            "{} initial state must be finite; got {initial:?}",
            M::NAME
        )));
    }

    let steps_per_day = (MINUTES_PER_DAY / tau) as usize;
    let mut scratch = Rk4Scratch::new(dim);
    let mut rows = Vec::with_capacity(days);
    let mut y = initial.to_vec();
    rows.push(y.clone());
    for day in 1..days {
        for _ in 0..steps_per_day {
            rk4_step(model, &mut y, 1.0, &mut scratch);
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(EpiError::numerical_issue(format!(
                "{} integration produced a non-finite state on day {day}",
                M::NAME
            )));
        }
        rows.push(y.clone());
    }
    Ok(rows)
}
