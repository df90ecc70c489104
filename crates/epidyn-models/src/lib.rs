// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! SIR-derived ODE models and the fixed-step integrator used by piecewise
//! simulation. Rate parameters are per tau interval; one simulated day is
//! `1440 / tau` integrator steps.

pub mod model;
pub mod sir;
pub mod sird;
pub mod solver;

pub use model::{OdeModel, SifrState};
pub use sir::Sir;
pub use sird::Sird;
pub use solver::{MINUTES_PER_DAY, integrate, validate_tau};
