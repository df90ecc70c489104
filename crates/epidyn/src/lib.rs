// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Phase-dependent epidemic dynamics engine.
//!
//! [`Dynamics`] owns a date-indexed state table over a fixed range and
//! drives the full workflow: register daily observations, partition the
//! range into phases at explicit or detected change points, and integrate
//! an SIR-derived ODE model piecewise across the phases.
//!
//! ```
//! use chrono::NaiveDate;
//! use epidyn::{Dynamics, Sir};
//!
//! let first = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
//! let last = NaiveDate::from_ymd_opt(2022, 6, 29).unwrap();
//! let dynamics: Dynamics<Sir> = Dynamics::from_sample(first, last).unwrap();
//! let frame = dynamics.simulate(false).unwrap();
//! assert_eq!(frame.dates.len(), 180);
//! ```

pub mod dynamics;
mod register;
pub mod simulate;
pub mod summary;
pub mod trend;

pub use dynamics::Dynamics;
pub use simulate::SimulatedFrame;
pub use summary::PhaseSummary;
pub use trend::{LineFit, SegmentFit, TrendFrame, TrendOptions, TrendResult};

pub use epidyn_core::{
    DateAxis, Diagnostics, EpiError, EpiResult, Observation, PhaseSpan, STATE_VARIABLES,
    StateTable,
};
pub use epidyn_detect::{ALGORITHM_IDS, Algorithm};
pub use epidyn_models::{MINUTES_PER_DAY, OdeModel, SifrState, Sir, Sird, validate_tau};
