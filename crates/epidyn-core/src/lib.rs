// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared types for phase-dependent epidemic dynamics: the daily date axis,
//! the phase-indexed state table, observation rows and the workspace error.

pub mod axis;
pub mod diagnostics;
pub mod error;
pub mod observation;
pub mod table;

pub use axis::{CHANGE_POINT_TAIL_DAYS, DateAxis};
pub use diagnostics::Diagnostics;
pub use error::{EpiError, EpiResult};
pub use observation::{Observation, STATE_VARIABLES};
pub use table::{PhaseSpan, StateTable};
