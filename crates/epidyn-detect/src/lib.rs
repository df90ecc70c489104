// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Offline change-point search strategies over 1-D series.
//!
//! Consumed by S-R trend analysis as a black box: a strategy takes a numeric
//! sequence and a minimum segment size and returns ordered split indices
//! whose last element equals the sequence length.

pub mod algorithm;
pub mod binseg;
pub mod bottomup;
pub mod cost;
pub mod pelt;
pub mod search;

pub use algorithm::{ALGORITHM_IDS, Algorithm};
pub use binseg::{Binseg, BinsegConfig};
pub use bottomup::{BottomUp, BottomUpConfig};
pub use cost::{CostL2Mean, CostModel, CostNormalMeanVar, Penalty, PrefixStats};
pub use pelt::{Pelt, PeltConfig};
pub use search::OfflineSearch;
