// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::binseg::{Binseg, BinsegConfig};
use crate::bottomup::{BottomUp, BottomUpConfig};
use crate::cost::{CostL2Mean, CostNormalMeanVar};
use crate::pelt::{Pelt, PeltConfig};
use crate::search::OfflineSearch;
use epidyn_core::{EpiError, EpiResult};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported search-strategy/cost-model combinations.
///
/// Identifiers follow the `<Strategy>-<cost>` convention, e.g.
/// `"Binseg-normal"`. Anything else fails validation before any
/// computation runs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    PeltL2,
    PeltNormal,
    BinsegL2,
    BinsegNormal,
    BottomUpL2,
    BottomUpNormal,
}

/// All valid identifiers, for error messages and docs.
pub const ALGORITHM_IDS: [&str; 6] = [
    "Pelt-l2",
    "Pelt-normal",
    "Binseg-l2",
    "Binseg-normal",
    "BottomUp-l2",
    "BottomUp-normal",
];

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::BinsegNormal
    }
}

impl Algorithm {
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::PeltL2 => "Pelt-l2",
            Algorithm::PeltNormal => "Pelt-normal",
            Algorithm::BinsegL2 => "Binseg-l2",
            Algorithm::BinsegNormal => "Binseg-normal",
            Algorithm::BottomUpL2 => "BottomUp-l2",
            Algorithm::BottomUpNormal => "BottomUp-normal",
        }
    }

    pub fn strategy_label(&self) -> &'static str {
        match self {
            Algorithm::PeltL2 | Algorithm::PeltNormal => "pelt",
            Algorithm::BinsegL2 | Algorithm::BinsegNormal => "binseg",
            Algorithm::BottomUpL2 | Algorithm::BottomUpNormal => "bottomup",
        }
    }

    pub fn cost_label(&self) -> &'static str {
        match self {
            Algorithm::PeltL2 | Algorithm::BinsegL2 | Algorithm::BottomUpL2 => "l2",
            _ => "normal",
        }
    }

    /// Runs the selected strategy with its default penalty.
    pub fn find_splits(&self, series: &[f64], min_size: usize) -> EpiResult<Vec<usize>> {
        match self {
            Algorithm::PeltL2 => {
                Pelt::new(CostL2Mean, PeltConfig::default()).find_splits(series, min_size)
            }
            Algorithm::PeltNormal => {
                Pelt::new(CostNormalMeanVar, PeltConfig::default()).find_splits(series, min_size)
            }
            Algorithm::BinsegL2 => {
                Binseg::new(CostL2Mean, BinsegConfig::default()).find_splits(series, min_size)
            }
            Algorithm::BinsegNormal => Binseg::new(CostNormalMeanVar, BinsegConfig::default())
                .find_splits(series, min_size),
            Algorithm::BottomUpL2 => {
                BottomUp::new(CostL2Mean, BottomUpConfig::default()).find_splits(series, min_size)
            }
            Algorithm::BottomUpNormal => BottomUp::new(CostNormalMeanVar, BottomUpConfig::default())
                .find_splits(series, min_size),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = EpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pelt-l2" => Ok(Algorithm::PeltL2),
            "Pelt-normal" => Ok(Algorithm::PeltNormal),
            "Binseg-l2" => Ok(Algorithm::BinsegL2),
            "Binseg-normal" => Ok(Algorithm::BinsegNormal),
            "BottomUp-l2" => Ok(Algorithm::BottomUpL2),
            "BottomUp-normal" => Ok(Algorithm::BottomUpNormal),
            other => Err(EpiError::not_supported(format!(
                "unknown algorithm {other:?}; supported: {}",
                ALGORITHM_IDS.join(", ")
            ))),
        }
    }
}
