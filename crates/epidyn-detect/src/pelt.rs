// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::cost::{CostModel, Penalty};
use crate::search::{OfflineSearch, validate_series};
use epidyn_core::EpiResult;

/// Configuration for [`Pelt`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeltConfig {
    pub penalty: Penalty,
}

impl Default for PeltConfig {
    fn default() -> Self {
        Self {
            penalty: Penalty::Bic,
        }
    }
}

/// Pruned Exact Linear Time search.
///
/// Dynamic program over segment ends with pruning of dominated candidate
/// starts, exact under the penalized objective.
#[derive(Clone, Debug)]
pub struct Pelt<C: CostModel> {
    cost_model: C,
    config: PeltConfig,
}

impl<C: CostModel> Pelt<C> {
    pub fn new(cost_model: C, config: PeltConfig) -> Self {
        Self { cost_model, config }
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }
}

impl<C: CostModel> OfflineSearch for Pelt<C> {
    fn find_splits(&self, series: &[f64], min_size: usize) -> EpiResult<Vec<usize>> {
        validate_series(series, min_size)?;
        let n = series.len();
        if n < 2 * min_size {
            return Ok(vec![n]);
        }

        let cache = self.cost_model.precompute(series);
        let beta = self
            .config
            .penalty
            .value(n, self.cost_model.penalty_params_per_segment());

        // optimal[t] is the best penalized cost of segmenting [0, t).
        let mut optimal = vec![f64::INFINITY; n + 1];
        let mut prev = vec![0usize; n + 1];
        optimal[0] = -beta;
        let mut candidates: Vec<usize> = vec![0];

        for t in min_size..=n {
            let mut best = f64::INFINITY;
            let mut best_start = 0usize;
            for &s in &candidates {
                if t - s < min_size {
                    continue;
                }
                let value = optimal[s] + self.cost_model.segment_cost(&cache, s, t) + beta;
                if value < best {
                    best = value;
                    best_start = s;
                }
            }
            optimal[t] = best;
            prev[t] = best_start;

            candidates.retain(|&s| {
                t - s < min_size
                    || optimal[s] + self.cost_model.segment_cost(&cache, s, t) <= optimal[t]
            });
            candidates.push(t);
        }

        let mut splits = Vec::new();
        let mut cursor = n;
        while cursor > 0 {
            splits.push(cursor);
            cursor = prev[cursor];
        }
        splits.reverse();
        Ok(splits)
    }
}
