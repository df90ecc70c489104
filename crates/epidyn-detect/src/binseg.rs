// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::cost::{CostModel, Penalty};
use crate::search::{OfflineSearch, validate_series};
use epidyn_core::EpiResult;

/// Configuration for [`Binseg`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinsegConfig {
    pub penalty: Penalty,
}

impl Default for BinsegConfig {
    fn default() -> Self {
        Self {
            penalty: Penalty::Bic,
        }
    }
}

/// Greedy binary segmentation.
///
/// Recursively splits the interval at the single best split whenever the
/// cost reduction exceeds the penalty. Fast and good enough for daily
/// epidemic series; not exact under the penalized objective.
#[derive(Clone, Debug)]
pub struct Binseg<C: CostModel> {
    cost_model: C,
    config: BinsegConfig,
}

impl<C: CostModel> Binseg<C> {
    pub fn new(cost_model: C, config: BinsegConfig) -> Self {
        Self { cost_model, config }
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }

    /// Best single split of `[start, end)` and its cost reduction.
    fn best_split(
        &self,
        cache: &C::Cache,
        start: usize,
        end: usize,
        min_size: usize,
    ) -> Option<(usize, f64)> {
        if end - start < 2 * min_size {
            return None;
        }
        let whole = self.cost_model.segment_cost(cache, start, end);
        let mut best: Option<(usize, f64)> = None;
        for split in (start + min_size)..=(end - min_size) {
            let left = self.cost_model.segment_cost(cache, start, split);
            let right = self.cost_model.segment_cost(cache, split, end);
            let gain = whole - left - right;
            if best.map_or(true, |(_, g)| gain > g) {
                best = Some((split, gain));
            }
        }
        best
    }

    fn split_recursive(
        &self,
        cache: &C::Cache,
        start: usize,
        end: usize,
        min_size: usize,
        beta: f64,
        out: &mut Vec<usize>,
    ) {
        if let Some((split, gain)) = self.best_split(cache, start, end, min_size) {
            if gain > beta {
                self.split_recursive(cache, start, split, min_size, beta, out);
                out.push(split);
                self.split_recursive(cache, split, end, min_size, beta, out);
            }
        }
    }
}

impl<C: CostModel> OfflineSearch for Binseg<C> {
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

        let mut splits = Vec::new();
        self.split_recursive(&cache, 0, n, min_size, beta, &mut splits);
        splits.push(n);
        Ok(splits)
    }
}
