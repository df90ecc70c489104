// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::cost::{CostModel, Penalty};
use crate::search::{OfflineSearch, validate_series};
use epidyn_core::EpiResult;

/// Configuration for [`BottomUp`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BottomUpConfig {
    pub penalty: Penalty,
}

impl Default for BottomUpConfig {
    fn default() -> Self {
        Self {
            penalty: Penalty::Bic,
        }
    }
}

/// Bottom-up merge search.
///
/// Starts from a fine grid of `min_size` segments and repeatedly merges the
/// adjacent pair whose merge raises the total cost the least, until the
/// cheapest merge would cost more than the penalty.
#[derive(Clone, Debug)]
pub struct BottomUp<C: CostModel> {
    cost_model: C,
    config: BottomUpConfig,
}

impl<C: CostModel> BottomUp<C> {
    pub fn new(cost_model: C, config: BottomUpConfig) -> Self {
        Self { cost_model, config }
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }
}

/// Initial grid: boundaries every `min_size` points, with the remainder
/// folded into the final segment so every segment keeps `min_size` points.
fn initial_boundaries(n: usize, min_size: usize) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut cursor = 0usize;
    while n - cursor >= 2 * min_size {
        cursor += min_size;
        boundaries.push(cursor);
    }
    boundaries.push(n);
    boundaries
}

impl<C: CostModel> OfflineSearch for BottomUp<C> {
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

        // Segment starts plus the terminal boundary; bounds[i]..bounds[i+1]
        // is the i-th segment.
        let mut bounds = vec![0usize];
        bounds.extend(initial_boundaries(n, min_size));

        while bounds.len() > 2 {
            let mut cheapest: Option<(usize, f64)> = None;
            for i in 1..bounds.len() - 1 {
                let (left, mid, right) = (bounds[i - 1], bounds[i], bounds[i + 1]);
                let merged = self.cost_model.segment_cost(&cache, left, right);
                let split = self.cost_model.segment_cost(&cache, left, mid)
                    + self.cost_model.segment_cost(&cache, mid, right);
                let delta = merged - split;
                if cheapest.map_or(true, |(_, d)| delta < d) {
                    cheapest = Some((i, delta));
                }
            }
            match cheapest {
                Some((i, delta)) if delta <= beta => {
                    bounds.remove(i);
                }
                _ => break,
            }
        }

        Ok(bounds[1..].to_vec())
    }
}
