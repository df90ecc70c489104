// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Keeps log-variance finite on constant segments.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Segment cost model over a 1-D series.
///
/// `precompute` builds prefix statistics once; `segment_cost` then answers
/// any half-open range `[start, end)` in O(1).
pub trait CostModel {
    type Cache;

    fn name(&self) -> &'static str;

    fn precompute(&self, series: &[f64]) -> Self::Cache;

    fn segment_cost(&self, cache: &Self::Cache, start: usize, end: usize) -> f64;

    /// Parameters fitted per segment, used by the BIC penalty.
    fn penalty_params_per_segment(&self) -> usize;
}

/// Penalty applied per additional change point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Penalty {
    Bic,
    Manual(f64),
}

impl Penalty {
    /// Resolves the penalty to a concrete beta for a series of length `n`.
    pub fn value(&self, n: usize, params_per_segment: usize) -> f64 {
        match self {
            Penalty::Bic => params_per_segment as f64 * (n.max(2) as f64).ln(),
            Penalty::Manual(beta) => *beta,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrefixStats {
    sums: Vec<f64>,
    sums_sq: Vec<f64>,
}

impl PrefixStats {
    fn build(series: &[f64]) -> Self {
        let mut sums = Vec::with_capacity(series.len() + 1);
        let mut sums_sq = Vec::with_capacity(series.len() + 1);
        sums.push(0.0);
        sums_sq.push(0.0);
        let mut acc = 0.0;
        let mut acc_sq = 0.0;
        for &v in series {
            acc += v;
            acc_sq += v * v;
            sums.push(acc);
            sums_sq.push(acc_sq);
        }
        Self { sums, sums_sq }
    }

    fn sum(&self, start: usize, end: usize) -> f64 {
        self.sums[end] - self.sums[start]
    }

    fn sum_sq(&self, start: usize, end: usize) -> f64 {
        self.sums_sq[end] - self.sums_sq[start]
    }

    /// Residual sum of squares around the segment mean.
    fn rss(&self, start: usize, end: usize) -> f64 {
        let len = (end - start) as f64;
        let sum = self.sum(start, end);
        (self.sum_sq(start, end) - sum * sum / len).max(0.0)
    }
}

/// Least-squares deviation from the segment mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CostL2Mean;

impl CostModel for CostL2Mean {
    type Cache = PrefixStats;

    fn name(&self) -> &'static str {
        "l2"
    }

    fn precompute(&self, series: &[f64]) -> PrefixStats {
        PrefixStats::build(series)
    }

    fn segment_cost(&self, cache: &PrefixStats, start: usize, end: usize) -> f64 {
        cache.rss(start, end)
    }

    fn penalty_params_per_segment(&self) -> usize {
        2
    }
}

/// Gaussian likelihood cost sensitive to both mean and variance shifts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CostNormalMeanVar;

impl CostModel for CostNormalMeanVar {
    type Cache = PrefixStats;

    fn name(&self) -> &'static str {
        "normal"
    }

    fn precompute(&self, series: &[f64]) -> PrefixStats {
        PrefixStats::build(series)
    }

    fn segment_cost(&self, cache: &PrefixStats, start: usize, end: usize) -> f64 {
        let len = (end - start) as f64;
        let variance = (cache.rss(start, end) / len).max(VARIANCE_FLOOR);
        len * variance.ln()
    }

    fn penalty_params_per_segment(&self) -> usize {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::{CostL2Mean, CostModel, CostNormalMeanVar, Penalty};

    #[test]
    fn l2_cost_is_zero_on_constant_segments() {
        let cost = CostL2Mean;
        let cache = cost.precompute(&[3.0, 3.0, 3.0, 3.0]);
        assert!(cost.segment_cost(&cache, 0, 4).abs() < 1e-12);
    }

    #[test]
    fn l2_cost_adds_up_to_total_variation() {
        let cost = CostL2Mean;
        let series = [0.0, 0.0, 10.0, 10.0];
        let cache = cost.precompute(&series);
        let whole = cost.segment_cost(&cache, 0, 4);
        let split = cost.segment_cost(&cache, 0, 2) + cost.segment_cost(&cache, 2, 4);
        assert!(whole > split + 10.0, "splitting at the jump must pay off");
    }

    #[test]
    fn normal_cost_prefers_splitting_variance_changes() {
        let cost = CostNormalMeanVar;
        let series = [-0.1, 0.1, -0.1, 0.1, -5.0, 5.0, -5.0, 5.0];
        let cache = cost.precompute(&series);
        let whole = cost.segment_cost(&cache, 0, 8);
        let split = cost.segment_cost(&cache, 0, 4) + cost.segment_cost(&cache, 4, 8);
        assert!(whole > split);
    }

    #[test]
    fn bic_penalty_grows_with_length_and_parameters() {
        assert!(Penalty::Bic.value(100, 3) > Penalty::Bic.value(100, 2));
        assert!(Penalty::Bic.value(1000, 2) > Penalty::Bic.value(100, 2));
        assert_eq!(Penalty::Manual(1.5).value(100, 2), 1.5);
    }
}
