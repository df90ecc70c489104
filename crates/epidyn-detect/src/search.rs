// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use epidyn_core::{EpiError, EpiResult};

/// Offline change-point search contract: full series in, split indices out.
///
/// The returned indices are strictly increasing, each consecutive pair is at
/// least `min_size` apart, and the last index equals the series length. A
/// series too short to split yields just `[len]`.
pub trait OfflineSearch {
    fn find_splits(&self, series: &[f64], min_size: usize) -> EpiResult<Vec<usize>>;
}

/// Shared input validation for every search strategy.
pub(crate) fn validate_series(series: &[f64], min_size: usize) -> EpiResult<()> {
    if min_size == 0 {
        return Err(EpiError::invalid_input("min_size must be >= 1; got 0"));
    }
    if series.is_empty() {
        return Err(EpiError::invalid_input("series must not be empty"));
    }
    if let Some((idx, value)) = series
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(EpiError::invalid_input(format!(
            "series must be finite; index {idx} has {value}"
        )));
    }
    Ok(())
}
