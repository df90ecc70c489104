// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::dynamics::Dynamics;
use chrono::NaiveDate;
use epidyn_core::{Diagnostics, EpiError, EpiResult};
use epidyn_detect::Algorithm;
use epidyn_models::{OdeModel, SifrState};
use std::time::Instant;

/// Smallest admissible segment length for trend analysis.
pub const MIN_SEGMENT_FLOOR: usize = 3;

/// Configuration for S-R trend analysis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendOptions {
    pub algorithm: Algorithm,
    /// Minimum number of points per detected segment; must be >= 3.
    pub min_size: usize,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            min_size: 7,
        }
    }
}

/// Ordinary least-squares line in the S-R plane.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Per-segment regression over the dates the segment covers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentFit {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub line: LineFit,
}

/// Reporting frame for the S-R plane, one entry per fully observed date.
///
/// `fitted_segments` holds one column per detected segment, populated only
/// on the dates that segment covers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TrendFrame {
    pub dates: Vec<NaiveDate>,
    /// x-coordinate: the model's cumulative R-equivalent.
    pub r: Vec<f64>,
    /// y-coordinate: log10 of the model's S-equivalent.
    pub actual: Vec<f64>,
    pub fitted_global: Vec<f64>,
    pub fitted_segments: Vec<Vec<Option<f64>>>,
}

/// Detected change points plus the diagnostic regression frame.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TrendResult {
    pub change_points: Vec<NaiveDate>,
    pub global: LineFit,
    pub segments: Vec<SegmentFit>,
    pub frame: TrendFrame,
    pub diagnostics: Diagnostics,
}

fn linear_fit(x: &[f64], y: &[f64]) -> LineFit {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxx += (xi - mean_x) * (xi - mean_x);
        sxy += (xi - mean_x) * (yi - mean_y);
    }
    // A vertical stack of points has no unique slope; report the mean level.
    if sxx <= f64::EPSILON {
        return LineFit {
            slope: 0.0,
            intercept: mean_y,
        };
    }
    let slope = sxy / sxx;
    LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

impl<M: OdeModel> Dynamics<M> {
    /// Detects change points in the S-R plane of the registered data.
    ///
    /// Fully observed rows are projected to x = R-equivalent, y = log10 of
    /// the S-equivalent and ordered by x; the selected search runs over the
    /// y-sequence and the split indices map back to calendar dates. The
    /// first index of each segment after the initial one is a change point;
    /// the trailing
    /// sequence-length index is an array edge, not a change point.
    ///
    /// The table is not modified; apply the result with
    /// [`Dynamics::segment_with_trend`] or [`Dynamics::segment`].
    pub fn trend_analysis(&self, options: &TrendOptions) -> EpiResult<TrendResult> {
        if options.min_size < MIN_SEGMENT_FLOOR {
            return Err(EpiError::invalid_input(format!(
                "min_size must be >= {MIN_SEGMENT_FLOOR}; got {}",
                options.min_size
            )));
        }
        let started = Instant::now();

        let mut dates = Vec::new();
        let mut r = Vec::new();
        let mut actual = Vec::new();
        for (idx, date) in self.table.axis().iter().enumerate() {
            let row = self.table.state_at(idx);
            let (Some(s), Some(i), Some(f), Some(rec)) = (row[0], row[1], row[2], row[3]) else {
                continue;
            };
            let state = SifrState::new(s, i, f, rec);
            let s_eq = M::s_equivalent(&state);
            if s_eq <= 0.0 {
                return Err(EpiError::numerical_issue(format!(
                    "S-equivalent must be > 0 for log scaling; got {s_eq} on {date}"
                )));
            }
            dates.push(date);
            r.push(M::r_equivalent(&state));
            actual.push(s_eq.log10());
        }

        let required = options.min_size * 2;
        if dates.len() < required {
            return Err(EpiError::not_enough_data(
                "fully observed records",
                required,
                dates.len(),
            ));
        }

        // The search runs in x order, not calendar order. The two coincide
        // while the cumulative R-equivalent is nondecreasing; corrections in
        // the registered data can reorder it.
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by(|&a, &b| r[a].total_cmp(&r[b]).then(dates[a].cmp(&dates[b])));
        let dates: Vec<NaiveDate> = order.iter().map(|&i| dates[i]).collect();
        let r: Vec<f64> = order.iter().map(|&i| r[i]).collect();
        let actual: Vec<f64> = order.iter().map(|&i| actual[i]).collect();

        let splits = options.algorithm.find_splits(&actual, options.min_size)?;

        let global = linear_fit(&r, &actual);
        let fitted_global = r.iter().map(|&x| global.predict(x)).collect();

        let mut change_points = Vec::new();
        let mut segments = Vec::new();
        let mut fitted_segments = Vec::new();
        let mut start = 0usize;
        for &end in &splits {
            let line = linear_fit(&r[start..end], &actual[start..end]);
            let mut column = vec![None; dates.len()];
            for idx in start..end {
                column[idx] = Some(line.predict(r[idx]));
            }
            segments.push(SegmentFit {
                start: dates[start],
                end: dates[end - 1],
                line,
            });
            fitted_segments.push(column);
            if start > 0 {
                change_points.push(dates[start]);
            }
            start = end;
        }

        // x order can map a segment start to a late calendar date; such a
        // date cannot legally start a phase and is dropped with a warning.
        change_points.sort_unstable();
        let latest = self.table.axis().latest_change_point();
        let mut warnings = Vec::new();
        change_points.retain(|&point| {
            if point > latest {
                warnings.push(format!(
                    "change point {point} within the final two days was dropped"
                ));
                false
            } else {
                true
            }
        });

        let diagnostics = Diagnostics {
            n: dates.len(),
            runtime_ms: Some(started.elapsed().as_millis() as u64),
            algorithm: options.algorithm.strategy_label().into(),
            cost_model: options.algorithm.cost_label().into(),
            notes: vec![format!("change points detected: {}", change_points.len())],
            warnings,
        };

        Ok(TrendResult {
            change_points,
            global,
            segments,
            frame: TrendFrame {
                dates,
                r,
                actual,
                fitted_global,
                fitted_segments,
            },
            diagnostics,
        })
    }

    /// Runs trend analysis and re-segments the table at the detected change
    /// points; with `overwrite` the previous partition is discarded first,
    /// otherwise the detected points refine it.
    pub fn segment_with_trend(
        &mut self,
        options: &TrendOptions,
        overwrite: bool,
    ) -> EpiResult<TrendResult> {
        let result = self.trend_analysis(options)?;
        self.table = self.table.segmented(&result.change_points, overwrite)?;
        Ok(result)
    }
}
