// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::{EpiError, EpiResult};
use chrono::{Days, NaiveDate};

/// Minimum number of trailing days a change point must leave at the end of
/// the axis, so that the final phase keeps a usable length.
pub const CHANGE_POINT_TAIL_DAYS: u64 = 2;

/// Fixed closed date range at daily granularity.
///
/// The axis is set at construction time and never extended or truncated;
/// every registration and segmentation targets dates inside it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateAxis {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateAxis {
    pub fn new(first: NaiveDate, last: NaiveDate) -> EpiResult<Self> {
        if last < first {
            return Err(EpiError::invalid_input(format!(
                "date range is inverted: first={first}, last={last}"
            )));
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    /// Number of days in the closed range, `(last - first).days + 1`.
    pub fn len(&self) -> usize {
        (self.last - self.first).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Position of `date` on the axis, or `None` when outside the range.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.first).num_days() as usize)
        } else {
            None
        }
    }

    /// Date at position `idx`; `idx` must be `< len()`.
    pub fn date_at(&self, idx: usize) -> EpiResult<NaiveDate> {
        if idx >= self.len() {
            return Err(EpiError::invalid_input(format!(
                "axis index {idx} out of range for {} days",
                self.len()
            )));
        }
        self.first
            .checked_add_days(Days::new(idx as u64))
            .ok_or_else(|| EpiError::invalid_input(format!("axis date overflow at index {idx}")))
    }

    /// Latest date a change point may take: `last - CHANGE_POINT_TAIL_DAYS`.
    pub fn latest_change_point(&self) -> NaiveDate {
        self.last
            .checked_sub_days(Days::new(CHANGE_POINT_TAIL_DAYS))
            .unwrap_or(self.first)
            .max(self.first)
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len()).map(move |idx| self.first + Days::new(idx as u64))
    }
}
