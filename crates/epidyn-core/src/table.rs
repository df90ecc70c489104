// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::axis::DateAxis;
use crate::error::{EpiError, EpiResult};
use chrono::NaiveDate;

/// A maximal contiguous run of dates sharing one phase id.
///
/// Phases are never stored; they are recovered on demand by grouping the
/// table on its phase column, so every consumer derives them identically.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseSpan {
    pub id: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_idx: usize,
    pub end_idx: usize,
}

impl PhaseSpan {
    /// Number of dates in the phase.
    pub fn days(&self) -> usize {
        self.end_idx - self.start_idx + 1
    }
}

/// Date-indexed dynamics table: phase id, four canonical state columns and
/// one column per ODE parameter, over a fixed daily axis.
///
/// Mutating operations produce a new table value which the owner swaps in,
/// so a failed operation never leaves the table half-updated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StateTable {
    axis: DateAxis,
    param_names: Vec<String>,
    phase: Vec<u32>,
    state: Vec<[Option<f64>; 4]>,
    params: Vec<Vec<Option<f64>>>,
}

impl StateTable {
    /// Creates an all-missing table with phase id 0 everywhere.
    pub fn new(axis: DateAxis, param_names: Vec<String>) -> Self {
        let n = axis.len();
        let width = param_names.len();
        Self {
            axis,
            param_names,
            phase: vec![0; n],
            state: vec![[None; 4]; n],
            params: vec![vec![None; width]; n],
        }
    }

    pub fn axis(&self) -> &DateAxis {
        &self.axis
    }

    pub fn len(&self) -> usize {
        self.phase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn phase_id(&self, idx: usize) -> u32 {
        self.phase[idx]
    }

    pub fn state_at(&self, idx: usize) -> [Option<f64>; 4] {
        self.state[idx]
    }

    pub fn params_at(&self, idx: usize) -> &[Option<f64>] {
        &self.params[idx]
    }

    pub fn set_state(&mut self, idx: usize, var: usize, value: f64) {
        self.state[idx][var] = Some(value);
    }

    pub fn set_param(&mut self, idx: usize, param: usize, value: f64) {
        self.params[idx][param] = Some(value);
    }

    /// The four state values at the first date, if fully observed.
    pub fn first_state(&self) -> Option<[f64; 4]> {
        let row = self.state.first()?;
        Some([row[0]?, row[1]?, row[2]?, row[3]?])
    }

    /// Each parameter column carried forward from its first observed value.
    pub fn forward_filled_params(&self) -> Vec<Vec<Option<f64>>> {
        let mut filled = self.params.clone();
        for col in 0..self.param_names.len() {
            let mut carry: Option<f64> = None;
            for row in filled.iter_mut() {
                match row[col] {
                    Some(v) => carry = Some(v),
                    None => row[col] = carry,
                }
            }
        }
        filled
    }

    /// Checks candidate change points against the axis: every point must be
    /// an axis date no later than `last - 2 days`, without duplicates.
    ///
    /// Returns the points in chronological order. Validation happens before
    /// any mutation, so a rejected call leaves the table untouched.
    fn validated_points(&self, points: &[NaiveDate]) -> EpiResult<Vec<NaiveDate>> {
        let latest = self.axis.latest_change_point();
        let mut sorted = points.to_vec();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                return Err(EpiError::invalid_input(format!(
                    "duplicate change point {}",
                    pair[0]
                )));
            }
        }
        for &point in &sorted {
            if !self.axis.contains(point) || point > latest {
                return Err(EpiError::invalid_input(format!(
                    "change point {point} is outside the valid range [{}, {latest}]",
                    self.axis.first()
                )));
            }
        }
        Ok(sorted)
    }

    /// Returns a copy of the table re-segmented at `points`.
    ///
    /// With `overwrite` the phase column is reset to 0 first. Each change
    /// point then increments the phase id of that date and every later date,
    /// which yields contiguous, strictly increasing ids at each boundary.
    /// A point equal to the first date is accepted but changes nothing: a
    /// phase already starts there.
    pub fn segmented(&self, points: &[NaiveDate], overwrite: bool) -> EpiResult<Self> {
        let sorted = self.validated_points(points)?;
        let mut table = self.clone();
        if overwrite {
            table.phase.fill(0);
        }
        for point in sorted {
            if point == table.axis.first() {
                continue;
            }
            let idx = table
                .axis
                .index_of(point)
                .ok_or_else(|| EpiError::invalid_input(format!("change point {point} left the axis")))?;
            for id in table.phase[idx..].iter_mut() {
                *id += 1;
            }
        }
        Ok(table)
    }

    /// Ordered phase spans derived from the phase column.
    ///
    /// Ids are assigned by run order starting at 0, so they stay contiguous
    /// even if additive segmentation left gaps in the raw column values.
    pub fn phases(&self) -> Vec<PhaseSpan> {
        let mut spans = Vec::new();
        let mut start_idx = 0usize;
        for idx in 1..=self.phase.len() {
            let run_ends = idx == self.phase.len() || self.phase[idx] != self.phase[start_idx];
            if run_ends {
                let id = spans.len();
                spans.push(PhaseSpan {
                    id,
                    start: self.axis.first() + chrono::Days::new(start_idx as u64),
                    end: self.axis.first() + chrono::Days::new((idx - 1) as u64),
                    start_idx,
                    end_idx: idx - 1,
                });
                start_idx = idx;
            }
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::StateTable;
    use crate::axis::DateAxis;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn table_over_january() -> StateTable {
        let axis = DateAxis::new(date(2020, 1, 1), date(2020, 1, 10)).expect("valid range");
        StateTable::new(axis, vec!["rho".to_string(), "sigma".to_string()])
    }

    #[test]
    fn new_table_is_phase_zero_and_all_missing() {
        let table = table_over_january();
        assert_eq!(table.len(), 10);
        for idx in 0..table.len() {
            assert_eq!(table.phase_id(idx), 0);
            assert_eq!(table.state_at(idx), [None; 4]);
            assert!(table.params_at(idx).iter().all(Option::is_none));
        }
        let phases = table.phases();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].days(), 10);
    }

    #[test]
    fn phase_id_equals_count_of_change_points_not_after_date() {
        let table = table_over_january();
        let points = [date(2020, 1, 3), date(2020, 1, 7)];
        let table = table.segmented(&points, true).expect("valid points");
        for idx in 0..table.len() {
            let d = table.axis().date_at(idx).expect("in range");
            let expected = points.iter().filter(|&&p| p <= d).count() as u32;
            assert_eq!(table.phase_id(idx), expected, "at {d}");
        }
    }

    #[test]
    fn unsorted_points_yield_the_same_segmentation() {
        let table = table_over_january();
        let sorted = table
            .segmented(&[date(2020, 1, 3), date(2020, 1, 7)], true)
            .expect("valid points");
        let unsorted = table
            .segmented(&[date(2020, 1, 7), date(2020, 1, 3)], true)
            .expect("valid points");
        assert_eq!(sorted, unsorted);
    }

    #[test]
    fn first_date_point_is_a_no_op_boundary() {
        let table = table_over_january();
        let table = table
            .segmented(&[date(2020, 1, 1), date(2020, 1, 5)], true)
            .expect("first date is a valid candidate");
        assert_eq!(table.phase_id(0), 0);
        assert_eq!(table.phases().len(), 2);
    }

    #[test]
    fn duplicate_points_are_rejected_without_mutation() {
        let table = table_over_january();
        let before = table.clone();
        let err = table
            .segmented(&[date(2020, 1, 3), date(2020, 1, 3)], true)
            .expect_err("duplicates must be rejected");
        assert!(err.to_string().contains("duplicate"));
        assert_eq!(table, before);
    }

    #[test]
    fn points_in_last_two_days_are_rejected() {
        let table = table_over_january();
        for bad in [date(2020, 1, 9), date(2020, 1, 10), date(2020, 2, 1)] {
            let err = table.segmented(&[bad], true).expect_err("out of range");
            assert!(err.to_string().contains("outside the valid range"), "{bad}");
        }
        assert!(table.segmented(&[date(2020, 1, 8)], true).is_ok());
    }

    #[test]
    fn additive_segmentation_refines_existing_phases() {
        let table = table_over_january();
        let table = table.segmented(&[date(2020, 1, 5)], true).expect("valid");
        let table = table.segmented(&[date(2020, 1, 3)], false).expect("valid");
        let phases = table.phases();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].start, date(2020, 1, 1));
        assert_eq!(phases[1].start, date(2020, 1, 3));
        assert_eq!(phases[2].start, date(2020, 1, 5));
        assert_eq!(phases[2].end, date(2020, 1, 10));
        for (idx, span) in phases.iter().enumerate() {
            assert_eq!(span.id, idx);
        }
    }

    #[test]
    fn forward_fill_carries_each_parameter_independently() {
        let mut table = table_over_january();
        table.set_param(2, 0, 0.2);
        table.set_param(5, 0, 0.4);
        table.set_param(4, 1, 0.075);
        let filled = table.forward_filled_params();
        assert_eq!(filled[0], vec![None, None]);
        assert_eq!(filled[2], vec![Some(0.2), None]);
        assert_eq!(filled[4], vec![Some(0.2), Some(0.075)]);
        assert_eq!(filled[5], vec![Some(0.4), Some(0.075)]);
        assert_eq!(filled[9], vec![Some(0.4), Some(0.075)]);
    }
}
