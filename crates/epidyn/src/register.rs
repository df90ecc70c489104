// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::NaiveDate;
use epidyn_core::{DateAxis, Observation, StateTable};

/// Overlays observation rows onto a fresh all-missing table.
///
/// Dates outside the axis are silently ignored; rows are applied in order,
/// so a later row overwrites the cells an earlier row set for the same
/// date. Parameter names the table does not know are dropped.
pub(crate) fn overlay(table: &mut StateTable, rows: &[Observation]) {
    let names: Vec<String> = table.param_names().to_vec();
    for row in rows {
        let Some(idx) = table.axis().index_of(row.date) else {
            continue;
        };
        for (var, value) in row.state.iter().enumerate() {
            if let Some(v) = *value {
                table.set_state(idx, var, v);
            }
        }
        for (name, value) in &row.params {
            if let Some(param) = names.iter().position(|n| n == name) {
                table.set_param(idx, param, *value);
            }
        }
    }
}

/// Dates at which the forward-filled parameter vector changes value.
///
/// Pure over the filled matrix: the first date never appears (a phase
/// already starts there) and dates inside the final two days are dropped,
/// since they cannot legally start a phase.
pub(crate) fn derive_change_points(
    filled: &[Vec<Option<f64>>],
    axis: &DateAxis,
) -> Vec<NaiveDate> {
    let latest = axis.latest_change_point();
    let mut points = Vec::new();
    for idx in 1..filled.len() {
        if filled[idx] != filled[idx - 1] {
            if let Ok(date) = axis.date_at(idx) {
                if date <= latest {
                    points.push(date);
                }
            }
        }
    }
    points
}
