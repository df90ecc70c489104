// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::NaiveDate;

/// Workspace-wide result alias.
pub type EpiResult<T> = Result<T, EpiError>;

/// Unified error type for the dynamics engine and its collaborators.
///
/// Every operation fails before mutating any state; there is no
/// partial-success mode anywhere in the workspace.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EpiError {
    /// A required configuration value was never set (e.g. tau).
    #[error("configuration value not set: {0}")]
    Configuration(String),

    /// Caller-supplied arguments violate a stated constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required records are absent for a specific date.
    #[error("missing required data on {date}: {details}")]
    MissingData { date: NaiveDate, details: String },

    /// Fewer usable records than an analysis needs.
    #[error("not enough records for {subject}: required {required}, got {actual}")]
    NotEnoughData {
        subject: String,
        required: usize,
        actual: usize,
    },

    /// A computation produced a non-finite or otherwise unusable value.
    #[error("numerical issue: {0}")]
    NumericalIssue(String),

    /// A requested variant is outside the supported closed set.
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl EpiError {
    pub fn configuration(what: impl Into<String>) -> Self {
        Self::Configuration(what.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn missing_data(date: NaiveDate, details: impl Into<String>) -> Self {
        Self::MissingData {
            date,
            details: details.into(),
        }
    }

    pub fn not_enough_data(subject: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::NotEnoughData {
            subject: subject.into(),
            required,
            actual,
        }
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }
}
