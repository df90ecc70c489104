// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::borrow::Cow;

/// Structured diagnostics captured from an analysis run.
///
/// Reporting is carried in the result value rather than a logging facade,
/// so callers can persist or inspect a run without global state.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    /// Number of points the analysis actually consumed.
    pub n: usize,
    pub runtime_ms: Option<u64>,
    pub algorithm: Cow<'static, str>,
    pub cost_model: Cow<'static, str>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            runtime_ms: None,
            algorithm: Cow::Borrowed(""),
            cost_model: Cow::Borrowed(""),
            notes: vec![],
            warnings: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Diagnostics;

    #[test]
    fn default_is_empty() {
        let diagnostics = Diagnostics::default();
        assert_eq!(diagnostics.n, 0);
        assert!(diagnostics.runtime_ms.is_none());
        assert!(diagnostics.notes.is_empty());
        assert!(diagnostics.warnings.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_preserves_all_fields() {
        let diagnostics = Diagnostics {
            n: 61,
            runtime_ms: Some(3),
            algorithm: "binseg".into(),
            cost_model: "normal".into(),
            notes: vec!["splits=2".to_string()],
            warnings: vec![],
        };
        let encoded = serde_json::to_string(&diagnostics).expect("diagnostics should serialize");
        let decoded: Diagnostics =
            serde_json::from_str(&encoded).expect("diagnostics should deserialize");
        assert_eq!(decoded, diagnostics);
    }
}
