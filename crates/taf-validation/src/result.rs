//! Validation outcome types.

use serde::Serialize;
use serde_json::{json, Value};

use crate::report::ErrorsByPath;

/// Outcome of a two-pass TAF validation.
///
/// `errors` is present exactly when validation failed; it maps JSON
/// Pointers into the submitted document to the human-readable messages
/// collected for that spot. The raw engine reports ride along on failure
/// for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TafValidationResult {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_report: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_report: Option<Value>,
}

impl TafValidationResult {
    /// A clean pass: no errors, no reports.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            succeeded: true,
            errors: None,
            structural_report: None,
            enriched_report: None,
        }
    }

    /// A failed pass with errors grouped per instance pointer.
    #[must_use]
    pub fn failure(
        errors: &ErrorsByPath,
        structural_report: Option<Value>,
        enriched_report: Option<Value>,
    ) -> Self {
        let body = errors
            .iter()
            .map(|(path, messages)| {
                let list: Vec<Value> =
                    messages.iter().map(|m| Value::String(m.clone())).collect();
                (path.clone(), Value::Array(list))
            })
            .collect();
        Self {
            succeeded: false,
            errors: Some(Value::Object(body)),
            structural_report,
            enriched_report,
        }
    }

    /// A failure with a single synthetic message instead of per-path errors.
    #[must_use]
    pub fn synthetic(
        message: &str,
        structural_report: Option<Value>,
        enriched_report: Option<Value>,
    ) -> Self {
        Self {
            succeeded: false,
            errors: Some(json!({ "message": message })),
            structural_report,
            enriched_report,
        }
    }
}
