//! Error types for the backend REST API.

use serde::Deserialize;
use thiserror::Error;

/// A field-level validation failure reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    /// Location path of the offending field (mixed names and indices).
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable failure code.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The `detail` payload of a backend error body. The backend reports either
/// a plain message or a list of validation failures under the same key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the bearer credential, and the token pair could
    /// not be refreshed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request payload failed backend validation.
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Any other non-success backend response.
    #[error("Backend error ({status}): {detail}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Backend-supplied detail, or the raw body when unparseable.
        detail: String,
    },

    /// JSON conversion failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    let parts: Vec<String> = errors
        .iter()
        .map(|e| {
            let path: Vec<String> = e.loc.iter().map(loc_segment).collect();
            if path.is_empty() {
                e.msg.clone()
            } else {
                format!("{}: {}", path.join("."), e.msg)
            }
        })
        .collect();
    parts.join("; ")
}

fn loc_segment(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_field_paths() {
        let errors: Vec<FieldError> = serde_json::from_str(
            r#"[{"loc": ["body", "open_time"], "msg": "invalid time", "type": "value_error"},
                {"loc": ["body", 0], "msg": "missing", "type": "missing"}]"#,
        )
        .unwrap();

        let err = ApiError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: body.open_time: invalid time; body.0: missing"
        );
    }

    #[test]
    fn test_detail_decodes_both_shapes() {
        let message: ErrorBody = serde_json::from_str(r#"{"detail": "Not found"}"#).unwrap();
        assert!(matches!(message.detail, Some(ErrorDetail::Message(m)) if m == "Not found"));

        let fields: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body"], "msg": "bad", "type": "value_error"}]}"#,
        )
        .unwrap();
        assert!(matches!(fields.detail, Some(ErrorDetail::Fields(f)) if f.len() == 1));
    }
}
