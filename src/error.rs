use serde_json::json;
use thiserror::Error;

/// Failures raised by the grading engine. Each one is scoped to the operation
/// that raised it; the roster is left as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// Aggregation was asked to average over nothing.
    #[error("cannot compute {what} over an empty list")]
    EmptyInput { what: &'static str },

    /// The import payload could not be read as a spreadsheet.
    #[error("unreadable import payload: {0}")]
    ImportFormat(String),

    /// The roster snapshot does not have the expected shape.
    #[error("malformed roster snapshot: {0}")]
    RosterFormat(String),

    /// An edit targeted a field that is not a score field or feedback.
    #[error("unknown field: {0}")]
    InvalidField(String),

    /// An edit tried to store a score off the 0 to 100 scale.
    #[error("{field} must be between {min} and {max}, got {value}")]
    ScoreOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// No student selected, unknown student, or subject index out of range.
    #[error("{0}")]
    InvalidSelection(String),

    /// The current role may not call this method.
    #[error("{method} is not available to the {role} role")]
    NotPermitted { method: String, role: &'static str },

    /// A roster or import file could not be read.
    #[error("failed to read {path}: {message}")]
    SourceUnavailable { path: String, message: String },
}

impl GradeError {
    /// Stable wire code used in IPC error replies.
    pub fn code(&self) -> &'static str {
        match self {
            GradeError::EmptyInput { .. } => "empty_input",
            GradeError::ImportFormat(_) => "import_format",
            GradeError::RosterFormat(_) => "roster_format",
            GradeError::InvalidField(_) | GradeError::ScoreOutOfRange { .. } => "invalid_field",
            GradeError::InvalidSelection(_) => "invalid_selection",
            GradeError::NotPermitted { .. } => "forbidden",
            GradeError::SourceUnavailable { .. } => "source_unavailable",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            GradeError::InvalidField(field) => Some(json!({
                "field": field,
                "allowed": crate::model::EDITABLE_FIELDS,
            })),
            GradeError::ScoreOutOfRange {
                field,
                value,
                min,
                max,
            } => Some(json!({
                "field": field,
                "value": value,
                "min": min,
                "max": max,
            })),
            GradeError::NotPermitted { method, role } => {
                Some(json!({ "method": method, "role": role }))
            }
            GradeError::SourceUnavailable { path, .. } => Some(json!({ "path": path })),
            _ => None,
        }
    }
}

pub type GradeResult<T> = Result<T, GradeError>;
