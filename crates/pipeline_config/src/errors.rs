//! Pipeline configuration error types.
//!
//! Every failure produced by this crate means "the input is invalid". Nothing
//! here performs I/O, so there are no transient or retryable errors.

use thiserror::Error;

/// Pipeline configuration errors.
///
/// The variants mirror the kinds of mistakes a caller can make:
/// a malformed pipeline id, a reference to something that does not exist,
/// an internally inconsistent entity, or a sink column type that cannot hold
/// the declared source type. The display text is stable and safe to match on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineConfigError {
    #[error("{0}")]
    InvalidPipelineId(#[from] PipelineIdError),

    #[error("{reason}")]
    MissingReference { field: String, reason: String },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Invalid data type mapping for field '{field_name}' in source '{source_id}': source type '{source_type}' cannot be stored in column type '{column_type}'")]
    InvalidDataTypeMapping {
        field_name: String,
        source_id: String,
        source_type: String,
        column_type: String,
    },

    #[error("Unknown {type_name} value '{value}' (expected one of: {expected})")]
    UnknownEnumValue {
        type_name: String,
        value: String,
        expected: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    ParseError { reason: String },
}

impl PipelineConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingReference {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with the location of the enclosing entity.
    pub(crate) fn within(self, prefix: &str) -> Self {
        match self {
            Self::MissingReference { field, reason } => Self::MissingReference {
                field: format!("{}.{}", prefix, field),
                reason,
            },
            Self::InvalidConfiguration { field, reason } => Self::InvalidConfiguration {
                field: format!("{}.{}", prefix, field),
                reason,
            },
            other => other,
        }
    }

    /// Dot-separated path of the offending field, when the error carries one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidPipelineId(_) => Some("pipeline_id"),
            Self::MissingReference { field, .. } | Self::InvalidConfiguration { field, .. } => {
                Some(field)
            }
            Self::InvalidDataTypeMapping { .. } => Some("schema.fields"),
            Self::UnknownEnumValue { .. } | Self::ParseError { .. } => None,
        }
    }
}

impl From<serde_json::Error> for PipelineConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PipelineConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ParseError {
            reason: err.to_string(),
        }
    }
}

/// Lexical problems with a pipeline id.
///
/// Checked in declaration order; the first failing rule wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineIdError {
    #[error("pipeline_id cannot be empty")]
    Empty,

    #[error("pipeline_id cannot be longer than {max} characters (got {length})")]
    TooLong { length: usize, max: usize },

    #[error("pipeline_id can only contain lowercase letters, numbers, and hyphens")]
    InvalidCharacters,

    #[error("pipeline_id must start with a lowercase letter or number")]
    InvalidStart,

    #[error("pipeline_id must end with a lowercase letter or number")]
    InvalidEnd,
}

/// Result type alias for pipeline configuration operations.
pub type PipelineConfigResult<T> = Result<T, PipelineConfigError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
