//! Tests for configuration error types.

use super::*;

#[test]
fn test_pipeline_id_error_messages() {
    assert_eq!(
        PipelineIdError::Empty.to_string(),
        "pipeline_id cannot be empty"
    );
    assert_eq!(
        PipelineIdError::TooLong {
            length: 41,
            max: 40
        }
        .to_string(),
        "pipeline_id cannot be longer than 40 characters (got 41)"
    );
    assert!(PipelineIdError::InvalidStart
        .to_string()
        .contains("must start with"));
    assert!(PipelineIdError::InvalidEnd.to_string().contains("must end with"));
}

#[test]
fn test_pipeline_id_error_converts_transparently() {
    let err: PipelineConfigError = PipelineIdError::InvalidCharacters.into();
    assert_eq!(
        err.to_string(),
        "pipeline_id can only contain lowercase letters, numbers, and hyphens"
    );
    assert_eq!(err.field(), Some("pipeline_id"));
}

#[test]
fn test_missing_reference_displays_reason_only() {
    let err = PipelineConfigError::missing(
        "schema.fields[0].source_id",
        "Source 'user_logins' does not exist in any topic",
    );
    assert_eq!(
        err.to_string(),
        "Source 'user_logins' does not exist in any topic"
    );
    assert_eq!(err.field(), Some("schema.fields[0].source_id"));
}

#[test]
fn test_invalid_data_type_mapping_names_every_part() {
    let err = PipelineConfigError::InvalidDataTypeMapping {
        field_name: "is_active".to_string(),
        source_id: "users".to_string(),
        source_type: "bool".to_string(),
        column_type: "Int32".to_string(),
    };

    let message = err.to_string();
    assert!(message.contains("is_active"));
    assert!(message.contains("users"));
    assert!(message.contains("bool"));
    assert!(message.contains("Int32"));
}

#[test]
fn test_parse_error_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: PipelineConfigError = json_err.into();
    assert!(matches!(err, PipelineConfigError::ParseError { .. }));
    assert_eq!(err.field(), None);
}

#[test]
fn test_within_prefixes_field_path() {
    let err = PipelineConfigError::invalid("id_field", "id_field is required when deduplication is enabled")
        .within("deduplication")
        .within("source.topics[orders]");
    assert_eq!(err.field(), Some("source.topics[orders].deduplication.id_field"));

    // Errors without a field path pass through untouched.
    let err = PipelineConfigError::ParseError {
        reason: "bad".to_string(),
    };
    assert_eq!(err.clone().within("source"), err);
}
