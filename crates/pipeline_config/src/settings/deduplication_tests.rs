//! Tests for DeduplicationConfig

use super::*;
use serde_json::json;

fn parse(value: serde_json::Value) -> DeduplicationConfig {
    serde_json::from_value::<DeduplicationConfig>(value).expect("Failed to deserialize")
}

#[test]
fn test_disabled_blank_fields_normalize_to_none() {
    let dedup = parse(json!({
        "enabled": false,
        "id_field": "",
        "id_field_type": "",
        "time_window": "  "
    }));

    assert_eq!(dedup.id_field, None);
    assert_eq!(dedup.id_field_type, None);
    assert_eq!(dedup.time_window, None);
    assert!(dedup.validate().is_ok());
}

/// Verify that a standalone disabled rule writes back without blank fields.
#[test]
fn test_disabled_blank_fields_not_serialized() {
    let dedup = parse(json!({"enabled": false, "id_field": ""}));
    assert_eq!(dedup, DeduplicationConfig::disabled());
    assert_eq!(serde_json::to_value(&dedup).unwrap(), json!({"enabled": false}));
}

#[test]
fn test_enabled_blank_fields_kept_for_validation() {
    let dedup = parse(json!({"enabled": true, "id_field": " ", "time_window": "1h"}));
    assert_eq!(dedup.id_field.as_deref(), Some(" "));
    assert!(dedup.validate().is_err());
}

#[test]
fn test_enabled_requires_id_field() {
    let dedup = parse(json!({
        "enabled": true,
        "id_field": "",
        "id_field_type": "string",
        "time_window": "1h"
    }));

    let err = dedup.validate().unwrap_err();
    assert!(err.to_string().contains("id_field is required"));
    assert_eq!(err.field(), Some("id_field"));
}

#[test]
fn test_enabled_requires_type_and_window() {
    let missing_type = parse(json!({"enabled": true, "id_field": "id", "time_window": "1h"}));
    assert!(missing_type
        .validate()
        .unwrap_err()
        .to_string()
        .contains("id_field_type is required"));

    let missing_window = parse(json!({"enabled": true, "id_field": "id", "id_field_type": "int64"}));
    assert!(missing_window
        .validate()
        .unwrap_err()
        .to_string()
        .contains("time_window is required"));
}

#[test]
fn test_key_type_is_restricted() {
    let err = DeduplicationConfig::enabled("flag", SourceFieldType::Bool, "1h").unwrap_err();
    assert!(err.to_string().contains("must be one of: string, int32, int64"));

    assert!(DeduplicationConfig::enabled("id", SourceFieldType::Int32, "30m").is_ok());
    assert!(DeduplicationConfig::enabled("id", SourceFieldType::Int64, "30m").is_ok());
}

#[test]
fn test_type_tag_is_case_insensitive() {
    let dedup = parse(json!({
        "enabled": true,
        "id_field": "event_id",
        "id_field_type": "STRING",
        "time_window": "1h"
    }));
    assert_eq!(dedup.id_field_type, Some(SourceFieldType::String));
}

#[test]
fn test_update_overrides_only_present_fields() {
    let base = DeduplicationConfig::enabled("event_id", SourceFieldType::String, "1h").unwrap();
    let patch = DeduplicationConfigPatch {
        time_window: Some(Some("2h".to_string())),
        ..Default::default()
    };

    let updated = base.update(&patch).unwrap();
    assert_eq!(updated.time_window.as_deref(), Some("2h"));
    assert_eq!(updated.id_field.as_deref(), Some("event_id"));
    assert_eq!(base.time_window.as_deref(), Some("1h"));
}

#[test]
fn test_update_disabling_keeps_other_fields() {
    let base = DeduplicationConfig::enabled("event_id", SourceFieldType::String, "1h").unwrap();
    let patch: DeduplicationConfigPatch = serde_json::from_value(json!({"enabled": false})).unwrap();

    let updated = base.update(&patch).unwrap();
    assert!(!updated.enabled);
    assert_eq!(updated.id_field.as_deref(), Some("event_id"));
}

#[test]
fn test_update_clearing_required_field_is_rejected() {
    let base = DeduplicationConfig::enabled("event_id", SourceFieldType::String, "1h").unwrap();
    let patch: DeduplicationConfigPatch = serde_json::from_value(json!({"id_field": null})).unwrap();
    assert_eq!(patch.id_field, Some(None));

    assert!(base.update(&patch).is_err());
}

#[test]
fn test_empty_patch_returns_equal_copy() {
    let base = DeduplicationConfig::enabled("event_id", SourceFieldType::String, "1h").unwrap();
    let updated = base.update(&DeduplicationConfigPatch::default()).unwrap();
    assert_eq!(updated, base);
}
