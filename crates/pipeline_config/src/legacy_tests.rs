//! Tests for the v1 shape and its migration

use super::*;
use crate::data_types::SinkColumnType;
use crate::patch::Patchable;
use crate::pipeline::PipelineConfigPatch;
use serde_json::json;
use tracing_test::traced_test;

fn create_legacy_document() -> Value {
    json!({
        "version": "v1",
        "pipeline_id": "legacy-orders",
        "source": {
            "type": "kafka",
            "connection_params": {"brokers": ["kafka:9092"], "skip_auth": true},
            "topics": [
                {
                    "name": "orders",
                    "deduplication": {
                        "enabled": true,
                        "id_field": "order_id",
                        "id_field_type": "string",
                        "time_window": "12h"
                    },
                    "schema": {
                        "type": "json",
                        "fields": [
                            {"name": "order_id", "type": "string"},
                            {"name": "amount", "type": "float64"},
                            {"name": "note", "type": "string"}
                        ]
                    }
                }
            ]
        },
        "sink": {
            "type": "clickhouse",
            "host": "clickhouse",
            "port": 9000,
            "database": "default",
            "table": "orders",
            "table_mapping": [
                {"source_id": "orders", "field_name": "order_id", "column_name": "id", "column_type": "String"},
                {"source_id": "orders", "field_name": "amount", "column_name": "amount", "column_type": "Float64"}
            ]
        }
    })
}

#[test]
fn test_detects_legacy_shape() {
    assert!(is_legacy_document(&create_legacy_document()).unwrap());

    let mut unversioned = create_legacy_document();
    unversioned.as_object_mut().unwrap().remove("version");
    assert!(is_legacy_document(&unversioned).unwrap());

    let mut current = create_legacy_document();
    current["version"] = json!("V2");
    assert!(!is_legacy_document(&current).unwrap());

    let mut bogus = create_legacy_document();
    bogus["version"] = json!("v3");
    assert!(matches!(
        is_legacy_document(&bogus),
        Err(PipelineConfigError::UnknownEnumValue { .. })
    ));

    let mut numeric = create_legacy_document();
    numeric["version"] = json!(1);
    assert!(matches!(
        is_legacy_document(&numeric),
        Err(PipelineConfigError::ParseError { .. })
    ));
}

/// Verify that inline fields and table mappings merge into one schema.
#[test]
#[traced_test]
fn test_migrates_to_single_schema() {
    let config = PipelineConfig::from_value(create_legacy_document()).unwrap();

    let fields = &config.schema().fields;
    assert_eq!(fields.len(), 3);

    let order_id = config.schema().field("order_id", Some("orders")).unwrap();
    assert_eq!(order_id.column_name.as_deref(), Some("id"));
    assert_eq!(order_id.column_type, Some(SinkColumnType::String));

    let note = config.schema().field("note", Some("orders")).unwrap();
    assert!(!note.is_mapped());

    assert!(config.sink().table_mapping.is_none());
    assert_eq!(config.version(), ConfigVersion::V2);
    assert_eq!(config.name(), "Legacy Orders");
    assert!(logs_contain("Migrated legacy pipeline configuration"));
}

#[test]
fn test_mapping_without_declared_field_rejected() {
    let mut document = create_legacy_document();
    document["sink"]["table_mapping"][1]["field_name"] = json!("total");

    let err = PipelineConfig::from_value(document).unwrap_err();
    assert!(matches!(err, PipelineConfigError::MissingReference { .. }));
    assert_eq!(
        err.to_string(),
        "Table mapping field 'total' does not exist in topic 'orders' schema"
    );
    assert_eq!(err.field(), Some("sink.table_mapping[1]"));
}

#[test]
fn test_duplicate_inline_fields_collapse() {
    let mut document = create_legacy_document();
    document["source"]["topics"][0]["schema"]["fields"]
        .as_array_mut()
        .unwrap()
        .push(json!({"name": "amount", "type": "float64"}));

    let config = PipelineConfig::from_value(document).unwrap();
    assert_eq!(config.schema().fields.len(), 3);
}

#[test]
fn test_migrated_config_still_validated() {
    let mut document = create_legacy_document();
    document["sink"]["table_mapping"][1]["column_type"] = json!("Bool");

    assert!(matches!(
        PipelineConfig::from_value(document),
        Err(PipelineConfigError::InvalidDataTypeMapping { .. })
    ));
}

/// Verify that migrating a restated configuration yields the original.
#[test]
fn test_restate_then_migrate_is_identity() {
    let config = PipelineConfig::from_value(create_legacy_document()).unwrap();

    let legacy = config.to_legacy();
    assert_eq!(legacy.version, Some(ConfigVersion::V1));
    assert_eq!(legacy.sink.table_mapping.as_ref().map(Vec::len), Some(2));
    assert_eq!(legacy.source.topics[0].schema.fields.len(), 3);

    assert_eq!(legacy.clone().migrate().unwrap(), config);

    let value = serde_json::to_value(&legacy).unwrap();
    assert_eq!(value["version"], json!("v1"));
    assert_eq!(PipelineConfig::from_value(value).unwrap(), config);
}

/// Verify that a sink table mapping on a v2 configuration does not survive
/// restatement, while the schema bindings do.
#[test]
fn test_restate_drops_sink_table_mapping() {
    let config = PipelineConfig::from_value(create_legacy_document()).unwrap();
    let patch = PipelineConfigPatch::from_value(json!({
        "sink": {
            "table_mapping": [
                {"source_id": "orders", "field_name": "order_id", "column_name": "id", "column_type": "String"},
                {"source_id": "orders", "field_name": "note", "column_name": "note", "column_type": "String"}
            ]
        }
    }))
    .unwrap();
    let with_mapping = config.update(&patch).unwrap();
    assert_eq!(with_mapping.sink().table_mapping.as_ref().map(Vec::len), Some(2));

    let legacy = with_mapping.to_legacy();
    let mapped: Vec<&str> = legacy
        .sink
        .table_mapping
        .iter()
        .flatten()
        .map(|m| m.field_name.as_str())
        .collect();
    assert_eq!(mapped, vec!["order_id", "amount"]);

    let migrated = legacy.migrate().unwrap();
    assert!(migrated.sink().table_mapping.is_none());
    assert_eq!(migrated.schema(), with_mapping.schema());
    assert_eq!(migrated, config);
}

#[test]
fn test_migrated_config_accepts_patches() {
    let config = PipelineConfig::from_value(create_legacy_document()).unwrap();
    let patch = PipelineConfigPatch::from_value(json!({"sink": {"max_batch_size": 5000}})).unwrap();

    let updated = config.update(&patch).unwrap();
    assert_eq!(updated.sink().max_batch_size, 5000);
    assert_eq!(updated.schema(), config.schema());
}
