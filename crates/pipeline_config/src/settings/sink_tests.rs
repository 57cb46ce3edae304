//! Tests for SinkConfig and TableMapping

use super::*;
use serde_json::json;

fn create_test_sink() -> SinkConfig {
    SinkConfig {
        username: "default".to_string(),
        password: "secret".to_string(),
        ..SinkConfig::new("clickhouse", 9000, "analytics", "orders")
    }
}

#[test]
fn test_defaults_from_document() {
    let sink: SinkConfig = serde_json::from_value(json!({
        "type": "ClickHouse",
        "host": "clickhouse",
        "port": 9000,
        "database": "analytics",
        "table": "orders"
    }))
    .unwrap();

    assert_eq!(sink.sink_type, SinkType::Clickhouse);
    assert_eq!(sink.max_batch_size, 1000);
    assert_eq!(sink.max_delay_time, "10s");
    assert!(!sink.secure);
    assert!(sink.table_mapping.is_none());
}

#[test]
fn test_required_strings() {
    let mut sink = create_test_sink();
    sink.host = String::new();
    assert!(sink.validate().unwrap_err().to_string().contains("host cannot be empty"));

    let mut sink = create_test_sink();
    sink.table = " ".to_string();
    assert_eq!(sink.validate().unwrap_err().field(), Some("table"));
}

#[test]
fn test_batch_size_must_be_positive() {
    let mut sink = create_test_sink();
    sink.max_batch_size = 0;
    assert!(sink.validate().is_err());
}

#[test]
fn test_table_mapping_entries_validated() {
    let mut sink = create_test_sink();
    sink.table_mapping = Some(vec![
        TableMapping::new("orders", "order_id", "order_id", SinkColumnType::String),
        TableMapping::new("orders", "", "amount", SinkColumnType::Float64),
    ]);
    assert_eq!(
        sink.validate().unwrap_err().field(),
        Some("table_mapping[1].field_name")
    );
}

#[test]
fn test_update_host_only() {
    let base = create_test_sink();
    let patch: SinkConfigPatch = serde_json::from_value(json!({"host": "new-host"})).unwrap();

    let updated = base.update(&patch).unwrap();
    assert_eq!(updated.host, "new-host");
    assert_eq!(updated.port, base.port);
    assert_eq!(updated.password, base.password);
    assert_eq!(base.host, "clickhouse");
}

#[test]
fn test_update_replaces_table_mapping() {
    let mut base = create_test_sink();
    base.table_mapping = Some(vec![TableMapping::new(
        "orders",
        "order_id",
        "order_id",
        SinkColumnType::String,
    )]);

    let patch: SinkConfigPatch = serde_json::from_value(json!({"table_mapping": null})).unwrap();
    let updated = base.update(&patch).unwrap();
    assert!(updated.table_mapping.is_none());

    let patch = SinkConfigPatch {
        table_mapping: Some(Some(vec![TableMapping::new(
            "orders",
            "amount",
            "amount",
            SinkColumnType::Float64,
        )])),
        ..Default::default()
    };
    let updated = base.update(&patch).unwrap();
    assert_eq!(updated.table_mapping.as_ref().unwrap()[0].field_name, "amount");
}

#[test]
fn test_table_mapping_update() {
    let base = TableMapping::new("orders", "order_id", "order_id", SinkColumnType::String);
    let patch: TableMappingPatch =
        serde_json::from_value(json!({"column_type": "uuid"})).unwrap();

    let updated = base.update(&patch).unwrap();
    assert_eq!(updated.column_type, SinkColumnType::Uuid);
    assert_eq!(updated.column_name, "order_id");
}
