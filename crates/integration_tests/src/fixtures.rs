//! Test fixtures for integration tests.
//!
//! Raw configuration documents as they would arrive from a file or an API
//! response. Every fixture here is valid unless its name says otherwise.

use pipeline_config::PipelineConfig;
use serde_json::{json, Value};

/// Current (v2) configuration documents.
pub mod documents {
    use super::*;

    /// One topic, no join, every field mapped to a column.
    pub fn single_topic() -> Value {
        json!({
            "pipeline_id": "test-pipeline",
            "source": {
                "type": "kafka",
                "provider": "confluent",
                "connection_params": {
                    "brokers": ["broker-1:9092", "broker-2:9092"],
                    "protocol": "SASL_SSL",
                    "mechanism": "PLAIN",
                    "username": "pipeline",
                    "password": "secret"
                },
                "topics": [
                    {
                        "name": "orders",
                        "consumer_group_initial_offset": "earliest",
                        "replicas": 2,
                        "deduplication": {
                            "enabled": true,
                            "id_field": "order_id",
                            "id_field_type": "string",
                            "time_window": "1h"
                        }
                    }
                ]
            },
            "sink": {
                "type": "clickhouse",
                "host": "clickhouse.internal",
                "port": 9440,
                "http_port": 8443,
                "database": "analytics",
                "username": "writer",
                "password": "pw",
                "secure": true,
                "max_batch_size": 5000,
                "max_delay_time": "30s",
                "table": "orders"
            },
            "schema": {
                "fields": [
                    {"source_id": "orders", "name": "order_id", "type": "string", "column_name": "order_id", "column_type": "String"},
                    {"source_id": "orders", "name": "customer_id", "type": "int64", "column_name": "customer_id", "column_type": "Int64"},
                    {"source_id": "orders", "name": "amount", "type": "float64", "column_name": "amount", "column_type": "Float64"},
                    {"source_id": "orders", "name": "created_at", "type": "string", "column_name": "created_at", "column_type": "DateTime64"}
                ]
            }
        })
    }

    /// Two topics joined on `user_id`, with a filter, metadata and resources.
    pub fn joined_topics() -> Value {
        json!({
            "pipeline_id": "user-logins-enriched",
            "name": "User logins enriched",
            "source": {
                "type": "kafka",
                "connection_params": {"brokers": ["kafka:9092"]},
                "topics": [
                    {"name": "user_logins"},
                    {"name": "users", "consumer_group_initial_offset": "earliest"}
                ]
            },
            "join": {
                "enabled": true,
                "type": "temporal",
                "sources": [
                    {"source_id": "user_logins", "join_key": "user_id", "time_window": "1h", "orientation": "left"},
                    {"source_id": "users", "join_key": "user_id", "time_window": "1h", "orientation": "right"}
                ]
            },
            "filter": {"enabled": true, "expression": "country != 'test'"},
            "metadata": {"tags": ["auth", "prod"]},
            "resources": {
                "join": {
                    "replicas": 2,
                    "requests": {"cpu": "250m", "memory": "256Mi"},
                    "limits": {"cpu": "1", "memory": "1Gi"}
                }
            },
            "sink": {
                "type": "clickhouse",
                "host": "clickhouse",
                "port": 9000,
                "database": "default",
                "table": "user_logins_enriched"
            },
            "schema": {
                "fields": [
                    {"source_id": "user_logins", "name": "session_id", "type": "string", "column_name": "session_id", "column_type": "UUID"},
                    {"source_id": "user_logins", "name": "user_id", "type": "int64", "column_name": "user_id", "column_type": "Int64"},
                    {"source_id": "user_logins", "name": "timestamp", "type": "int64", "column_name": "login_at", "column_type": "DateTime"},
                    {"source_id": "users", "name": "user_id", "type": "int64"},
                    {"source_id": "users", "name": "country", "type": "string", "column_name": "country", "column_type": "LowCardinality(String)"},
                    {"source_id": "users", "name": "roles", "type": "array", "column_name": "roles", "column_type": "Array(String)"}
                ]
            }
        })
    }

    /// [`joined_topics`] rendered as YAML.
    pub fn joined_topics_yaml() -> &'static str {
        r#"
pipeline_id: user-logins-enriched
name: User logins enriched
source:
  type: kafka
  connection_params:
    brokers:
      - kafka:9092
  topics:
    - name: user_logins
    - name: users
      consumer_group_initial_offset: earliest
join:
  enabled: true
  type: temporal
  sources:
    - source_id: user_logins
      join_key: user_id
      time_window: 1h
      orientation: left
    - source_id: users
      join_key: user_id
      time_window: 1h
      orientation: right
filter:
  enabled: true
  expression: "country != 'test'"
metadata:
  tags: [auth, prod]
resources:
  join:
    replicas: 2
    requests:
      cpu: 250m
      memory: 256Mi
    limits:
      cpu: "1"
      memory: 1Gi
sink:
  type: clickhouse
  host: clickhouse
  port: 9000
  database: default
  table: user_logins_enriched
schema:
  fields:
    - {source_id: user_logins, name: session_id, type: string, column_name: session_id, column_type: UUID}
    - {source_id: user_logins, name: user_id, type: int64, column_name: user_id, column_type: Int64}
    - {source_id: user_logins, name: timestamp, type: int64, column_name: login_at, column_type: DateTime}
    - {source_id: users, name: user_id, type: int64}
    - {source_id: users, name: country, type: string, column_name: country, column_type: LowCardinality(String)}
    - {source_id: users, name: roles, type: array, column_name: roles, column_type: Array(String)}
"#
    }
}

/// Legacy (v1) configuration documents.
pub mod legacy {
    use super::*;

    /// Per-topic inline schemas plus a sink table mapping, without a
    /// `version` key.
    pub fn unversioned_join() -> Value {
        json!({
            "pipeline_id": "legacy-join",
            "source": {
                "type": "kafka",
                "connection_params": {"brokers": ["kafka:9092"], "mechanism": ""},
                "topics": [
                    {
                        "name": "clicks",
                        "deduplication": {"enabled": false, "id_field": "", "id_field_type": "", "time_window": ""},
                        "schema": {
                            "type": "json",
                            "fields": [
                                {"name": "click_id", "type": "string"},
                                {"name": "user_id", "type": "string"},
                                {"name": "url", "type": "string"}
                            ]
                        }
                    },
                    {
                        "name": "users",
                        "schema": {
                            "type": "json",
                            "fields": [
                                {"name": "user_id", "type": "string"},
                                {"name": "plan", "type": "string"}
                            ]
                        }
                    }
                ]
            },
            "join": {
                "enabled": true,
                "type": "temporal",
                "sources": [
                    {"source_id": "clicks", "join_key": "user_id", "time_window": "5m", "orientation": "left"},
                    {"source_id": "users", "join_key": "user_id", "time_window": "5m", "orientation": "right"}
                ]
            },
            "sink": {
                "type": "clickhouse",
                "host": "clickhouse",
                "port": 9000,
                "database": "default",
                "table": "clicks",
                "table_mapping": [
                    {"source_id": "clicks", "field_name": "click_id", "column_name": "click_id", "column_type": "UUID"},
                    {"source_id": "clicks", "field_name": "url", "column_name": "url", "column_type": "String"},
                    {"source_id": "users", "field_name": "plan", "column_name": "plan", "column_type": "LowCardinality(String)"}
                ]
            }
        })
    }
}

/// Parse a fixture that is known to be valid.
///
/// # Panics
///
/// Panics with the validation error when the fixture is not valid.
pub fn parse(document: Value) -> PipelineConfig {
    match PipelineConfig::from_value(document) {
        Ok(config) => config,
        Err(e) => panic!("fixture should be valid: {}", e),
    }
}
