//! ClickHouse-compatible sink configuration.

use crate::data_types::SinkColumnType;
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

closed_enum! {
    /// Kind of sink system.
    pub enum SinkType("sink type") {
        Clickhouse => "clickhouse",
    }
}

impl Default for SinkType {
    fn default() -> Self {
        Self::Clickhouse
    }
}

/// Binding of one source field to one sink column.
///
/// Legacy (v1) configurations describe sink columns with a list of these on
/// the sink; current configurations carry the binding on the schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableMapping {
    /// Topic the field comes from
    pub source_id: String,

    pub field_name: String,

    pub column_name: String,

    pub column_type: SinkColumnType,
}

impl TableMapping {
    pub fn new(
        source_id: impl Into<String>,
        field_name: impl Into<String>,
        column_name: impl Into<String>,
        column_type: SinkColumnType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            field_name: field_name.into(),
            column_name: column_name.into(),
            column_type,
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        for (field, value) in [
            ("source_id", &self.source_id),
            ("field_name", &self.field_name),
            ("column_name", &self.column_name),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineConfigError::invalid(
                    field,
                    format!("{} cannot be empty", field),
                ));
            }
        }
        Ok(())
    }
}

/// Sparse update for [`TableMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableMappingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<SinkColumnType>,
}

impl Patchable for TableMapping {
    type Patch = TableMappingPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.source_id, &patch.source_id);
        apply(&mut updated.field_name, &patch.field_name);
        apply(&mut updated.column_name, &patch.column_name);
        apply(&mut updated.column_type, &patch.column_type);

        updated.validate()?;
        Ok(updated)
    }
}

fn default_max_batch_size() -> u32 {
    1000
}

fn default_max_delay_time() -> String {
    "10s".to_string()
}

/// Where the pipeline writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SinkConfig {
    #[serde(rename = "type", default)]
    pub sink_type: SinkType,

    /// Hosting provider label, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    pub host: String,

    /// Native protocol port
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,

    pub database: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Connect over TLS
    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub skip_certificate_verification: bool,

    /// Rows buffered before a flush
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,

    /// Longest a row may wait in the buffer, e.g. "10s"
    #[serde(default = "default_max_delay_time")]
    pub max_delay_time: String,

    pub table: String,

    /// Legacy column bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_mapping: Option<Vec<TableMapping>>,
}

impl SinkConfig {
    /// A plaintext sink with default batching and no credentials.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            sink_type: SinkType::Clickhouse,
            provider: None,
            host: host.into(),
            port,
            http_port: None,
            database: database.into(),
            username: String::new(),
            password: String::new(),
            secure: false,
            skip_certificate_verification: false,
            max_batch_size: default_max_batch_size(),
            max_delay_time: default_max_delay_time(),
            table: table.into(),
            table_mapping: None,
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        for (field, value) in [
            ("host", &self.host),
            ("database", &self.database),
            ("table", &self.table),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineConfigError::invalid(
                    field,
                    format!("{} cannot be empty", field),
                ));
            }
        }

        if self.max_batch_size == 0 {
            return Err(PipelineConfigError::invalid(
                "max_batch_size",
                "max_batch_size must be at least 1",
            ));
        }

        for (index, mapping) in self.table_mapping.iter().flatten().enumerate() {
            mapping
                .validate()
                .map_err(|e| e.within(&format!("table_mapping[{}]", index)))?;
        }

        Ok(())
    }
}

/// Sparse update for [`SinkConfig`]. `table_mapping` replaces the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SinkConfigPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub http_port: Option<Option<u16>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_certificate_verification: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub table_mapping: Option<Option<Vec<TableMapping>>>,
}

impl Patchable for SinkConfig {
    type Patch = SinkConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply_nullable(&mut updated.provider, &patch.provider);
        apply(&mut updated.host, &patch.host);
        apply(&mut updated.port, &patch.port);
        apply_nullable(&mut updated.http_port, &patch.http_port);
        apply(&mut updated.database, &patch.database);
        apply(&mut updated.username, &patch.username);
        apply(&mut updated.password, &patch.password);
        apply(&mut updated.secure, &patch.secure);
        apply(
            &mut updated.skip_certificate_verification,
            &patch.skip_certificate_verification,
        );
        apply(&mut updated.max_batch_size, &patch.max_batch_size);
        apply(&mut updated.max_delay_time, &patch.max_delay_time);
        apply(&mut updated.table, &patch.table);
        apply_nullable(&mut updated.table_mapping, &patch.table_mapping);

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
