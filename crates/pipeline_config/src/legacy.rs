//! The v1 configuration shape and its migration to v2.
//!
//! In v1 every topic declares its own inline schema (field names and source
//! types) and the sink carries a `table_mapping` list binding fields to
//! columns. v2 hoists both into one top-level `schema`. The migration merges
//! the per-topic declarations keyed by `(topic, field)` and overlays the
//! table mapping entries with the same key.
//!
//! Migrating the v1 restatement of a v2 configuration yields the original
//! configuration, provided the schema lists fields grouped by topic in topic
//! order (the only order the v1 shape can express).

use crate::closed_enum::optional_tag;
use crate::data_types::SourceFieldType;
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::pipeline::{ConfigVersion, PipelineConfig, PipelineConfigBuilder};
use crate::schema::{Schema, SchemaField};
use crate::settings::{
    ConnectionParams, FilterConfig, JoinConfig, MetadataConfig, PipelineResources, SinkConfig,
    SourceConfig, SourceType, TableMapping, TopicConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

fn default_schema_type() -> String {
    "json".to_string()
}

/// A field declared inline on a v1 topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySchemaField {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: SourceFieldType,
}

/// Inline schema of a v1 topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTopicSchema {
    /// Message encoding; only "json" has ever been used
    #[serde(rename = "type", default = "default_schema_type")]
    pub schema_type: String,

    #[serde(default)]
    pub fields: Vec<LegacySchemaField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTopicConfig {
    #[serde(flatten)]
    pub topic: TopicConfig,

    pub schema: LegacyTopicSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySourceConfig {
    #[serde(rename = "type", default)]
    pub source_type: SourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    pub connection_params: ConnectionParams,

    pub topics: Vec<LegacyTopicConfig>,
}

/// A configuration document in the v1 shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPipelineConfig {
    #[serde(
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<ConfigVersion>,

    pub pipeline_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub source: LegacySourceConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<PipelineResources>,

    pub sink: SinkConfig,
}

impl LegacyPipelineConfig {
    /// Convert to the v2 shape and validate the result.
    ///
    /// # Errors
    ///
    /// A table mapping entry naming a field that its topic does not declare
    /// is a `MissingReference`. Everything else is reported exactly as for a
    /// v2 document.
    pub fn migrate(self) -> PipelineConfigResult<PipelineConfig> {
        let mut fields: Vec<SchemaField> = Vec::new();
        let mut seen = HashSet::new();
        for topic in &self.source.topics {
            for declared in &topic.schema.fields {
                if seen.insert((topic.topic.name.clone(), declared.name.clone())) {
                    fields.push(SchemaField::new(
                        topic.topic.name.as_str(),
                        declared.name.as_str(),
                        declared.field_type,
                    ));
                }
            }
        }

        let mut sink = self.sink;
        for (index, mapping) in sink.table_mapping.take().into_iter().flatten().enumerate() {
            let field = fields
                .iter_mut()
                .find(|f| f.source_id == mapping.source_id && f.name == mapping.field_name)
                .ok_or_else(|| {
                    PipelineConfigError::missing(
                        format!("sink.table_mapping[{}]", index),
                        format!(
                            "Table mapping field '{}' does not exist in topic '{}' schema",
                            mapping.field_name, mapping.source_id
                        ),
                    )
                })?;
            field.column_name = Some(mapping.column_name);
            field.column_type = Some(mapping.column_type);
        }

        let field_count = fields.len();
        let source = SourceConfig {
            source_type: self.source.source_type,
            provider: self.source.provider,
            connection_params: self.source.connection_params,
            topics: self
                .source
                .topics
                .into_iter()
                .map(|legacy| legacy.topic)
                .collect(),
        };

        let mut builder =
            PipelineConfigBuilder::new(self.pipeline_id, source, sink, Schema::new(fields));
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(join) = self.join {
            builder = builder.join(join);
        }
        if let Some(filter) = self.filter {
            builder = builder.filter(filter);
        }
        if let Some(metadata) = self.metadata {
            builder = builder.metadata(metadata);
        }
        if let Some(resources) = self.resources {
            builder = builder.resources(resources);
        }

        let config = builder.build()?;
        info!(
            "Migrated legacy pipeline configuration {} to v2 ({} schema fields)",
            config.pipeline_id(),
            field_count
        );
        Ok(config)
    }
}

impl PipelineConfig {
    /// Restate this configuration in the v1 shape.
    ///
    /// Schema fields move onto their topics and column bindings become the
    /// sink's table mapping.
    ///
    /// Any `table_mapping` already on the sink is replaced by the one built
    /// from the schema, and [`LegacyPipelineConfig::migrate`] folds the list
    /// back into the schema and clears it. Restating and migrating a
    /// configuration that carries a sink `table_mapping` therefore drops that
    /// list. Entries for unbound fields are lost; entries for bound fields
    /// survive as the schema bindings they already agree with.
    pub fn to_legacy(&self) -> LegacyPipelineConfig {
        let schema = self.schema();
        let source = self.source();

        let topics = source
            .topics
            .iter()
            .map(|topic| LegacyTopicConfig {
                topic: topic.clone(),
                schema: LegacyTopicSchema {
                    schema_type: default_schema_type(),
                    fields: schema
                        .fields_for_source(&topic.name)
                        .map(|field| LegacySchemaField {
                            name: field.name.clone(),
                            field_type: field.field_type,
                        })
                        .collect(),
                },
            })
            .collect();

        let table_mapping: Vec<TableMapping> = schema
            .mapped_fields()
            .filter_map(|field| {
                let column_name = field.column_name.clone()?;
                let column_type = field.column_type?;
                Some(TableMapping::new(
                    field.source_id.as_str(),
                    field.name.as_str(),
                    column_name,
                    column_type,
                ))
            })
            .collect();

        let mut sink = self.sink().clone();
        sink.table_mapping = Some(table_mapping);

        LegacyPipelineConfig {
            version: Some(ConfigVersion::V1),
            pipeline_id: self.pipeline_id().to_string(),
            name: Some(self.name().to_string()),
            source: LegacySourceConfig {
                source_type: source.source_type,
                provider: source.provider.clone(),
                connection_params: source.connection_params.clone(),
                topics,
            },
            join: self.join().cloned(),
            filter: self.filter().cloned(),
            metadata: self.metadata().cloned(),
            resources: self.resources().cloned(),
            sink,
        }
    }
}

/// Whether a raw document is in the v1 shape.
///
/// An explicit `version` decides. Without one, a document is v1 when it has
/// no top-level `schema` and at least one topic carries an inline `schema`.
pub(crate) fn is_legacy_document(value: &Value) -> PipelineConfigResult<bool> {
    match value.get("version") {
        Some(Value::String(version)) if !version.trim().is_empty() => {
            return Ok(version.parse::<ConfigVersion>()? == ConfigVersion::V1);
        }
        Some(Value::String(_)) | Some(Value::Null) | None => {}
        Some(other) => {
            return Err(PipelineConfigError::ParseError {
                reason: format!("version must be a string, got {}", other),
            })
        }
    }

    if value.get("schema").is_some() {
        return Ok(false);
    }

    let has_inline_schema = value
        .pointer("/source/topics")
        .and_then(Value::as_array)
        .is_some_and(|topics| topics.iter().any(|topic| topic.get("schema").is_some()));

    Ok(has_inline_schema)
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
