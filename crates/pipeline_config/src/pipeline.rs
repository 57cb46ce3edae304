//! The pipeline configuration root.
//!
//! A [`PipelineConfig`] is only ever produced by [`PipelineConfigBuilder::build`]
//! or by [`Patchable::update`], and both run the same validation: every
//! sub-entity checks itself, then the root checks the references between
//! them. A value of this type is therefore always a complete, consistent
//! configuration.

use crate::closed_enum::optional_tag;
use crate::data_types::ensure_compatible;
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::legacy::{is_legacy_document, LegacyPipelineConfig};
use crate::patch::{double_option, merge_nullable, Patchable};
use crate::pipeline_id::PipelineId;
use crate::schema::{Schema, SchemaPatch};
use crate::settings::{
    blank_to_none, FilterConfig, FilterConfigPatch, JoinConfig, JoinConfigPatch, MetadataConfig,
    MetadataConfigPatch, PipelineResources, PipelineResourcesPatch, SinkConfig, SinkConfigPatch,
    SourceConfig, SourceConfigPatch,
};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

closed_enum! {
    /// Shape version of a configuration document.
    pub enum ConfigVersion("config version") {
        /// Per-topic inline schemas plus a sink table mapping
        V1 => "v1",
        /// A single top-level schema
        V2 => "v2",
    }
}

impl Default for ConfigVersion {
    fn default() -> Self {
        Self::V2
    }
}

/// A validated pipeline configuration.
///
/// Construct one with [`PipelineConfigBuilder`] or by parsing a document with
/// [`PipelineConfig::from_value`], [`PipelineConfig::from_json_str`] or
/// [`PipelineConfig::from_yaml_str`]. Change one with
/// [`Patchable::update`], which returns a new configuration and leaves the
/// original untouched.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::{PipelineConfig, Patchable, PipelineConfigPatch, SinkConfigPatch};
/// use serde_json::json;
///
/// let config = PipelineConfig::from_value(json!({
///     "pipeline_id": "orders-pipeline",
///     "source": {
///         "type": "kafka",
///         "connection_params": {"brokers": ["kafka:9092"]},
///         "topics": [{"name": "orders"}]
///     },
///     "sink": {
///         "type": "clickhouse",
///         "host": "clickhouse",
///         "port": 9000,
///         "database": "default",
///         "table": "orders"
///     },
///     "schema": {
///         "fields": [
///             {"source_id": "orders", "name": "order_id", "type": "string",
///              "column_name": "order_id", "column_type": "String"}
///         ]
///     }
/// }))
/// .unwrap();
/// assert_eq!(config.name(), "Orders Pipeline");
///
/// let patch = PipelineConfigPatch {
///     sink: Some(SinkConfigPatch {
///         host: Some("clickhouse-2".to_string()),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// let updated = config.update(&patch).unwrap();
/// assert_eq!(updated.sink().host, "clickhouse-2");
/// assert_eq!(config.sink().host, "clickhouse");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    version: ConfigVersion,

    pipeline_id: PipelineId,

    name: String,

    source: SourceConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    join: Option<JoinConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<PipelineResources>,

    sink: SinkConfig,

    #[serde(rename = "schema")]
    pipeline_schema: Schema,
}

impl PipelineConfig {
    /// Build a configuration from a raw document.
    ///
    /// Legacy (v1) documents are recognized by `version: v1` or, without a
    /// version, by per-topic `schema` blocks and no top-level `schema`. They
    /// are migrated before validation.
    pub fn from_value(value: Value) -> PipelineConfigResult<Self> {
        if is_legacy_document(&value)? {
            let legacy: LegacyPipelineConfig = serde_json::from_value(value)?;
            return legacy.migrate();
        }

        let builder: PipelineConfigBuilder = serde_json::from_value(value)?;
        builder.build()
    }

    pub fn from_json_str(document: &str) -> PipelineConfigResult<Self> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(document: &str) -> PipelineConfigResult<Self> {
        let value: Value = serde_yaml::from_str(document)?;
        Self::from_value(value)
    }

    /// Wire form of the configuration. Absent optional fields are omitted.
    pub fn to_value(&self) -> PipelineConfigResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> PipelineConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> PipelineConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    pub fn pipeline_id(&self) -> &PipelineId {
        &self.pipeline_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub fn join(&self) -> Option<&JoinConfig> {
        self.join.as_ref()
    }

    pub fn filter(&self) -> Option<&FilterConfig> {
        self.filter.as_ref()
    }

    pub fn metadata(&self) -> Option<&MetadataConfig> {
        self.metadata.as_ref()
    }

    pub fn resources(&self) -> Option<&PipelineResources> {
        self.resources.as_ref()
    }

    pub fn sink(&self) -> &SinkConfig {
        &self.sink
    }

    pub fn schema(&self) -> &Schema {
        &self.pipeline_schema
    }

    /// Whether an enabled join is configured.
    pub fn is_join_enabled(&self) -> bool {
        self.join.as_ref().is_some_and(|join| join.enabled)
    }

    /// Check the rules that span several sub-entities.
    ///
    /// Runs, in order: schema sources exist as topics, deduplication keys
    /// exist in their topic's schema with the declared type, join sources
    /// and keys exist, and legacy sink table mappings agree with the schema.
    fn validate_references(&self) -> PipelineConfigResult<()> {
        let schema = &self.pipeline_schema;

        // Step 3: every schema field belongs to a known topic
        for (index, field) in schema.fields.iter().enumerate() {
            if !self.source.has_topic(&field.source_id) {
                return Err(PipelineConfigError::missing(
                    format!("schema.fields[{}].source_id", index),
                    format!("Source '{}' does not exist in any topic", field.source_id),
                ));
            }
        }

        // Step 4: deduplication keys exist in the topic's schema with the declared type
        for (index, topic) in self.source.topics.iter().enumerate() {
            let dedup = &topic.deduplication;
            if !dedup.enabled {
                continue;
            }
            let (Some(id_field), Some(id_field_type)) = (&dedup.id_field, dedup.id_field_type)
            else {
                continue;
            };

            let location = format!("source.topics[{}].deduplication.id_field", index);
            let field = schema
                .field(id_field, Some(topic.name.as_str()))
                .ok_or_else(|| {
                    PipelineConfigError::missing(
                        location.as_str(),
                        format!(
                            "Deduplication id_field '{}' does not exist in the schema of topic '{}'",
                            id_field, topic.name
                        ),
                    )
                })?;

            if field.field_type != id_field_type {
                return Err(PipelineConfigError::invalid(
                    location,
                    format!(
                        "Deduplication id_field '{}' of topic '{}' is declared as '{}' in the schema but id_field_type is '{}'",
                        id_field, topic.name, field.field_type, id_field_type
                    ),
                ));
            }
        }

        // Step 5: join sources and keys exist
        if let Some(join) = self.join.as_ref().filter(|join| join.enabled) {
            for (index, join_source) in join.sources.iter().flatten().enumerate() {
                if !self.source.has_topic(&join_source.source_id) {
                    return Err(PipelineConfigError::missing(
                        format!("join.sources[{}].source_id", index),
                        format!(
                            "Join source '{}' does not exist in any topic",
                            join_source.source_id
                        ),
                    ));
                }

                let source_id = join_source.source_id.as_str();
                if !schema.is_field_in_schema(&join_source.join_key, Some(source_id)) {
                    return Err(PipelineConfigError::missing(
                        format!("join.sources[{}].join_key", index),
                        format!(
                            "Join key '{}' does not exist in source '{}' schema",
                            join_source.join_key, join_source.source_id
                        ),
                    ));
                }
            }
        }

        // Step 6: legacy table mappings agree with the schema
        for (index, mapping) in self.sink.table_mapping.iter().flatten().enumerate() {
            let location = format!("sink.table_mapping[{}]", index);
            let field = schema
                .field(&mapping.field_name, Some(mapping.source_id.as_str()))
                .ok_or_else(|| {
                    PipelineConfigError::missing(
                        location.as_str(),
                        format!(
                            "Table mapping field '{}' does not exist in source '{}' schema",
                            mapping.field_name, mapping.source_id
                        ),
                    )
                })?;

            match (&field.column_name, field.column_type) {
                (Some(column_name), Some(column_type)) => {
                    if *column_name != mapping.column_name || column_type != mapping.column_type {
                        return Err(PipelineConfigError::invalid(
                            location,
                            format!(
                                "Table mapping for field '{}' in source '{}' disagrees with the schema column binding",
                                mapping.field_name, mapping.source_id
                            ),
                        ));
                    }
                }
                _ => ensure_compatible(
                    &mapping.field_name,
                    &mapping.source_id,
                    field.field_type,
                    mapping.column_type,
                )?,
            }
        }

        Ok(())
    }
}

impl<'de> Deserialize<'de> for PipelineConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Validate a raw document without keeping the result.
///
/// Returns `Ok(true)` for a valid document and the first validation error
/// otherwise.
pub fn validate_config(value: &Value) -> PipelineConfigResult<bool> {
    PipelineConfig::from_value(value.clone()).map(|_| true)
}

/// JSON Schema describing a configuration document, for editor support.
pub fn pipeline_config_json_schema() -> schemars::Schema {
    schemars::schema_for!(PipelineConfigBuilder)
}

/// Unvalidated configuration, as written in a document or assembled in code.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::{
///     ConnectionParams, PipelineConfigBuilder, Schema, SchemaField, SinkColumnType, SinkConfig,
///     SourceConfig, SourceFieldType, TopicConfig,
/// };
///
/// let config = PipelineConfigBuilder::new(
///     "clicks",
///     SourceConfig::new(
///         ConnectionParams::new(vec!["kafka:9092".to_string()]),
///         vec![TopicConfig::new("clicks")],
///     ),
///     SinkConfig::new("clickhouse", 9000, "default", "clicks"),
///     Schema::new(vec![SchemaField::new("clicks", "url", SourceFieldType::String)
///         .with_column("url", SinkColumnType::String)]),
/// )
/// .name("Click stream")
/// .build()
/// .unwrap();
///
/// assert_eq!(config.name(), "Click stream");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfigBuilder {
    /// Document shape version; "v2" when absent
    #[serde(
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<ConfigVersion>")]
    version: Option<ConfigVersion>,

    /// Lowercase letters, digits and hyphens; at most 40 characters
    pipeline_id: String,

    /// Display name; derived from the pipeline id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    source: SourceConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    join: Option<JoinConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<FilterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    resources: Option<PipelineResources>,

    sink: SinkConfig,

    #[serde(rename = "schema")]
    pipeline_schema: Schema,
}

impl PipelineConfigBuilder {
    pub fn new(
        pipeline_id: impl Into<String>,
        source: SourceConfig,
        sink: SinkConfig,
        schema: Schema,
    ) -> Self {
        Self {
            version: None,
            pipeline_id: pipeline_id.into(),
            name: None,
            source,
            join: None,
            filter: None,
            metadata: None,
            resources: None,
            sink,
            pipeline_schema: schema,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn join(mut self, join: JoinConfig) -> Self {
        self.join = Some(join);
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn metadata(mut self, metadata: MetadataConfig) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn resources(mut self, resources: PipelineResources) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Validate everything and produce the configuration.
    ///
    /// Sub-entities are checked first. Then, in order: the pipeline id, the
    /// default name, and the cross-entity references. The first failure is
    /// returned.
    pub fn build(self) -> PipelineConfigResult<PipelineConfig> {
        if self.version == Some(ConfigVersion::V1) {
            return Err(PipelineConfigError::invalid(
                "version",
                "v1 documents must be migrated before they can be built",
            ));
        }

        let source = self.source.normalized();
        source.validate().map_err(|e| e.within("source"))?;

        if let Some(join) = &self.join {
            join.validate().map_err(|e| e.within("join"))?;
        }
        if let Some(filter) = &self.filter {
            filter.validate().map_err(|e| e.within("filter"))?;
        }
        if let Some(metadata) = &self.metadata {
            metadata.validate().map_err(|e| e.within("metadata"))?;
        }
        if let Some(resources) = &self.resources {
            resources.validate().map_err(|e| e.within("resources"))?;
        }

        self.sink.validate().map_err(|e| e.within("sink"))?;

        let pipeline_schema = self.pipeline_schema.normalized();
        pipeline_schema.validate().map_err(|e| e.within("schema"))?;

        // Step 1: pipeline id
        let pipeline_id = PipelineId::try_new(self.pipeline_id)?;

        // Step 2: default name
        let name = blank_to_none(self.name).unwrap_or_else(|| pipeline_id.default_name());

        let config = PipelineConfig {
            version: ConfigVersion::V2,
            pipeline_id,
            name,
            source,
            join: self.join,
            filter: self.filter,
            metadata: self.metadata,
            resources: self.resources,
            sink: self.sink,
            pipeline_schema,
        };

        // Steps 3 to 6
        config.validate_references()?;

        debug!(
            "Pipeline configuration validated: {} ({} topics, {} schema fields)",
            config.pipeline_id,
            config.source.topics.len(),
            config.pipeline_schema.fields.len()
        );

        Ok(config)
    }
}

/// Sparse update for [`PipelineConfig`].
///
/// Every field is optional; an absent field leaves the configuration as it
/// is. `join`, `filter`, `metadata` and `resources` can also be cleared with
/// an explicit `null`, and patching one that is absent starts from its
/// default. Clearing `name` re-derives it from the pipeline id. The pipeline
/// id itself cannot be patched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineConfigPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfigPatch>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub join: Option<Option<JoinConfigPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<Option<FilterConfigPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<Option<MetadataConfigPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub resources: Option<Option<PipelineResourcesPatch>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<SinkConfigPatch>,

    #[serde(rename = "schema", default, skip_serializing_if = "Option::is_none")]
    pub pipeline_schema: Option<SchemaPatch>,
}

impl PipelineConfigPatch {
    /// Parse a sparse patch document.
    pub fn from_value(value: Value) -> PipelineConfigResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Top-level keys this patch mentions, in document order.
    pub fn touched_sections(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("source", self.source.is_some()),
            ("join", self.join.is_some()),
            ("filter", self.filter.is_some()),
            ("metadata", self.metadata.is_some()),
            ("resources", self.resources.is_some()),
            ("sink", self.sink.is_some()),
            ("schema", self.pipeline_schema.is_some()),
        ]
        .into_iter()
        .filter_map(|(section, touched)| touched.then_some(section))
        .collect()
    }
}

impl Patchable for PipelineConfig {
    type Patch = PipelineConfigPatch;

    /// Merge `patch` into a copy of this configuration.
    ///
    /// Each section delegates to its own `update`. Afterwards the
    /// cross-entity references are checked again, so a patch that renames a
    /// topic still used by the schema or the join is rejected.
    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        if patch.is_empty() {
            debug!("Empty patch for pipeline {}, nothing to update", self.pipeline_id);
            return Ok(self.clone());
        }

        let mut updated = self.clone();

        if let Some(name) = &patch.name {
            updated.name = blank_to_none(name.clone())
                .unwrap_or_else(|| updated.pipeline_id.default_name());
        }

        if let Some(source_patch) = &patch.source {
            updated.source = self
                .source
                .update(source_patch)
                .map_err(|e| e.within("source"))?;
        }

        updated.join = merge_nullable(&self.join, &patch.join).map_err(|e| e.within("join"))?;
        updated.filter =
            merge_nullable(&self.filter, &patch.filter).map_err(|e| e.within("filter"))?;
        updated.metadata =
            merge_nullable(&self.metadata, &patch.metadata).map_err(|e| e.within("metadata"))?;
        updated.resources = merge_nullable(&self.resources, &patch.resources)
            .map_err(|e| e.within("resources"))?;

        if let Some(sink_patch) = &patch.sink {
            updated.sink = self
                .sink
                .update(sink_patch)
                .map_err(|e| e.within("sink"))?;
        }

        if let Some(schema_patch) = &patch.pipeline_schema {
            updated.pipeline_schema = self
                .pipeline_schema
                .update(schema_patch)
                .map_err(|e| e.within("schema"))?;
        }

        updated.validate_references()?;

        debug!(
            "Pipeline configuration updated: {} (sections: {:?})",
            updated.pipeline_id,
            patch.touched_sections()
        );

        Ok(updated)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
