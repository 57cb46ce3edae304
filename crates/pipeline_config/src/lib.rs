//! Pipeline configuration model
//!
//! Typed configuration for a streaming pipeline that reads Kafka topics,
//! optionally deduplicates, joins and filters them, and writes rows to a
//! ClickHouse table. The crate covers three things:
//!
//! - parsing a configuration document (JSON, YAML or a `serde_json::Value`)
//!   into a fully validated [`PipelineConfig`];
//! - applying sparse patches with [`Patchable::update`], which always returns
//!   a new, re-validated configuration;
//! - migrating the legacy v1 document shape to the current one.
//!
//! Nothing here performs I/O.

#[macro_use]
mod closed_enum;

pub mod data_types;
pub mod errors;
pub mod legacy;
pub mod patch;
pub mod pipeline;
pub mod pipeline_id;
pub mod schema;
pub mod settings;
pub mod status;

// Re-export for convenient access
pub use data_types::{ensure_compatible, is_compatible, SinkColumnType, SourceFieldType};
pub use errors::{PipelineConfigError, PipelineConfigResult, PipelineIdError};
pub use legacy::{
    LegacyPipelineConfig, LegacySchemaField, LegacySourceConfig, LegacyTopicConfig,
    LegacyTopicSchema,
};
pub use patch::Patchable;
pub use pipeline::{
    pipeline_config_json_schema, validate_config, ConfigVersion, PipelineConfig,
    PipelineConfigBuilder, PipelineConfigPatch,
};
pub use pipeline_id::{PipelineId, MAX_PIPELINE_ID_LENGTH};
pub use schema::{Schema, SchemaField, SchemaFieldPatch, SchemaPatch};
pub use settings::{
    ComponentResources, ComponentResourcesPatch, ConnectionParams, ConnectionParamsPatch,
    ConsumerOffsetPolicy, DeduplicationConfig, DeduplicationConfigPatch, FilterConfig,
    FilterConfigPatch, JoinConfig, JoinConfigPatch, JoinOrientation, JoinSourceConfig,
    JoinSourceConfigPatch, JoinType, KafkaMechanism, KafkaProtocol, MetadataConfig,
    MetadataConfigPatch, PipelineResources, PipelineResourcesPatch, ResourceQuota,
    ResourceQuotaPatch, SinkConfig, SinkConfigPatch, SinkType, SourceConfig, SourceConfigPatch,
    SourceType, TableMapping, TableMappingPatch, TopicConfig, TopicConfigPatch,
    DEDUPLICATION_KEY_TYPES,
};
pub use status::PipelineStatus;
