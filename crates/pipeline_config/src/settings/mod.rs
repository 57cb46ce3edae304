//! Configuration entities below the pipeline root.
//!
//! Each entity validates its own invariants and produces updated copies of
//! itself through [`Patchable`](crate::patch::Patchable). Rules that span
//! several entities live on [`PipelineConfig`](crate::PipelineConfig).

pub mod connection;
pub mod deduplication;
pub mod filter;
pub mod join;
pub mod metadata;
pub mod resources;
pub mod sink;
pub mod source;
pub mod topic;

// Re-export all types for convenient access
pub use connection::{ConnectionParams, ConnectionParamsPatch, KafkaMechanism, KafkaProtocol};
pub use deduplication::{DeduplicationConfig, DeduplicationConfigPatch, DEDUPLICATION_KEY_TYPES};
pub use filter::{FilterConfig, FilterConfigPatch};
pub use join::{
    JoinConfig, JoinConfigPatch, JoinOrientation, JoinSourceConfig, JoinSourceConfigPatch,
    JoinType,
};
pub use metadata::{MetadataConfig, MetadataConfigPatch};
pub use resources::{
    ComponentResources, ComponentResourcesPatch, PipelineResources, PipelineResourcesPatch,
    ResourceQuota, ResourceQuotaPatch,
};
pub use sink::{SinkConfig, SinkConfigPatch, SinkType, TableMapping, TableMappingPatch};
pub use source::{SourceConfig, SourceConfigPatch, SourceType};
pub use topic::{ConsumerOffsetPolicy, TopicConfig, TopicConfigPatch};

/// True when the value is absent or only whitespace.
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
