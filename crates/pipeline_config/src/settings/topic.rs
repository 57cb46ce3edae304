//! Source topic configuration.

use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::deduplication::{DeduplicationConfig, DeduplicationConfigPatch};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

closed_enum! {
    /// Where a new consumer group starts reading a topic.
    pub enum ConsumerOffsetPolicy("consumer offset policy") {
        Earliest => "earliest",
        Latest => "latest",
    }
}

impl Default for ConsumerOffsetPolicy {
    fn default() -> Self {
        Self::Latest
    }
}

/// One source topic.
///
/// Whether the deduplication key exists in the pipeline schema with the
/// declared type can only be checked once the topic is part of a pipeline;
/// `validate` covers the rules local to the topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TopicConfig {
    /// Topic name; doubles as the source id referenced by schema and join
    pub name: String,

    #[serde(default)]
    pub consumer_group_initial_offset: ConsumerOffsetPolicy,

    /// Number of ingestor replicas reading this topic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,

    #[serde(default)]
    pub deduplication: DeduplicationConfig,
}

impl TopicConfig {
    /// A topic without deduplication, read from the latest offset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consumer_group_initial_offset: ConsumerOffsetPolicy::default(),
            replicas: None,
            deduplication: DeduplicationConfig::disabled(),
        }
    }

    pub fn with_deduplication(mut self, deduplication: DeduplicationConfig) -> Self {
        self.deduplication = deduplication;
        self
    }

    pub fn normalized(mut self) -> Self {
        self.deduplication = self.deduplication.normalized();
        self
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(PipelineConfigError::invalid(
                "name",
                "Topic name cannot be empty",
            ));
        }

        if self.replicas.is_some_and(|replicas| replicas < 1) {
            return Err(PipelineConfigError::invalid(
                "replicas",
                "Replicas must be at least 1",
            ));
        }

        self.deduplication
            .validate()
            .map_err(|e| e.within("deduplication"))
    }
}

/// Sparse update for [`TopicConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_group_initial_offset: Option<ConsumerOffsetPolicy>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub replicas: Option<Option<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduplication: Option<DeduplicationConfigPatch>,
}

impl Patchable for TopicConfig {
    type Patch = TopicConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.name, &patch.name);
        apply(
            &mut updated.consumer_group_initial_offset,
            &patch.consumer_group_initial_offset,
        );
        apply_nullable(&mut updated.replicas, &patch.replicas);
        if let Some(dedup_patch) = &patch.deduplication {
            updated.deduplication = self
                .deduplication
                .update(dedup_patch)
                .map_err(|e| e.within("deduplication"))?;
        }

        let updated = updated.normalized();
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
