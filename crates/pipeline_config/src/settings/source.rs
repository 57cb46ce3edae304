//! Aggregate source configuration.

use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::connection::{ConnectionParams, ConnectionParamsPatch};
use crate::settings::topic::TopicConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

closed_enum! {
    /// Kind of source system.
    pub enum SourceType("source type") {
        Kafka => "kafka",
    }
}

impl Default for SourceType {
    fn default() -> Self {
        Self::Kafka
    }
}

/// Where the pipeline reads from: one broker connection and its topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceConfig {
    #[serde(rename = "type", default)]
    pub source_type: SourceType,

    /// Hosting provider label, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    pub connection_params: ConnectionParams,

    pub topics: Vec<TopicConfig>,
}

impl SourceConfig {
    pub fn new(connection_params: ConnectionParams, topics: Vec<TopicConfig>) -> Self {
        Self {
            source_type: SourceType::Kafka,
            provider: None,
            connection_params,
            topics,
        }
    }

    /// Look up a topic by name.
    pub fn topic(&self, name: &str) -> Option<&TopicConfig> {
        self.topics.iter().find(|topic| topic.name == name)
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.topic(name).is_some()
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|topic| topic.name.as_str())
    }

    pub fn normalized(mut self) -> Self {
        self.topics = self.topics.into_iter().map(TopicConfig::normalized).collect();
        self
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        self.connection_params
            .validate()
            .map_err(|e| e.within("connection_params"))?;

        if self.topics.is_empty() {
            return Err(PipelineConfigError::invalid(
                "topics",
                "at least one topic is required",
            ));
        }

        let mut seen = HashSet::new();
        for (index, topic) in self.topics.iter().enumerate() {
            topic
                .validate()
                .map_err(|e| e.within(&format!("topics[{}]", index)))?;

            if !seen.insert(topic.name.as_str()) {
                return Err(PipelineConfigError::invalid(
                    format!("topics[{}].name", index),
                    format!("Topic '{}' is declared more than once", topic.name),
                ));
            }
        }

        Ok(())
    }
}

/// Sparse update for [`SourceConfig`].
///
/// `connection_params` merges field by field. `topics` replaces the whole
/// topic list; there is no per-topic merge by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceConfigPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_params: Option<ConnectionParamsPatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<TopicConfig>>,
}

impl Patchable for SourceConfig {
    type Patch = SourceConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply_nullable(&mut updated.provider, &patch.provider);
        if let Some(params_patch) = &patch.connection_params {
            updated.connection_params = self
                .connection_params
                .update(params_patch)
                .map_err(|e| e.within("connection_params"))?;
        }
        apply(&mut updated.topics, &patch.topics);

        let updated = updated.normalized();
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
