//! Free-form pipeline metadata.

use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, Patchable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataConfig {
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MetadataConfig {
    pub fn validate(&self) -> PipelineConfigResult<()> {
        if let Some(index) = self.tags.iter().position(|tag| tag.trim().is_empty()) {
            return Err(PipelineConfigError::invalid(
                format!("tags[{}]", index),
                "tags cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Sparse update for [`MetadataConfig`]. `tags` replaces the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Patchable for MetadataConfig {
    type Patch = MetadataConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.tags, &patch.tags);

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
