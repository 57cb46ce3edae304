//! Row filter applied before records reach the sink.

use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::is_blank;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Row filter definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FilterConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Filter expression evaluated against each record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl FilterConfig {
    pub fn enabled(expression: impl Into<String>) -> Self {
        Self {
            enabled: true,
            expression: Some(expression.into()),
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        if self.enabled && is_blank(&self.expression) {
            return Err(PipelineConfigError::invalid(
                "expression",
                "expression is required when filter is enabled",
            ));
        }
        Ok(())
    }
}

/// Sparse update for [`FilterConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expression: Option<Option<String>>,
}

impl Patchable for FilterConfig {
    type Patch = FilterConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.enabled, &patch.enabled);
        apply_nullable(&mut updated.expression, &patch.expression);

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
