//! Temporal join between two source topics.

use crate::closed_enum::{optional_tag, patch_tag};
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

closed_enum! {
    /// Join strategy.
    pub enum JoinType("join type") {
        Temporal => "temporal",
    }
}

closed_enum! {
    /// Side of the join a source sits on.
    pub enum JoinOrientation("join orientation") {
        Left => "left",
        Right => "right",
    }
}

/// One side of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JoinSourceConfig {
    /// Name of the topic feeding this side
    pub source_id: String,

    /// Field both sides are matched on
    pub join_key: String,

    /// How long a record waits for its counterpart, e.g. "30s"
    pub time_window: String,

    pub orientation: JoinOrientation,
}

impl JoinSourceConfig {
    pub fn new(
        source_id: impl Into<String>,
        join_key: impl Into<String>,
        time_window: impl Into<String>,
        orientation: JoinOrientation,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            join_key: join_key.into(),
            time_window: time_window.into(),
            orientation,
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        for (field, value) in [
            ("source_id", &self.source_id),
            ("join_key", &self.join_key),
            ("time_window", &self.time_window),
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

/// Sparse update for [`JoinSourceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinSourceConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<JoinOrientation>,
}

impl Patchable for JoinSourceConfig {
    type Patch = JoinSourceConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.source_id, &patch.source_id);
        apply(&mut updated.join_key, &patch.join_key);
        apply(&mut updated.time_window, &patch.time_window);
        apply(&mut updated.orientation, &patch.orientation);

        updated.validate()?;
        Ok(updated)
    }
}

/// Join definition.
///
/// A disabled join may omit `type` and `sources`. An enabled join needs
/// exactly two sources, one `left` and one `right`, and a `type`.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::{JoinConfig, JoinOrientation, JoinSourceConfig, JoinType};
///
/// let join = JoinConfig::enabled(
///     JoinType::Temporal,
///     vec![
///         JoinSourceConfig::new("orders", "user_id", "1h", JoinOrientation::Left),
///         JoinSourceConfig::new("users", "user_id", "1h", JoinOrientation::Right),
///     ],
/// )
/// .unwrap();
/// assert_eq!(join.left().unwrap().source_id, "orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct JoinConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<JoinType>")]
    pub join_type: Option<JoinType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<JoinSourceConfig>>,
}

impl JoinConfig {
    /// An enabled join, validated.
    pub fn enabled(
        join_type: JoinType,
        sources: Vec<JoinSourceConfig>,
    ) -> PipelineConfigResult<Self> {
        let config = Self {
            enabled: true,
            join_type: Some(join_type),
            sources: Some(sources),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn left(&self) -> Option<&JoinSourceConfig> {
        self.source_with(JoinOrientation::Left)
    }

    pub fn right(&self) -> Option<&JoinSourceConfig> {
        self.source_with(JoinOrientation::Right)
    }

    fn source_with(&self, orientation: JoinOrientation) -> Option<&JoinSourceConfig> {
        self.sources
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|source| source.orientation == orientation)
    }

    /// Sources are checked before `type`.
    pub fn validate(&self) -> PipelineConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let sources = match self.sources.as_deref() {
            Some(sources) if !sources.is_empty() => sources,
            _ => {
                return Err(PipelineConfigError::invalid(
                    "sources",
                    "sources are required when join is enabled",
                ))
            }
        };

        if sources.len() != 2 {
            return Err(PipelineConfigError::invalid(
                "sources",
                format!(
                    "join must have exactly two sources (got {})",
                    sources.len()
                ),
            ));
        }

        for (index, source) in sources.iter().enumerate() {
            source
                .validate()
                .map_err(|e| e.within(&format!("sources[{}]", index)))?;
        }

        if sources[0].orientation == sources[1].orientation {
            return Err(PipelineConfigError::invalid(
                "sources",
                "join sources must have opposite orientations",
            ));
        }

        if self.join_type.is_none() {
            return Err(PipelineConfigError::invalid(
                "type",
                "type is required when join is enabled",
            ));
        }

        Ok(())
    }
}

/// Sparse update for [`JoinConfig`].
///
/// `sources` replaces the source list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "patch_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub join_type: Option<Option<JoinType>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sources: Option<Option<Vec<JoinSourceConfig>>>,
}

impl Patchable for JoinConfig {
    type Patch = JoinConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.enabled, &patch.enabled);
        apply_nullable(&mut updated.join_type, &patch.join_type);
        apply_nullable(&mut updated.sources, &patch.sources);

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "join_tests.rs"]
mod tests;
