//! Per-topic deduplication settings.

use crate::closed_enum::{optional_tag, patch_tag};
use crate::data_types::SourceFieldType;
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::{blank_to_none, is_blank};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Source types that may carry a deduplication key.
pub const DEDUPLICATION_KEY_TYPES: &[SourceFieldType] = &[
    SourceFieldType::String,
    SourceFieldType::Int32,
    SourceFieldType::Int64,
];

/// Deduplication rule for a single topic.
///
/// Events sharing the same `id_field` value within `time_window` are dropped.
/// When the rule is disabled the other fields are irrelevant, and blank
/// strings are normalized to absent instead of being rejected.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::{DeduplicationConfig, SourceFieldType};
///
/// let dedup = DeduplicationConfig::enabled("event_id", SourceFieldType::String, "1h").unwrap();
/// assert!(dedup.enabled);
///
/// assert!(DeduplicationConfig::enabled("", SourceFieldType::String, "1h").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct DeduplicationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Name of the field carrying the deduplication key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,

    /// Declared source type of the key field
    #[serde(
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<SourceFieldType>")]
    pub id_field_type: Option<SourceFieldType>,

    /// Window within which duplicates are dropped, e.g. "1h"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

/// Wire form, normalized on the way in.
#[derive(Deserialize)]
struct RawDeduplicationConfig {
    #[serde(default)]
    enabled: bool,

    #[serde(default)]
    id_field: Option<String>,

    #[serde(default, deserialize_with = "optional_tag")]
    id_field_type: Option<SourceFieldType>,

    #[serde(default)]
    time_window: Option<String>,
}

impl From<RawDeduplicationConfig> for DeduplicationConfig {
    fn from(raw: RawDeduplicationConfig) -> Self {
        Self {
            enabled: raw.enabled,
            id_field: raw.id_field,
            id_field_type: raw.id_field_type,
            time_window: raw.time_window,
        }
        .normalized()
    }
}

impl<'de> Deserialize<'de> for DeduplicationConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawDeduplicationConfig::deserialize(deserializer).map(Self::from)
    }
}

impl DeduplicationConfig {
    /// A disabled rule.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// An enabled rule, validated.
    pub fn enabled(
        id_field: impl Into<String>,
        id_field_type: SourceFieldType,
        time_window: impl Into<String>,
    ) -> PipelineConfigResult<Self> {
        let config = Self {
            enabled: true,
            id_field: Some(id_field.into()),
            id_field_type: Some(id_field_type),
            time_window: Some(time_window.into()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Coerce blank strings to absent when the rule is disabled.
    pub fn normalized(mut self) -> Self {
        if !self.enabled {
            self.id_field = blank_to_none(self.id_field);
            self.time_window = blank_to_none(self.time_window);
        }
        self
    }

    /// Check that an enabled rule is complete.
    pub fn validate(&self) -> PipelineConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if is_blank(&self.id_field) {
            return Err(PipelineConfigError::invalid(
                "id_field",
                "id_field is required when deduplication is enabled",
            ));
        }

        let id_field_type = self.id_field_type.ok_or_else(|| {
            PipelineConfigError::invalid(
                "id_field_type",
                "id_field_type is required when deduplication is enabled",
            )
        })?;

        if is_blank(&self.time_window) {
            return Err(PipelineConfigError::invalid(
                "time_window",
                "time_window is required when deduplication is enabled",
            ));
        }

        if !DEDUPLICATION_KEY_TYPES.contains(&id_field_type) {
            return Err(PipelineConfigError::invalid(
                "id_field_type",
                format!(
                    "id_field_type must be one of: string, int32, int64 (got '{}')",
                    id_field_type
                ),
            ));
        }

        Ok(())
    }
}

/// Sparse update for [`DeduplicationConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeduplicationConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub id_field: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub id_field_type: Option<Option<SourceFieldType>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_window: Option<Option<String>>,
}

impl Patchable for DeduplicationConfig {
    type Patch = DeduplicationConfigPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.enabled, &patch.enabled);
        apply_nullable(&mut updated.id_field, &patch.id_field);
        apply_nullable(&mut updated.id_field_type, &patch.id_field_type);
        apply_nullable(&mut updated.time_window, &patch.time_window);

        let updated = updated.normalized();
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "deduplication_tests.rs"]
mod tests;
