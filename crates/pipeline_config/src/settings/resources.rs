//! Compute resource requests and limits for the pipeline components.
//!
//! Quantities use the container-orchestrator notation: CPU as cores or
//! millicores (`"500m"`, `"1.5"`), memory with an optional binary or decimal
//! suffix (`"512Mi"`, `"2G"`).

use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply_nullable, double_option, merge_nullable, Patchable};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const CPU_QUANTITY_PATTERN: &str = r"^\d+(\.\d+)?m?$";
const MEMORY_QUANTITY_PATTERN: &str = r"^\d+(\.\d+)?(Ki|Mi|Gi|Ti|K|M|G|T)?$";

fn check_quantity(field: &str, value: &str, pattern: &str) -> PipelineConfigResult<()> {
    let regex = Regex::new(pattern).map_err(|e| {
        PipelineConfigError::invalid(field, format!("invalid quantity pattern: {}", e))
    })?;

    if !regex.is_match(value.trim()) {
        return Err(PipelineConfigError::invalid(
            field,
            format!("'{}' is not a valid {} quantity", value, field),
        ));
    }
    Ok(())
}

/// CPU and memory amounts for one side of a request/limit pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ResourceQuota {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceQuota {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: Some(cpu.into()),
            memory: Some(memory.into()),
        }
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        if let Some(cpu) = &self.cpu {
            check_quantity("cpu", cpu, CPU_QUANTITY_PATTERN)?;
        }
        if let Some(memory) = &self.memory {
            check_quantity("memory", memory, MEMORY_QUANTITY_PATTERN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceQuotaPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpu: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub memory: Option<Option<String>>,
}

impl Patchable for ResourceQuota {
    type Patch = ResourceQuotaPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply_nullable(&mut updated.cpu, &patch.cpu);
        apply_nullable(&mut updated.memory, &patch.memory);

        updated.validate()?;
        Ok(updated)
    }
}

/// Replica count plus requests and limits for one component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComponentResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuota>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuota>,
}

impl ComponentResources {
    pub fn validate(&self) -> PipelineConfigResult<()> {
        if self.replicas.is_some_and(|replicas| replicas < 1) {
            return Err(PipelineConfigError::invalid(
                "replicas",
                "Replicas must be at least 1",
            ));
        }
        if let Some(requests) = &self.requests {
            requests.validate().map_err(|e| e.within("requests"))?;
        }
        if let Some(limits) = &self.limits {
            limits.validate().map_err(|e| e.within("limits"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentResourcesPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub replicas: Option<Option<i64>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub requests: Option<Option<ResourceQuotaPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub limits: Option<Option<ResourceQuotaPatch>>,
}

impl Patchable for ComponentResources {
    type Patch = ComponentResourcesPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply_nullable(&mut updated.replicas, &patch.replicas);
        updated.requests =
            merge_nullable(&self.requests, &patch.requests).map_err(|e| e.within("requests"))?;
        updated.limits =
            merge_nullable(&self.limits, &patch.limits).map_err(|e| e.within("limits"))?;

        updated.validate()?;
        Ok(updated)
    }
}

/// Resources for each pipeline component. Absent components use the
/// orchestrator's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PipelineResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestor: Option<ComponentResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<ComponentResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<ComponentResources>,
}

impl PipelineResources {
    pub fn validate(&self) -> PipelineConfigResult<()> {
        for (component, resources) in [
            ("ingestor", &self.ingestor),
            ("join", &self.join),
            ("sink", &self.sink),
        ] {
            if let Some(resources) = resources {
                resources.validate().map_err(|e| e.within(component))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineResourcesPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingestor: Option<Option<ComponentResourcesPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub join: Option<Option<ComponentResourcesPatch>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sink: Option<Option<ComponentResourcesPatch>>,
}

impl Patchable for PipelineResources {
    type Patch = PipelineResourcesPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let updated = Self {
            ingestor: merge_nullable(&self.ingestor, &patch.ingestor)
                .map_err(|e| e.within("ingestor"))?,
            join: merge_nullable(&self.join, &patch.join).map_err(|e| e.within("join"))?,
            sink: merge_nullable(&self.sink, &patch.sink).map_err(|e| e.within("sink"))?,
        };

        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
