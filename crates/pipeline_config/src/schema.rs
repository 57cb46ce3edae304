//! Pipeline-wide field registry.
//!
//! The schema is a flat list of field descriptors keyed by
//! `(source_id, name)`. Every other cross-entity rule (deduplication keys,
//! join keys, sink bindings) asks the schema whether a field exists.

use crate::closed_enum::{optional_tag, patch_tag};
use crate::data_types::{ensure_compatible, SinkColumnType, SourceFieldType};
use crate::errors::{PipelineConfigError, PipelineConfigResult};
use crate::patch::{apply, apply_nullable, double_option, Patchable};
use crate::settings::blank_to_none;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One source field, optionally bound to a sink column.
///
/// `column_name` and `column_type` are set together or not at all. When set,
/// `column_type` must be able to hold values of the declared source `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaField {
    /// Topic the field belongs to
    pub source_id: String,

    /// Field name within the source record
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: SourceFieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<SinkColumnType>")]
    pub column_type: Option<SinkColumnType>,
}

impl SchemaField {
    /// A field that is read from the source but not written to the sink.
    pub fn new(
        source_id: impl Into<String>,
        name: impl Into<String>,
        field_type: SourceFieldType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
            field_type,
            column_name: None,
            column_type: None,
        }
    }

    /// Bind the field to a sink column.
    pub fn with_column(mut self, column_name: impl Into<String>, column_type: SinkColumnType) -> Self {
        self.column_name = Some(column_name.into());
        self.column_type = Some(column_type);
        self
    }

    /// Whether the field is written to the sink.
    pub fn is_mapped(&self) -> bool {
        self.column_name.is_some() && self.column_type.is_some()
    }

    pub fn normalized(mut self) -> Self {
        self.column_name = blank_to_none(self.column_name);
        self
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        for (field, value) in [("source_id", &self.source_id), ("name", &self.name)] {
            if value.trim().is_empty() {
                return Err(PipelineConfigError::invalid(
                    field,
                    format!("{} cannot be empty", field),
                ));
            }
        }

        match (&self.column_name, self.column_type) {
            (None, None) => Ok(()),
            (Some(_), Some(column_type)) => {
                ensure_compatible(&self.name, &self.source_id, self.field_type, column_type)
            }
            _ => Err(PipelineConfigError::invalid(
                "column_name",
                "column_name and column_type must both be provided or both be None",
            )),
        }
    }
}

/// Sparse update for [`SchemaField`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaFieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<SourceFieldType>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub column_name: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub column_type: Option<Option<SinkColumnType>>,
}

impl Patchable for SchemaField {
    type Patch = SchemaFieldPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.source_id, &patch.source_id);
        apply(&mut updated.name, &patch.name);
        apply(&mut updated.field_type, &patch.field_type);
        apply_nullable(&mut updated.column_name, &patch.column_name);
        apply_nullable(&mut updated.column_type, &patch.column_type);

        let updated = updated.normalized();
        updated.validate()?;
        Ok(updated)
    }
}

/// The full list of fields the pipeline knows about.
///
/// # Examples
///
/// ```rust
/// use pipeline_config::{Schema, SchemaField, SinkColumnType, SourceFieldType};
///
/// let schema = Schema::new(vec![
///     SchemaField::new("orders", "order_id", SourceFieldType::String)
///         .with_column("order_id", SinkColumnType::String),
///     SchemaField::new("users", "user_id", SourceFieldType::Int64),
/// ]);
///
/// assert!(schema.is_field_in_schema("user_id", Some("users")));
/// assert!(!schema.is_field_in_schema("user_id", Some("orders")));
/// assert!(schema.is_field_in_schema("user_id", None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Whether a field called `field_name` exists, optionally scoped to one
    /// source. Without a source id any source matches.
    pub fn is_field_in_schema(&self, field_name: &str, source_id: Option<&str>) -> bool {
        self.field(field_name, source_id).is_some()
    }

    /// First field matching `field_name` (and `source_id`, when given).
    pub fn field(&self, field_name: &str, source_id: Option<&str>) -> Option<&SchemaField> {
        self.fields.iter().find(|field| {
            field.name == field_name && source_id.map_or(true, |id| field.source_id == id)
        })
    }

    pub fn fields_for_source<'a>(
        &'a self,
        source_id: &'a str,
    ) -> impl Iterator<Item = &'a SchemaField> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.source_id == source_id)
    }

    /// Distinct source ids, in order of first appearance.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .map(|field| field.source_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Fields bound to a sink column.
    pub fn mapped_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|field| field.is_mapped())
    }

    pub fn normalized(mut self) -> Self {
        self.fields = self.fields.into_iter().map(SchemaField::normalized).collect();
        self
    }

    pub fn validate(&self) -> PipelineConfigResult<()> {
        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            field
                .validate()
                .map_err(|e| e.within(&format!("fields[{}]", index)))?;

            if !seen.insert((field.source_id.as_str(), field.name.as_str())) {
                return Err(PipelineConfigError::invalid(
                    format!("fields[{}]", index),
                    format!(
                        "Field '{}' is declared more than once for source '{}'",
                        field.name, field.source_id
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Sparse update for [`Schema`]. `fields` replaces the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaField>>,
}

impl Patchable for Schema {
    type Patch = SchemaPatch;

    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self> {
        let mut updated = self.clone();
        apply(&mut updated.fields, &patch.fields);

        let updated = updated.normalized();
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
