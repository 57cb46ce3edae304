//! Pipeline identifier validation.
//!
//! Provides a branded type for pipeline ids so that an unchecked string can
//! never end up as the identity of a configuration.

use crate::errors::{PipelineConfigResult, PipelineIdError};
use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::ops::Deref;

/// Maximum length of a pipeline id, in characters.
pub const MAX_PIPELINE_ID_LENGTH: usize = 40;

/// A validated pipeline id.
///
/// Pipeline ids must:
/// - Be 1-40 characters long
/// - Contain only lowercase ASCII letters, digits, and hyphens
/// - Start and end with a letter or digit
///
/// # Examples
///
/// ```
/// use pipeline_config::PipelineId;
///
/// let id = PipelineId::try_new("orders-dedup").unwrap();
/// assert_eq!(id.as_str(), "orders-dedup");
/// assert_eq!(id.default_name(), "Orders Dedup");
///
/// assert!(PipelineId::try_new("").is_err());
/// assert!(PipelineId::try_new("Orders").is_err());
/// assert!(PipelineId::try_new("orders-").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PipelineId(String);

impl PipelineId {
    /// Validate and wrap a pipeline id.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, checked in this order: empty, too
    /// long, invalid characters, invalid first character, invalid last
    /// character.
    pub fn try_new(id: impl Into<String>) -> PipelineConfigResult<Self> {
        let id = id.into();
        validate(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Human-readable name derived from the id.
    ///
    /// Hyphens become spaces and every letter that follows a non-letter is
    /// upper-cased: `test-pipeline` becomes `Test Pipeline` and `etl2go`
    /// becomes `Etl2Go`.
    pub fn default_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        let mut after_letter = false;
        for c in self.0.chars() {
            if c == '-' {
                name.push(' ');
            } else if c.is_alphabetic() && !after_letter {
                name.extend(c.to_uppercase());
            } else {
                name.push(c);
            }
            after_letter = c.is_alphabetic();
        }
        name
    }
}

fn validate(id: &str) -> Result<(), PipelineIdError> {
    if id.is_empty() {
        return Err(PipelineIdError::Empty);
    }

    let length = id.chars().count();
    if length > MAX_PIPELINE_ID_LENGTH {
        return Err(PipelineIdError::TooLong {
            length,
            max: MAX_PIPELINE_ID_LENGTH,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(PipelineIdError::InvalidCharacters);
    }

    // Only '-' can fail the edge checks once the character set is known good.
    if id.starts_with('-') {
        return Err(PipelineIdError::InvalidStart);
    }

    if id.ends_with('-') {
        return Err(PipelineIdError::InvalidEnd);
    }

    Ok(())
}

impl TryFrom<String> for PipelineId {
    type Error = crate::errors::PipelineConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<&str> for PipelineId {
    type Error = crate::errors::PipelineConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl JsonSchema for PipelineId {
    fn schema_name() -> Cow<'static, str> {
        "PipelineId".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "minLength": 1,
            "maxLength": MAX_PIPELINE_ID_LENGTH,
            "pattern": "^[a-z0-9]([a-z0-9-]*[a-z0-9])?$"
        })
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PipelineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for PipelineId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for PipelineId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<PipelineId> for String {
    fn from(id: PipelineId) -> String {
        id.0
    }
}

#[cfg(test)]
#[path = "pipeline_id_tests.rs"]
mod tests;
