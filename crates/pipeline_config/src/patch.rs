//! Building blocks for partial updates.
//!
//! A patch mirrors the shape of its entity with every field optional. For
//! fields that are themselves nullable, the patch field is an
//! `Option<Option<T>>`: the outer `None` means "leave unchanged" and
//! `Some(None)` means "clear". Serde cannot tell a missing key from an explicit
//! `null` on its own, so those fields use [`double_option`].

use crate::errors::PipelineConfigResult;
use serde::{Deserialize, Deserializer};

/// An entity that can produce an updated copy of itself from a patch.
///
/// `update` never touches `self`; it returns a new value with the patch applied
/// and the entity's own invariants re-checked.
pub trait Patchable: Clone + Sized {
    /// The sparse mirror of this entity.
    type Patch;

    /// Return a copy of `self` with `patch` applied.
    fn update(&self, patch: &Self::Patch) -> PipelineConfigResult<Self>;
}

/// Deserialize a present key into `Some(value)`, where `value` may be `None`
/// for an explicit `null`. Pair with `#[serde(default)]` so an absent key
/// stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrite `target` when the patch carries a value.
pub(crate) fn apply<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Overwrite or clear a nullable `target` when the patch mentions it.
pub(crate) fn apply_nullable<T: Clone>(target: &mut Option<T>, value: &Option<Option<T>>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Merge a nested patch into an optional entity.
///
/// `Some(None)` clears the entity. `Some(Some(patch))` updates it, starting
/// from `T::default()` when there is nothing to update yet.
pub(crate) fn merge_nullable<T>(
    target: &Option<T>,
    patch: &Option<Option<T::Patch>>,
) -> PipelineConfigResult<Option<T>>
where
    T: Patchable + Default,
{
    match patch {
        None => Ok(target.clone()),
        Some(None) => Ok(None),
        Some(Some(patch)) => {
            let base = target.clone().unwrap_or_default();
            base.update(patch).map(Some)
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
