//! Partial-update helpers
//!
//! PATCH/PUT bodies need to tell "field absent" apart from "field set to
//! null". With `#[serde(default, deserialize_with = "double_option")]` an
//! `Option<Option<T>>` field becomes:
//!
//! - `None` when the key is missing,
//! - `Some(None)` for an explicit `null`,
//! - `Some(Some(v))` for a value.

use serde::{Deserialize, Deserializer};

pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a double-option patch to a nullable field
pub fn apply<T>(target: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *target = value;
    }
}
