//! JSON sidecar: class codes plus per-body ids and names.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Class name reported when a class index has no entry.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// Parsed metadata document.
///
/// `ids` and `names` run parallel to the record array. Either may be shorter
/// than the catalog; lookups past the end fall back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogMetadata {
    /// Class index → class code (`"MBA"`, `"APO"`, ...).
    pub classes: Vec<String>,
    /// Body index → catalog id.
    pub ids: Vec<String>,
    /// Body index → display name.
    pub names: Vec<String>,
}

impl CatalogMetadata {
    /// Catalog id, or the index itself when missing.
    pub fn id(&self, index: usize) -> Cow<'_, str> {
        match self.ids.get(index) {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => Cow::Owned(index.to_string()),
        }
    }

    /// Display name, or `"Asteroid {id}"` when missing or empty.
    pub fn name(&self, index: usize) -> Cow<'_, str> {
        match self.names.get(index) {
            Some(name) if !name.trim().is_empty() => Cow::Borrowed(name.as_str()),
            _ => Cow::Owned(format!("Asteroid {}", self.id(index))),
        }
    }

    /// Class code for a class index, or [`UNKNOWN_CLASS`].
    pub fn class_name(&self, class_index: Option<usize>) -> &str {
        class_index
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CLASS)
    }
}
