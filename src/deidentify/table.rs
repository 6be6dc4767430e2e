//! Reference table: placeholder → original text
//!
//! Serializes as a flat JSON object, the persisted schema.

use crate::domain::{DelilahError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session-scoped reversible mapping from placeholder to original text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    entries: BTreeMap<String, String>,
}

impl ReferenceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new placeholder
    ///
    /// # Errors
    ///
    /// Returns [`DelilahError::PlaceholderCollision`] if the placeholder was already
    /// issued; the existing mapping is left untouched.
    pub fn insert(&mut self, placeholder: String, original: String) -> Result<()> {
        if self.entries.contains_key(&placeholder) {
            return Err(DelilahError::PlaceholderCollision(placeholder));
        }
        self.entries.insert(placeholder, original);
        Ok(())
    }

    /// Original text for a placeholder
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.entries.get(placeholder).map(String::as_str)
    }

    /// Check if a placeholder has been issued
    pub fn contains(&self, placeholder: &str) -> bool {
        self.entries.contains_key(placeholder)
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (placeholder, original) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Byte spans of every issued placeholder occurring in `text`
    pub fn occurrences(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        if self.entries.is_empty() {
            return spans;
        }
        for placeholder in self.entries.keys() {
            for (start, _) in text.match_indices(placeholder.as_str()) {
                spans.push((start, start + placeholder.len()));
            }
        }
        spans.sort_unstable();
        spans
    }

    /// Replace every placeholder occurrence with its original text
    ///
    /// Placeholders are disjoint bracketed tokens, so pair order does not matter.
    pub fn reidentify(&self, text: &str) -> String {
        let mut restored = text.to_string();
        for (placeholder, original) in &self.entries {
            if restored.contains(placeholder.as_str()) {
                restored = restored.replace(placeholder.as_str(), original);
            }
        }
        restored
    }
}

impl FromIterator<(String, String)> for ReferenceTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
