//! Pattern registry for PHI detection
//!
//! Patterns are declared in a TOML library as an ordered array of category blocks.
//! Declaration order is priority order: the first block outranks the second, and
//! within a block the first pattern outranks the second.

use crate::deidentify::models::PhiCategory;
use crate::domain::{DelilahError, Result};
use fancy_regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Category block as written in the TOML library
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDefinition {
    /// PHI category label
    pub category: String,
    /// Regex patterns, highest priority first
    pub patterns: Vec<String>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    #[serde(default)]
    exclusions: Vec<String>,
    #[serde(default)]
    categories: Vec<CategoryDefinition>,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Compiled, case-insensitive regex
    pub regex: Regex,
    /// PHI category
    pub category: PhiCategory,
    /// Global priority; 0 is applied first
    pub priority: usize,
}

/// Protected phrases that are never treated as PHI
///
/// A matched span is protected when it contains any phrase, compared
/// case-insensitively. Containment is deliberately broad: a protected phrase that is
/// only part of a longer match still protects the whole match.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    terms: Vec<String>,
}

impl ExclusionList {
    /// Build an exclusion list from raw phrases
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.extend(terms);
        list
    }

    /// Add phrases, skipping blanks and duplicates
    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
    }

    /// Check whether the text contains a protected phrase
    pub fn is_protected(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        self.terms.iter().any(|term| lowered.contains(term.as_str()))
    }

    /// Number of protected phrases
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Pattern registry for PHI detection
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    exclusions: ExclusionList,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DelilahError::Pattern(format!(
                "Failed to read pattern library {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary = toml::from_str(content).map_err(|e| {
            DelilahError::Pattern(format!("Failed to parse pattern library TOML: {e}"))
        })?;

        Self::from_definitions(&library.categories, library.exclusions)
    }

    /// Create a registry from already-parsed category blocks
    pub fn from_definitions<I, S>(definitions: &[CategoryDefinition], exclusions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();

        for def in definitions {
            let category = PhiCategory::parse(&def.category).ok_or_else(|| {
                DelilahError::Pattern(format!("Unknown PHI category: {}", def.category))
            })?;

            for pattern_str in &def.patterns {
                let regex = Regex::new(&format!("(?i){pattern_str}")).map_err(|e| {
                    DelilahError::Pattern(format!(
                        "Invalid regex in category '{}': {pattern_str}: {e}",
                        def.category
                    ))
                })?;

                patterns.push(CompiledPattern {
                    regex,
                    category,
                    priority: patterns.len(),
                });
            }
        }

        Ok(Self {
            patterns,
            exclusions: ExclusionList::new(exclusions),
        })
    }

    /// Create a default pattern registry with built-in clinical patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../patterns/phi_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Merge additional protected phrases into the registry
    pub fn with_exclusions<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusions.extend(terms);
        self
    }

    /// Get all patterns in priority order
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific category, in priority order
    pub fn patterns_for_category(&self, category: PhiCategory) -> Vec<&CompiledPattern> {
        self.patterns
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Categories in the order they were first declared
    pub fn categories(&self) -> Vec<PhiCategory> {
        let mut seen = Vec::new();
        for pattern in &self.patterns {
            if !seen.contains(&pattern.category) {
                seen.push(pattern.category);
            }
        }
        seen
    }

    /// The exclusion list
    pub fn exclusions(&self) -> &ExclusionList {
        &self.exclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_patterns() {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert!(!registry.all_patterns().is_empty());
        assert!(!registry.exclusions().is_empty());
        assert_eq!(
            registry.categories(),
            vec![
                PhiCategory::Name,
                PhiCategory::Date,
                PhiCategory::Phone,
                PhiCategory::IdNumber
            ]
        );
    }

    #[test]
    fn test_priorities_follow_declaration_order() {
        let registry = PatternRegistry::default_patterns().unwrap();
        for (idx, pattern) in registry.all_patterns().iter().enumerate() {
            assert_eq!(pattern.priority, idx);
        }
    }

    #[test]
    fn test_phone_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let phone_patterns = registry.patterns_for_category(PhiCategory::Phone);
        assert!(!phone_patterns.is_empty());

        let text = "Phone: (555) 123-4567";
        let has_match = phone_patterns
            .iter()
            .any(|p| p.regex.is_match(text).unwrap_or(false));
        assert!(has_match);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let date_patterns = registry.patterns_for_category(PhiCategory::Date);
        assert!(date_patterns
            .iter()
            .any(|p| p.regex.is_match("dob: 01/02/1980").unwrap_or(false)));
    }

    #[test]
    fn test_from_toml_custom_library() {
        let toml = r#"
exclusions = ["Clinic"]

[[categories]]
category = "ID_NUMBER"
patterns = ['case-\d+']

[[categories]]
category = "person"
patterns = ['alice', 'bob']
"#;
        let registry = PatternRegistry::from_toml(toml).unwrap();
        assert_eq!(registry.all_patterns().len(), 3);
        assert_eq!(registry.all_patterns()[0].category, PhiCategory::IdNumber);
        assert_eq!(registry.all_patterns()[2].category, PhiCategory::Name);
        assert!(registry.exclusions().is_protected("the CLINIC"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let toml = r#"
[[categories]]
category = "EMAIL"
patterns = ['x']
"#;
        let err = PatternRegistry::from_toml(toml).unwrap_err();
        assert!(matches!(err, DelilahError::Pattern(_)));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let toml = r#"
[[categories]]
category = "NAME"
patterns = ['(unclosed']
"#;
        assert!(PatternRegistry::from_toml(toml).is_err());
    }

    #[test]
    fn test_exclusion_containment_is_case_insensitive() {
        let list = ExclusionList::new(["Occupational Therapist", "  "]);
        assert_eq!(list.len(), 1);
        assert!(list.is_protected("occupational therapist"));
        assert!(list.is_protected("Mr. Smith, Occupational Therapist"));
        assert!(!list.is_protected("Occupational"));
    }

    #[test]
    fn test_with_exclusions_merges_without_duplicates() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let before = registry.exclusions().len();
        let registry = registry.with_exclusions(["Assessment", "Riverside Clinic"]);
        assert_eq!(registry.exclusions().len(), before + 1);
        assert!(registry.exclusions().is_protected("RIVERSIDE CLINIC"));
    }
}
