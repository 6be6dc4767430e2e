//! Placeholder generation
//!
//! Placeholders look like `[NAME_k3x9q0ab]`: the category label, an underscore and a
//! short random id. The generator owns its RNG so tests can seed it and assert exact
//! output.

use crate::deidentify::models::PhiCategory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters used for placeholder ids
pub const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random id (36^8 ≈ 2.8e12 distinct ids per category)
pub const ID_LENGTH: usize = 8;

/// Random placeholder generator
pub struct PlaceholderGenerator {
    rng: StdRng,
}

impl PlaceholderGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a generator around an existing RNG
    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Generate a placeholder for a category
    pub fn generate(&mut self, category: PhiCategory) -> String {
        let id: String = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("[{}_{}]", category.label(), id)
    }

    /// Generate a placeholder not rejected by `is_taken`
    pub fn generate_unique<F>(&mut self, category: PhiCategory, is_taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let placeholder = self.generate(category);
            if !is_taken(&placeholder) {
                return placeholder;
            }
            tracing::warn!(category = %category, "Regenerating colliding placeholder");
        }
    }
}

impl Default for PlaceholderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a string has the placeholder shape `[LABEL_id]`
pub fn is_placeholder(token: &str) -> bool {
    let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) else {
        return false;
    };
    let Some((label, id)) = inner.rsplit_once('_') else {
        return false;
    };
    PhiCategory::parse(label).is_some_and(|c| c.label() == label)
        && id.len() == ID_LENGTH
        && id.bytes().all(|b| ID_ALPHABET.contains(&b))
}

/// Placeholder-shaped tokens in `text`, in order of appearance
pub fn find_placeholders(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;
    let mut offset = 0;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else {
            break;
        };
        let token = &text[offset + open..offset + open + close + 1];
        if is_placeholder(token) {
            found.push(token);
            offset += open + close + 1;
        } else {
            offset += open + 1;
        }
        rest = &text[offset..];
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_placeholder_shape() {
        let mut generator = PlaceholderGenerator::new();
        let placeholder = generator.generate(PhiCategory::IdNumber);
        assert!(placeholder.starts_with("[ID_NUMBER_"));
        assert!(placeholder.ends_with(']'));
        assert!(is_placeholder(&placeholder));
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let mut a = PlaceholderGenerator::seeded(42);
        let mut b = PlaceholderGenerator::seeded(42);
        for _ in 0..5 {
            assert_eq!(a.generate(PhiCategory::Name), b.generate(PhiCategory::Name));
        }
    }

    #[test]
    fn test_generated_placeholders_are_distinct() {
        let mut generator = PlaceholderGenerator::seeded(7);
        let issued: HashSet<String> = (0..1000)
            .map(|_| generator.generate(PhiCategory::Date))
            .collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn test_generate_unique_skips_taken() {
        let mut probe = PlaceholderGenerator::seeded(9);
        let first = probe.generate(PhiCategory::Phone);

        let mut generator = PlaceholderGenerator::seeded(9);
        let placeholder = generator.generate_unique(PhiCategory::Phone, |p| p == first);
        assert_ne!(placeholder, first);
        assert!(is_placeholder(&placeholder));
    }

    #[test]
    fn test_is_placeholder_rejects_lookalikes() {
        assert!(is_placeholder("[NAME_abc12345]"));
        assert!(!is_placeholder("[NAME_abc1234]"));
        assert!(!is_placeholder("[EMAIL_abc12345]"));
        assert!(!is_placeholder("[NAME_ABC12345]"));
        assert!(!is_placeholder("NAME_abc12345"));
        assert!(!is_placeholder("[person_abc12345]"));
    }

    #[test]
    fn test_find_placeholders() {
        let text = "[x] [NAME_abc12345] saw [[DATE_0000aaaa]] and [ID_NUMBER_zz99zz99].";
        assert_eq!(
            find_placeholders(text),
            vec!["[NAME_abc12345]", "[DATE_0000aaaa]", "[ID_NUMBER_zz99zz99]"]
        );
        assert!(find_placeholders("no tokens [here").is_empty());
    }
}
