//! Regex-based PHI detector
//!
//! Detection runs every rule against the unmodified input, so a placeholder issued
//! for one span can never be seen by a later rule. Overlaps between rules are settled
//! before any text is rewritten: the rule declared first keeps the span.

use crate::deidentify::models::PhiMatch;
use crate::deidentify::patterns::PatternRegistry;
use std::sync::Arc;

/// Trait for PHI detection implementations
pub trait PhiDetector: Send + Sync {
    /// Every non-excluded candidate span in `text`, in no particular order
    fn candidates(&self, text: &str) -> Vec<PhiMatch>;

    /// Candidates with overlaps resolved, sorted by start offset
    ///
    /// `reserved` spans (byte ranges) are treated as already consumed.
    fn detect(&self, text: &str, reserved: &[(usize, usize)]) -> Vec<PhiMatch> {
        resolve_overlaps(self.candidates(text), reserved)
    }
}

/// Regex-based PHI detector
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    /// Create a new regex detector with the built-in clinical patterns
    pub fn new() -> crate::domain::Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex detector with a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }

    /// The registry this detector applies
    pub fn registry(&self) -> &PatternRegistry {
        &self.pattern_registry
    }
}

impl PhiDetector for RegexDetector {
    fn candidates(&self, text: &str) -> Vec<PhiMatch> {
        let mut found = Vec::new();
        let exclusions = self.pattern_registry.exclusions();

        for pattern in self.pattern_registry.all_patterns() {
            for result in pattern.regex.find_iter(text) {
                let matched = match result {
                    Ok(m) => m,
                    Err(e) => {
                        // Backtrack limit hit; the remaining matches of this rule are lost.
                        tracing::warn!(
                            category = %pattern.category,
                            priority = pattern.priority,
                            error = %e,
                            "Pattern evaluation aborted"
                        );
                        break;
                    }
                };

                if matched.start() == matched.end() {
                    continue;
                }

                if exclusions.is_protected(matched.as_str()) {
                    tracing::trace!(
                        category = %pattern.category,
                        start = matched.start(),
                        "Skipping protected term"
                    );
                    continue;
                }

                found.push(PhiMatch {
                    category: pattern.category,
                    priority: pattern.priority,
                    start: matched.start(),
                    end: matched.end(),
                    value: matched.as_str().to_string(),
                });
            }
        }

        found
    }
}

/// Resolve overlapping candidates by rule priority
///
/// Candidates are visited in (priority, start) order and accepted when they touch
/// neither a reserved span nor an already accepted span. The result is sorted by
/// start offset.
pub fn resolve_overlaps(mut candidates: Vec<PhiMatch>, reserved: &[(usize, usize)]) -> Vec<PhiMatch> {
    candidates.sort_by_key(|m| (m.priority, m.start, m.end));

    let mut accepted: Vec<PhiMatch> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let blocked = reserved
            .iter()
            .any(|&(start, end)| candidate.overlaps(start, end))
            || accepted
                .iter()
                .any(|a| a.overlaps(candidate.start, candidate.end));
        if !blocked {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|m| m.start);
    accepted
}
