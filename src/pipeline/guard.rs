//! Per-session generation guards
//!
//! A [`GenerationRegistry`] remembers which (section, content) pairs are being
//! enhanced right now. [`GenerationRegistry::try_acquire`] hands out a
//! [`GenerationGuard`] for a free pair and `None` for a busy one; dropping the guard
//! frees the pair on every exit path, unwinding included.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity of one generation: section name and SHA-256 of its input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    /// Section being generated
    pub section: String,
    /// Hex SHA-256 of the section input
    pub fingerprint: String,
}

impl GenerationKey {
    /// Key for a section and its input text
    pub fn new(section: &str, content: &str) -> Self {
        Self {
            section: section.to_string(),
            fingerprint: fingerprint(content),
        }
    }
}

/// Registry of in-flight generations, owned by one session or pipeline
#[derive(Debug, Clone, Default)]
pub struct GenerationRegistry {
    active: Arc<Mutex<HashSet<GenerationKey>>>,
}

impl GenerationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a (section, content) pair, or `None` if it is already claimed
    pub fn try_acquire(&self, section: &str, content: &str) -> Option<GenerationGuard> {
        let key = GenerationKey::new(section, content);
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(GenerationGuard {
            active: Arc::clone(&self.active),
            key,
        })
    }

    /// Whether a pair is currently claimed
    pub fn is_active(&self, section: &str, content: &str) -> bool {
        self.lock().contains(&GenerationKey::new(section, content))
    }

    /// Number of claimed pairs
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<GenerationKey>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Claim on one generation, released on drop
#[derive(Debug)]
pub struct GenerationGuard {
    active: Arc<Mutex<HashSet<GenerationKey>>>,
    key: GenerationKey,
}

impl GenerationGuard {
    /// The claimed key
    pub fn key(&self) -> &GenerationKey {
        &self.key
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Hex SHA-256 of `content`
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_until_release() {
        let registry = GenerationRegistry::new();
        let guard = registry.try_acquire("background", "text").unwrap();
        assert!(registry.try_acquire("background", "text").is_none());
        assert!(registry.is_active("background", "text"));

        drop(guard);
        assert!(!registry.is_active("background", "text"));
        assert!(registry.try_acquire("background", "text").is_some());
    }

    #[test]
    fn test_keys_differ_by_section_and_content() {
        let registry = GenerationRegistry::new();
        let _a = registry.try_acquire("background", "text").unwrap();
        let _b = registry.try_acquire("background", "other text").unwrap();
        let _c = registry.try_acquire("plan", "text").unwrap();
        assert_eq!(registry.active_count(), 3);
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn generate(registry: &GenerationRegistry) -> Result<(), String> {
            let _guard = registry
                .try_acquire("plan", "text")
                .ok_or_else(|| "busy".to_string())?;
            Err("enhancement failed".to_string())
        }

        let registry = GenerationRegistry::new();
        assert!(generate(&registry).is_err());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_guard_released_on_panic() {
        let registry = GenerationRegistry::new();
        let cloned = registry.clone();
        let result = std::thread::spawn(move || {
            let _guard = cloned.try_acquire("plan", "text").unwrap();
            panic!("enhancer crashed");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = GenerationRegistry::new();
        let second = GenerationRegistry::new();
        let _guard = first.try_acquire("plan", "text").unwrap();
        assert!(second.try_acquire("plan", "text").is_some());
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
