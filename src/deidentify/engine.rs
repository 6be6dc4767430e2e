//! Main deidentification engine
//!
//! [`Deidentifier`] owns one session: a reference table, the placeholder generator
//! that feeds it, and the store it is persisted to. Detection, substitution and
//! table growth for one call happen under a single lock, so concurrent callers on
//! the same session never lose table updates.
//!
//! # Examples
//!
//! ```no_run
//! use delilah::deidentify::Deidentifier;
//! use delilah::config::DeidentificationConfig;
//!
//! # fn example() -> delilah::domain::Result<()> {
//! let deidentifier = Deidentifier::new(&DeidentificationConfig::default())?;
//!
//! let scrubbed = deidentifier.deidentify("Mr. John Smith was seen at home.");
//! assert!(!scrubbed.contains("John Smith"));
//!
//! let path = deidentifier.persist()?;
//! println!("Reference table written to {}", path.display());
//!
//! assert_eq!(
//!     deidentifier.reidentify(&scrubbed),
//!     "Mr. John Smith was seen at home."
//! );
//! # Ok(())
//! # }
//! ```

use crate::config::DeidentificationConfig;
use crate::deidentify::{
    audit::AuditLogger,
    detector::{PhiDetector, RegexDetector},
    models::DeidentifyOutcome,
    patterns::PatternRegistry,
    placeholder::PlaceholderGenerator,
    store::ReferenceTableStore,
    table::ReferenceTable,
};
use crate::domain::{Result, SessionId};
use crate::sections::OrganizedSections;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Mutable per-session state, guarded as one unit
struct SessionState {
    table: ReferenceTable,
    generator: PlaceholderGenerator,
    /// Whether this session's file in the store was written by this instance
    persisted: bool,
}

/// Reversible PHI scrubber for one session
///
/// # Thread Safety
///
/// `Deidentifier` is `Send + Sync` and can be shared through `Arc`. Every call that
/// reads or grows the reference table takes the session lock for its full duration.
pub struct Deidentifier {
    session_id: SessionId,
    detector: Arc<dyn PhiDetector>,
    state: Mutex<SessionState>,
    store: ReferenceTableStore,
    audit_logger: Option<AuditLogger>,
}

impl Deidentifier {
    /// Create a deidentifier for a fresh session from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern library cannot be loaded or the audit log
    /// directory cannot be created.
    pub fn new(config: &DeidentificationConfig) -> Result<Self> {
        let registry = match config.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path)?,
            None => PatternRegistry::default_patterns()?,
        }
        .with_exclusions(&config.exclusions);

        let store = ReferenceTableStore::new(config.table_dir());

        let audit_logger = if config.audit.enabled {
            Some(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
            )?)
        } else {
            None
        };

        let mut deidentifier = Self::with_registry(registry, store);
        deidentifier.audit_logger = audit_logger;
        Ok(deidentifier)
    }

    /// Create a deidentifier from an explicit registry and store
    pub fn with_registry(registry: PatternRegistry, store: ReferenceTableStore) -> Self {
        Self::with_detector(Arc::new(RegexDetector::with_registry(registry)), store)
    }

    /// Create a deidentifier around any detector implementation
    pub fn with_detector(detector: Arc<dyn PhiDetector>, store: ReferenceTableStore) -> Self {
        Self {
            session_id: SessionId::generate(),
            detector,
            state: Mutex::new(SessionState {
                table: ReferenceTable::new(),
                generator: PlaceholderGenerator::new(),
                persisted: false,
            }),
            store,
            audit_logger: None,
        }
    }

    /// Replace the placeholder generator (seeded generators give exact output)
    pub fn with_generator(self, generator: PlaceholderGenerator) -> Self {
        self.lock_state().generator = generator;
        self
    }

    /// Use an explicit session identifier
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    /// Session this instance persists under
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Store this instance persists to
    pub fn store(&self) -> &ReferenceTableStore {
        &self.store
    }

    /// Snapshot of the current reference table
    pub fn reference_table(&self) -> ReferenceTable {
        self.lock_state().table.clone()
    }

    /// Replace detected PHI with placeholders
    ///
    /// Empty input and input without matches are returned unchanged and leave the
    /// reference table untouched.
    pub fn deidentify(&self, text: &str) -> String {
        self.deidentify_with_outcome(text).text
    }

    /// Replace detected PHI and report what was substituted
    pub fn deidentify_with_outcome(&self, text: &str) -> DeidentifyOutcome {
        if text.is_empty() {
            return DeidentifyOutcome::default();
        }

        let start = Instant::now();
        let mut guard = self.lock_state();
        let SessionState { table, generator, .. } = &mut *guard;

        // Placeholders from earlier calls are never re-scanned.
        let reserved = table.occurrences(text);
        let matches = self.detector.detect(text, &reserved);

        let mut outcome = DeidentifyOutcome {
            text: text.to_string(),
            ..Default::default()
        };
        if matches.is_empty() {
            return outcome;
        }

        let mut originals = Vec::with_capacity(matches.len());
        for m in &matches {
            let placeholder = loop {
                let candidate = generator.generate_unique(m.category, |p| table.contains(p));
                match table.insert(candidate.clone(), m.value.clone()) {
                    Ok(()) => break candidate,
                    Err(e) => tracing::error!(error = %e, "Placeholder rejected by table"),
                }
            };
            outcome.placeholders.push(placeholder);
            originals.push(m.value.clone());
            *outcome.by_category.entry(m.category).or_insert(0) += 1;
        }

        // Descending start order keeps earlier offsets valid while rewriting.
        for (m, placeholder) in matches.iter().zip(&outcome.placeholders).rev() {
            outcome.text.replace_range(m.start..m.end, placeholder);
        }
        drop(guard);

        crate::log_deidentify_complete!(
            self.session_id,
            outcome.substitutions(),
            start.elapsed()
        );

        if let Some(ref logger) = self.audit_logger {
            if let Err(e) = logger.log_deidentification(&self.session_id, &outcome, &originals) {
                tracing::warn!(error = %e, "Failed to write deidentification audit entry");
            }
        }

        outcome
    }

    /// Restore originals using this session's table
    pub fn reidentify(&self, text: &str) -> String {
        self.lock_state().table.reidentify(text)
    }

    /// Restore originals using an explicit table
    ///
    /// The given table is only read; this instance's table is not consulted.
    pub fn reidentify_with(&self, text: &str, table: &ReferenceTable) -> String {
        table.reidentify(text)
    }

    /// Restore originals in every section, using `table` or this session's table
    pub fn reidentify_sections(
        &self,
        sections: &OrganizedSections,
        table: Option<&ReferenceTable>,
    ) -> OrganizedSections {
        match table {
            Some(table) => sections.map_text(|text| table.reidentify(text)),
            None => {
                let state = self.lock_state();
                sections.map_text(|text| state.table.reidentify(text))
            }
        }
    }

    /// Persist the reference table under this session's id
    ///
    /// The session lock is held while writing so the stored snapshot includes every
    /// placeholder issued before the call. The first persist never replaces a table
    /// another session already stored under the same id; later calls update the
    /// file this instance wrote.
    ///
    /// # Errors
    ///
    /// Returns [`DelilahError::TableExists`](crate::domain::DelilahError::TableExists)
    /// when the session id is already taken in the store.
    pub fn persist(&self) -> Result<PathBuf> {
        let mut state = self.lock_state();
        let path = if state.persisted {
            self.store.save(&self.session_id, &state.table)?
        } else {
            self.store.create(&self.session_id, &state.table)?
        };
        state.persisted = true;
        tracing::info!(
            session_id = %self.session_id,
            entries = state.table.len(),
            path = %path.display(),
            "Reference table persisted"
        );
        Ok(path)
    }

    /// Load a stored table into this instance
    ///
    /// Returns `false` when the table is missing or malformed; the current table is
    /// kept in that case and the caller may continue with it.
    pub fn load(&self, session: &SessionId) -> bool {
        match self.try_load(session) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(session_id = %session, error = %e, "Reference table not loaded");
                false
            }
        }
    }

    /// Load a stored table into this instance, reporting why it failed
    pub fn try_load(&self, session: &SessionId) -> Result<usize> {
        let table = self.store.load(session)?;
        let entries = self.replace_table(table);
        if *session == self.session_id {
            // Resuming our own session: later persists extend the stored table
            self.lock_state().persisted = true;
        }
        Ok(entries)
    }

    /// Load a table from an explicit file path
    pub fn load_path(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match ReferenceTableStore::load_path(path) {
            Ok(table) => {
                self.replace_table(table);
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Reference table not loaded");
                false
            }
        }
    }

    fn replace_table(&self, table: ReferenceTable) -> usize {
        let entries = table.len();
        self.lock_state().table = table;
        tracing::info!(entries, "Reference table loaded");
        entries
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
