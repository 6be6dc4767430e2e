//! Durable storage for reference tables
//!
//! One pretty-printed JSON file per session: `<dir>/ref_table_<session>.json`.

use crate::deidentify::table::ReferenceTable;
use crate::domain::{DelilahError, Result, SessionId};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "ref_table_";
const FILE_SUFFIX: &str = ".json";

/// Directory-backed reference table store
#[derive(Debug, Clone)]
pub struct ReferenceTableStore {
    dir: PathBuf,
}

impl ReferenceTableStore {
    /// Create a store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `~/.delilah/reference_tables`
    pub fn default_location() -> Self {
        Self::new(default_table_dir())
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path a session's table is stored at
    pub fn path_for(&self, session: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", session.as_str()))
    }

    /// Persist a table under a session id, replacing any previous version
    ///
    /// The table is written to a sibling temp file and renamed into place so a
    /// crash never leaves a truncated table behind.
    pub fn save(&self, session: &SessionId, table: &ReferenceTable) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(session);
        self.write_atomic(session, &path, table)?;
        Ok(path)
    }

    /// Persist a table under a session id that has nothing stored yet
    ///
    /// # Errors
    ///
    /// Returns [`DelilahError::TableExists`] if a table is already stored under the
    /// session; the stored table is left untouched.
    pub fn create(&self, session: &SessionId, table: &ReferenceTable) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(session);

        // Reserve the file name before the rename so two writers cannot both claim it
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DelilahError::TableExists(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.write_atomic(session, &path, table) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            DelilahError::Io(format!(
                "Failed to create reference table directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    fn write_atomic(
        &self,
        session: &SessionId,
        path: &Path,
        table: &ReferenceTable,
    ) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(table)?;

        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        tracing::debug!(
            session_id = %session,
            entries = table.len(),
            path = %path.display(),
            "Reference table saved"
        );
        Ok(())
    }

    /// Load the table stored under a session id
    ///
    /// # Errors
    ///
    /// - [`DelilahError::TableNotFound`] if nothing is stored for the session
    /// - [`DelilahError::Serialization`] if the stored file is malformed
    pub fn load(&self, session: &SessionId) -> Result<ReferenceTable> {
        Self::load_path(self.path_for(session))
    }

    /// Load a table from an explicit file path
    pub fn load_path(path: impl AsRef<Path>) -> Result<ReferenceTable> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DelilahError::TableNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| {
            DelilahError::Serialization(format!(
                "Malformed reference table {}: {e}",
                path.display()
            ))
        })
    }

    /// Sessions with a stored table, newest first
    pub fn list_sessions(&self) -> Result<Vec<SessionId>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let session = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
                .and_then(|id| SessionId::new(id).ok());
            if let Some(session) = session {
                sessions.push(session);
            }
        }

        sessions.sort_unstable_by(|a, b| b.cmp(a));
        Ok(sessions)
    }
}

/// Default reference table directory (`~/.delilah/reference_tables`)
pub fn default_table_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".delilah").join("reference_tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> ReferenceTable {
        [("[PHONE_12345678]".to_string(), "Tel: 555-123-4567".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path().join("tables"));
        let session = SessionId::new("20240115_103000").unwrap();

        let path = store.save(&session, &table()).unwrap();
        assert!(path.ends_with("ref_table_20240115_103000.json"));
        assert_eq!(store.load(&session).unwrap(), table());
    }

    #[test]
    fn test_create_refuses_existing_session() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path());
        let session = SessionId::new("20240115_103000_000_abc123").unwrap();
        store.create(&session, &table()).unwrap();

        let other: ReferenceTable = [("[NAME_aaaaaaaa]".to_string(), "Jane Doe".to_string())]
            .into_iter()
            .collect();
        let err = store.create(&session, &other).unwrap_err();
        assert!(matches!(err, DelilahError::TableExists(_)));
        assert_eq!(store.load(&session).unwrap(), table());
        assert!(!store.path_for(&session).with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_after_create() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path());
        let session = SessionId::new("session-a").unwrap();
        store.create(&session, &ReferenceTable::new()).unwrap();
        store.save(&session, &table()).unwrap();
        assert_eq!(store.load(&session).unwrap(), table());
    }

    #[test]
    fn test_load_missing_session() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path());
        let session = SessionId::new("20000101_000000").unwrap();
        let err = store.load(&session).unwrap_err();
        assert!(matches!(err, DelilahError::TableNotFound(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_malformed_table() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path());
        let session = SessionId::new("broken").unwrap();
        fs::write(store.path_for(&session), "{ not json").unwrap();

        let err = store.load(&session).unwrap_err();
        assert!(matches!(err, DelilahError::Serialization(_)));
    }

    #[test]
    fn test_list_sessions_newest_first() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path());
        for id in ["20240101_000000", "20240301_000000", "20240201_000000"] {
            store.save(&SessionId::new(id).unwrap(), &table()).unwrap();
        }
        fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

        let sessions: Vec<String> = store
            .list_sessions()
            .unwrap()
            .into_iter()
            .map(SessionId::into_inner)
            .collect();
        assert_eq!(
            sessions,
            vec!["20240301_000000", "20240201_000000", "20240101_000000"]
        );
    }

    #[test]
    fn test_list_sessions_missing_dir() {
        let dir = tempdir().unwrap();
        let store = ReferenceTableStore::new(dir.path().join("absent"));
        assert!(store.list_sessions().unwrap().is_empty());
    }
}
