//! Persisted local state: the single workspace identifier that navigation
//! writes and the desk reads at load time and at drop time.

use crate::error::{DeskError, DeskResult};
use serde::Deserialize;
use std::path::PathBuf;

pub trait WorkspaceStore {
    /// The persisted workspace id, if one is stored and non-empty.
    fn workspace_id(&self) -> Option<String>;
}

#[derive(Deserialize, Default)]
struct PersistedWorkspace {
    #[serde(rename = "workspaceId", default)]
    workspace_id: Option<String>,
}

/// JSON-file backed store living in the application data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> DeskResult<PersistedWorkspace> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedWorkspace::default())
            }
            Err(err) => return Err(self.error(err)),
        };
        serde_json::from_str(&raw).map_err(|err| self.error(err))
    }

    fn error(&self, err: impl ToString) -> DeskError {
        DeskError::Store {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

impl WorkspaceStore for FileStore {
    fn workspace_id(&self) -> Option<String> {
        match self.read() {
            Ok(persisted) => persisted.workspace_id.filter(|id| !id.is_empty()),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }
}

/// In-memory store for tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    workspace_id: Option<String>,
}

impl MemoryStore {
    pub fn with_workspace(id: &str) -> Self {
        Self {
            workspace_id: Some(id.to_string()),
        }
    }
}

impl WorkspaceStore for MemoryStore {
    fn workspace_id(&self) -> Option<String> {
        self.workspace_id.clone().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("workspace.json"));
        assert_eq!(store.workspace_id(), None);
    }

    #[test]
    fn test_file_store_reads_navigation_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, r#"{"workspaceId":"0b7d"}"#).unwrap();
        assert_eq!(FileStore::new(path).workspace_id().as_deref(), Some("0b7d"));
    }

    #[test]
    fn test_empty_id_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, r#"{"workspaceId":""}"#).unwrap();
        assert_eq!(FileStore::new(path).workspace_id(), None);

        let memory = MemoryStore::with_workspace("");
        assert_eq!(memory.workspace_id(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(FileStore::new(path).workspace_id(), None);
    }
}
