//! Persistence of the remembered remote state.
//!
//! This module provides a trait for loading and saving [`SyncState`], a
//! file-backed implementation using the `path:hash` line format, and a
//! memory-based implementation for testing.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sync_core::{SyncState, STATE_TMP_SUFFIX};
use thiserror::Error;

/// Errors reading or writing the state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state exists but could not be read.
    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        /// Location of the state.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The state could not be written.
    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        /// Location of the state.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Trait for state persistence.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the remembered state.
    ///
    /// Returns `Ok(None)` when no state has been saved yet.
    async fn load(&self) -> Result<Option<SyncState>, StoreError>;

    /// Replace the remembered state.
    async fn save(&self, state: &SyncState) -> Result<(), StoreError>;
}

/// State kept in a text file, one `path:hash` line per entry.
///
/// Saves write a sibling temporary file and rename it into place, so a
/// crash mid-write leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Use the state file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(STATE_TMP_SUFFIX);
        PathBuf::from(name)
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<SyncState>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state = SyncState::parse(&text);
        let unknown = state.unknown_count();
        if unknown > 0 {
            tracing::warn!(
                "State file {} has {} entries without a hash; they will be re-uploaded",
                self.path.display(),
                unknown
            );
        }
        tracing::debug!("Loaded {} entries from {}", state.len(), self.path.display());
        Ok(Some(state))
    }

    async fn save(&self, state: &SyncState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, state.to_state_file())
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;

        tracing::debug!("Saved {} entries to {}", state.len(), self.path.display());
        Ok(())
    }
}

/// In-memory state store for testing.
///
/// Clones share the same state.
#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<MemoryStateInner>>,
}

#[derive(Debug, Default)]
struct MemoryStateInner {
    state: Option<SyncState>,
    saves: usize,
    fail_next_load: Option<String>,
    fail_next_save: Option<String>,
}

impl MemoryStateStore {
    /// Create a store with nothing saved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `state`.
    pub fn with_state(state: SyncState) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().state = Some(state);
        store
    }

    /// The currently saved state.
    pub fn state(&self) -> Option<SyncState> {
        self.inner.lock().unwrap().state.clone()
    }

    /// How many times `save()` succeeded.
    pub fn save_count(&self) -> usize {
        self.inner.lock().unwrap().saves
    }

    /// Cause the next load() to fail with the given error.
    pub fn fail_next_load(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_load = Some(error.to_string());
    }

    /// Cause the next save() to fail with the given error.
    pub fn fail_next_save(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_save = Some(error.to_string());
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<SyncState>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_load.take() {
            return Err(StoreError::Read {
                path: PathBuf::from("<memory>"),
                source: io::Error::other(error),
            });
        }
        Ok(inner.state.clone())
    }

    async fn save(&self, state: &SyncState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_save.take() {
            return Err(StoreError::Write {
                path: PathBuf::from("<memory>"),
                source: io::Error::other(error),
            });
        }
        inner.state = Some(state.clone());
        inner.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_types::RecordedHash;

    fn sample() -> SyncState {
        [("b.txt", "h2"), ("a.txt", "h1")].into_iter().collect()
    }

    // ===========================================
    // FileStateStore Tests
    // ===========================================

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(".state"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(".state"));

        store.save(&sample()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn saved_file_is_sorted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".state");
        let store = FileStateStore::new(&path);

        store.save(&sample()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a.txt:h1\nb.txt:h2");
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/state");
        let store = FileStateStore::new(&path);

        store.save(&sample()).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(".state"));

        store.save(&sample()).await.unwrap();

        assert!(!dir.path().join(".state.tmp").exists());
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(".state"));

        store.save(&sample()).await.unwrap();
        store.save(&SyncState::new()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(SyncState::new()));
    }

    #[tokio::test]
    async fn lines_without_hash_load_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".state");
        std::fs::write(&path, "a.txt:h1\nlegacy.txt\n").unwrap();

        let loaded = FileStateStore::new(&path).load().await.unwrap().unwrap();

        assert_eq!(loaded.get("legacy.txt"), Some(&RecordedHash::Unknown));
        assert_eq!(loaded.unknown_count(), 1);
    }

    #[tokio::test]
    async fn unreadable_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join(".state");
        std::fs::create_dir(&path).unwrap();

        let result = FileStateStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Read { .. })));
    }

    // ===========================================
    // MemoryStateStore Tests
    // ===========================================

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStateStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&sample()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(sample()));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn memory_store_forced_failures() {
        let store = MemoryStateStore::with_state(sample());
        store.fail_next_load("disk on fire");
        store.fail_next_save("disk full");

        assert!(matches!(store.load().await, Err(StoreError::Read { .. })));
        assert!(matches!(
            store.save(&SyncState::new()).await,
            Err(StoreError::Write { .. })
        ));
        assert_eq!(store.state(), Some(sample()));
        assert_eq!(store.save_count(), 0);
    }
}
