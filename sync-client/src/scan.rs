//! Tree scanner: walk the sync root and hash every eligible file.
//!
//! The walk itself runs on the blocking pool; reading and hashing fan out
//! with a bounded number of files in flight.

use std::io;
use std::path::{Component, Path, PathBuf};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use sync_core::{Exclusions, ScanResult, SyncState};
use sync_types::ContentHash;
use thiserror::Error;
use walkdir::WalkDir;

use crate::remote::UploadFile;

/// Files read at once unless configured otherwise.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 32;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The sync root is missing or not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Directory traversal failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A path under the root is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The blocking walk task did not complete.
    #[error("scan task was interrupted")]
    Interrupted,
}

/// Scans one local directory tree.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    exclusions: Exclusions,
    concurrency: usize,
}

impl Scanner {
    /// Scan `root`, skipping whatever `exclusions` rejects.
    pub fn new(root: impl Into<PathBuf>, exclusions: Exclusions) -> Self {
        Self {
            root: root.into(),
            exclusions,
            concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }

    /// Limit how many files are read at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The sync root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The exclusion rules in force.
    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Hash every eligible regular file under the root.
    ///
    /// Symlinks are not followed. Hidden files are included.
    pub async fn scan(&self) -> Result<ScanResult, ScanError> {
        let is_dir = tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let root = self.root.clone();
        let exclusions = self.exclusions.clone();
        let files = tokio::task::spawn_blocking(move || eligible_files(&root, &exclusions))
            .await
            .map_err(|_| ScanError::Interrupted)??;
        tracing::debug!("Found {} eligible files under {}", files.len(), self.root.display());

        let hashed: Vec<(String, ContentHash)> = stream::iter(files)
            .map(|(relative, absolute)| async move {
                let bytes = read(&absolute).await?;
                tracing::debug!("Hashed {} ({} bytes)", relative, bytes.len());
                Ok::<_, ScanError>((relative, ContentHash::compute(&bytes)))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let result: ScanResult = hashed.into_iter().collect();
        tracing::info!("Scanned {} files", result.len());
        Ok(result)
    }

    /// Read the files to upload, in the given order.
    pub async fn read_files(&self, paths: &[String]) -> Result<Vec<UploadFile>, ScanError> {
        stream::iter(paths)
            .map(|relative| async move {
                let contents = read(&self.root.join(relative)).await?;
                Ok::<_, ScanError>(UploadFile::new(relative.clone(), contents))
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

async fn read(path: &Path) -> Result<Vec<u8>, ScanError> {
    tokio::fs::read(path).await.map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk `root` and return `(relative, absolute)` for each eligible file.
fn eligible_files(
    root: &Path,
    exclusions: &Exclusions,
) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .ok()
            .and_then(to_slash_path)
            .ok_or_else(|| ScanError::NonUtf8Path(entry.path().to_path_buf()))?;
        if exclusions.is_state_sibling(&relative) {
            tracing::warn!("Skipping {}; the name is reserved for state writes", relative);
            continue;
        }
        if exclusions.is_excluded(&relative) {
            tracing::debug!("Skipping excluded {}", relative);
            continue;
        }
        if !SyncState::can_record(&relative) {
            tracing::warn!("Skipping {}; ':' cannot be recorded in the state file", relative);
            continue;
        }
        files.push((relative, entry.into_path()));
    }
    Ok(files)
}

/// Join the normal components of `path` with forward slashes.
fn to_slash_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Express `path` relative to `root` with forward slashes.
///
/// Returns `None` when `path` is outside `root`, is `root` itself, or is
/// not valid UTF-8. Both paths are made absolute and `..` is resolved
/// lexically first; symlinks are not resolved.
pub fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let root = normalize(&std::path::absolute(root).ok()?);
    let path = normalize(&std::path::absolute(path).ok()?);
    let relative = to_slash_path(path.strip_prefix(&root).ok()?)?;
    (!relative.is_empty()).then_some(relative)
}

/// Drop `.` and fold each `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
