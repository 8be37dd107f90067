//! Remembered remote state and its on-disk text format.
//!
//! The state file is UTF-8 text with one `path:hash` record per line, paths
//! relative to the sync root with forward slashes, and no trailing newline.
//! Reading is tolerant: a line that has no `:` (or an empty hash) keeps its
//! path but gets [`RecordedHash::Unknown`], which forces a re-upload.
//!
//! A path containing `:` cannot be recorded: it would read back split at
//! the wrong place. Such paths are left out when writing.

use std::collections::btree_map::{self, BTreeMap};
use sync_types::{ContentHash, RecordedHash, RemoteEntry};

use crate::filter::Exclusions;
use crate::scan::ScanResult;

const SEPARATOR: char = ':';

/// Path → hash for what we last knew was on the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    entries: BTreeMap<String, RecordedHash>,
}

impl SyncState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the state file format.
    ///
    /// Blank lines are skipped and a trailing `\r` is ignored. The path ends
    /// at the first `:`. When a path repeats, the last line wins.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let (path, hash) = match line.split_once(SEPARATOR) {
                Some((path, hash)) if !hash.is_empty() => {
                    (path, RecordedHash::Known(ContentHash::new(hash)))
                }
                Some((path, _)) => (path, RecordedHash::Unknown),
                None => (line, RecordedHash::Unknown),
            };
            entries.insert(path.to_string(), hash);
        }
        Self { entries }
    }

    /// Whether `path` survives a write and read of the state file.
    pub fn can_record(path: &str) -> bool {
        !path.contains(SEPARATOR)
    }

    /// Render the state file format.
    ///
    /// Records are sorted by path and joined by `\n`. Unknown hashes are
    /// written as a bare path so they read back as unknown. Paths that
    /// [cannot be recorded](Self::can_record) are left out.
    pub fn to_state_file(&self) -> String {
        self.entries
            .iter()
            .filter(|(path, _)| Self::can_record(path))
            .map(|(path, hash)| match hash {
                RecordedHash::Known(hash) => format!("{path}:{hash}"),
                RecordedHash::Unknown => path.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Seed state from a remote listing. Directories carry no hash and are
    /// skipped.
    pub fn from_remote<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RemoteEntry>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|entry| match entry {
                RemoteEntry::File {
                    path, sha1_hash, ..
                } => Some((path, RecordedHash::Known(sha1_hash))),
                RemoteEntry::Directory { .. } => None,
            })
            .collect();
        Self { entries }
    }

    /// Remember a path's hash.
    pub fn insert(&mut self, path: impl Into<String>, hash: impl Into<RecordedHash>) {
        self.entries.insert(path.into(), hash.into());
    }

    /// Forget a path.
    pub fn remove(&mut self, path: &str) -> Option<RecordedHash> {
        self.entries.remove(path)
    }

    /// The remembered hash of `path`.
    pub fn get(&self, path: &str) -> Option<&RecordedHash> {
        self.entries.get(path)
    }

    /// Whether `path` is remembered.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of remembered paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose hash could not be read back.
    pub fn unknown_count(&self) -> usize {
        self.entries
            .values()
            .filter(|hash| matches!(hash, RecordedHash::Unknown))
            .count()
    }

    /// Drop every path the exclusion rules reject, so it is neither
    /// compared nor deleted.
    pub fn retain_eligible(&mut self, exclusions: &Exclusions) {
        self.entries.retain(|path, _| !exclusions.is_excluded(path));
    }

    /// Iterate over `(path, hash)` in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, RecordedHash> {
        self.entries.iter()
    }
}

impl From<&ScanResult> for SyncState {
    fn from(scan: &ScanResult) -> Self {
        Self {
            entries: scan
                .iter()
                .map(|(path, hash)| (path.clone(), RecordedHash::Known(hash.clone())))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SyncState
where
    K: Into<String>,
    V: Into<ContentHash>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, hash)| (path.into(), RecordedHash::Known(hash.into())))
                .collect(),
        }
    }
}
