//! The result of hashing the local tree.

use std::collections::btree_map::{self, BTreeMap};
use sync_types::ContentHash;

/// Freshly computed hashes for every eligible local file.
///
/// Keys are paths relative to the sync root with forward slashes. Every key
/// names a file that existed and passed the exclusion rules when scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    files: BTreeMap<String, ContentHash>,
}

impl ScanResult {
    /// Create an empty scan result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's hash.
    pub fn insert(&mut self, path: impl Into<String>, hash: ContentHash) {
        self.files.insert(path.into(), hash);
    }

    /// Hash of a scanned file.
    pub fn get(&self, path: &str) -> Option<&ContentHash> {
        self.files.get(path)
    }

    /// Whether the scan found `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of files found.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the scan found nothing.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over `(path, hash)` in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ContentHash> {
        self.files.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ScanResult
where
    K: Into<String>,
    V: Into<ContentHash>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(path, hash)| (path.into(), hash.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = (&'a String, &'a ContentHash);
    type IntoIter = btree_map::Iter<'a, String, ContentHash>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
