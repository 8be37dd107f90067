//! Content hashes used to detect changed files.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Hex-encoded SHA-1 digest of a file's raw bytes.
///
/// Locally computed hashes are always 40 lowercase hex characters. Hashes
/// read from a state file or a remote listing are carried verbatim and
/// compared as exact strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw file contents.
    pub fn compute(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha1::digest(bytes)))
    }

    /// Wrap an existing hex digest without validating it.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(hex: &str) -> Self {
        Self::new(hex)
    }
}

/// A hash as remembered in sync state.
///
/// `Unknown` marks an entry whose hash could not be read back (a malformed
/// state line). It never matches any real hash, so such a file is always
/// considered changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedHash {
    /// A hash we trust.
    Known(ContentHash),
    /// The entry exists but its hash is unreadable.
    Unknown,
}

impl RecordedHash {
    /// Whether this recorded hash equals a freshly computed one.
    pub fn matches(&self, hash: &ContentHash) -> bool {
        match self {
            Self::Known(known) => known == hash,
            Self::Unknown => false,
        }
    }

    /// The hash, if known.
    pub fn known(&self) -> Option<&ContentHash> {
        match self {
            Self::Known(hash) => Some(hash),
            Self::Unknown => None,
        }
    }
}

impl From<ContentHash> for RecordedHash {
    fn from(hash: ContentHash) -> Self {
        Self::Known(hash)
    }
}
