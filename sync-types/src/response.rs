//! JSON shapes returned by the hosting API.
//!
//! Every endpoint answers with the same envelope: a `result` field that is
//! either `"success"` or `"error"`, an `error_type` and `message` on failure,
//! and endpoint-specific payload fields on success.

use serde::Deserialize;

use crate::{ContentHash, ProtocolError};

/// Value of `result` on a successful call.
pub const RESULT_SUCCESS: &str = "success";

/// Response envelope shared by all API endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// `"success"` or `"error"`.
    #[serde(default)]
    pub result: Option<String>,
    /// Machine-readable error kind (`invalid_auth`, `invalid_file_type`, ...).
    #[serde(default)]
    pub error_type: Option<String>,
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,
    /// API key returned by the key endpoint.
    #[serde(default)]
    pub api_key: Option<String>,
    /// File listing returned by the list endpoint.
    #[serde(default)]
    pub files: Option<Vec<RemoteEntry>>,
}

impl ApiResponse {
    /// The reported error kind, if the call failed.
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    /// Whether the call failed, either via `result` or a present `error_type`.
    pub fn is_error(&self) -> bool {
        self.error_type.is_some() || self.result.as_deref().is_some_and(|r| r != RESULT_SUCCESS)
    }

    /// Turn an error response we have no outcome for into a [`ProtocolError`].
    pub fn unexpected(&self, operation: &'static str) -> ProtocolError {
        ProtocolError::UnexpectedError {
            operation,
            error_type: self
                .error_type
                .clone()
                .or_else(|| self.result.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            message: self.message.clone().unwrap_or_default(),
        }
    }
}

/// One entry in the remote file listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRemoteEntry")]
pub enum RemoteEntry {
    /// A regular file with its content hash.
    File {
        /// Path relative to the site root, forward slashes.
        path: String,
        /// SHA-1 of the stored content.
        sha1_hash: ContentHash,
        /// Size in bytes.
        size: Option<u64>,
        /// Last modification time as reported by the host.
        updated_at: Option<String>,
    },
    /// A directory. Carries no hash and is ignored for change detection.
    Directory {
        /// Path relative to the site root, forward slashes.
        path: String,
        /// Last modification time as reported by the host.
        updated_at: Option<String>,
    },
}

impl RemoteEntry {
    /// The entry's path.
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Convenience constructor for a file entry.
    pub fn file(path: impl Into<String>, sha1_hash: impl Into<ContentHash>) -> Self {
        Self::File {
            path: path.into(),
            sha1_hash: sha1_hash.into(),
            size: None,
            updated_at: None,
        }
    }

    /// Convenience constructor for a directory entry.
    pub fn directory(path: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            updated_at: None,
        }
    }
}

#[derive(Deserialize)]
struct RawRemoteEntry {
    path: String,
    #[serde(default)]
    is_directory: bool,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    sha1_hash: Option<String>,
}

impl TryFrom<RawRemoteEntry> for RemoteEntry {
    type Error = String;

    fn try_from(raw: RawRemoteEntry) -> Result<Self, Self::Error> {
        if raw.is_directory {
            return Ok(Self::Directory {
                path: raw.path,
                updated_at: raw.updated_at,
            });
        }
        let sha1_hash = raw
            .sha1_hash
            .ok_or_else(|| format!("file entry `{}` has no sha1_hash", raw.path))?;
        Ok(Self::File {
            path: raw.path,
            sha1_hash: ContentHash::new(sha1_hash),
            size: raw.size,
            updated_at: raw.updated_at,
        })
    }
}
