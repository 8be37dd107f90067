//! Folding remote outcomes into one terminal result.

use std::fmt;
use sync_types::{DeleteOutcome, UploadOutcome};

/// Terminal result of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    /// The remote matches the local tree.
    Ok,
    /// The remote lacked files the state said it had. Advisory only.
    OutOfSync,
    /// The host rejected a file extension.
    InvalidFileType,
    /// The credentials or session were rejected.
    InvalidAuth,
    /// The remote could not be reached.
    NetworkError,
}

impl SyncResult {
    /// Combine the outcomes of the apply phase.
    ///
    /// The upload outcome takes priority over the delete outcome. An empty
    /// delete (`NothingToDelete`) is plain success.
    pub fn resolve(upload: &UploadOutcome, delete: &DeleteOutcome) -> Self {
        match upload {
            UploadOutcome::NetworkError(_) => return Self::NetworkError,
            UploadOutcome::InvalidAuth => return Self::InvalidAuth,
            UploadOutcome::InvalidFileType => return Self::InvalidFileType,
            UploadOutcome::Uploaded => {}
        }
        match delete {
            DeleteOutcome::NetworkError(_) => Self::NetworkError,
            DeleteOutcome::InvalidAuth => Self::InvalidAuth,
            DeleteOutcome::MissingFiles => Self::OutOfSync,
            DeleteOutcome::Deleted | DeleteOutcome::NothingToDelete => Self::Ok,
        }
    }

    /// Whether the process should exit with a failure code.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Ok | Self::OutOfSync)
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::OutOfSync => "out-of-sync",
            Self::InvalidFileType => "invalid-file-type",
            Self::InvalidAuth => "invalid-auth",
            Self::NetworkError => "network-error",
        })
    }
}
