//! Expected results of remote calls.
//!
//! These are ordinary outcomes, not errors: a sync pass inspects them and
//! maps them to a terminal result. Unexpected response shapes are reported
//! separately as [`ProtocolError`](crate::ProtocolError).

use crate::{RemoteEntry, Session};

/// Result of exchanging credentials for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted.
    LoggedIn(Session),
    /// Username or password rejected.
    InvalidAuth,
    /// The request could not be completed.
    NetworkError(String),
}

/// Result of uploading a batch of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Every file was accepted (or there was nothing to send).
    Uploaded,
    /// The host refused one of the file extensions.
    InvalidFileType,
    /// The session was rejected.
    InvalidAuth,
    /// The request could not be completed.
    NetworkError(String),
}

impl UploadOutcome {
    /// Whether the remote now holds the uploaded content.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded)
    }
}

/// Result of deleting a batch of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Every path was removed.
    Deleted,
    /// There was nothing to send; no request was made.
    NothingToDelete,
    /// The host reported that some paths did not exist.
    MissingFiles,
    /// The session was rejected.
    InvalidAuth,
    /// The request could not be completed.
    NetworkError(String),
}

impl DeleteOutcome {
    /// Whether the remote confirmed removing every requested path.
    ///
    /// `MissingFiles` does not count: the host rejects the whole batch, so
    /// the paths that did exist are still there.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted | Self::NothingToDelete)
    }
}

/// Result of listing the remote site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    /// The full listing, files and directories.
    Listed(Vec<RemoteEntry>),
    /// The session was rejected.
    InvalidAuth,
    /// The request could not be completed.
    NetworkError(String),
}
