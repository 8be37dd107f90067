//! Remote API abstraction for sitesync.
//!
//! This module provides a pluggable layer over the hosting API so the sync
//! orchestrator can run against the real HTTP service or an in-memory mock.
//!
//! # Design
//!
//! The trait is async and session-explicit:
//! - `login()` exchanges credentials for a [`Session`]
//! - `upload()`, `delete()` and `list()` take that session as an argument
//!
//! Expected failures come back as outcome enums. Only response shapes we do
//! not understand surface as [`ProtocolError`].
//!
//! # Example
//!
//! ```ignore
//! let remote = HttpRemote::new(HttpRemoteConfig::default())?;
//! let LoginOutcome::LoggedIn(session) = remote.login(&credentials).await? else { ... };
//! let listing = remote.list(&session).await?;
//! ```

mod http;
mod mock;

pub use http::{HttpRemote, HttpRemoteConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, PROTECTED_PATHS};
pub use mock::{MockRemote, RemoteCall, MOCK_API_KEY};

use async_trait::async_trait;
use std::fmt;
use sync_core::{SyncResult, SyncState};
use sync_types::{
    Credentials, DeleteOutcome, ListOutcome, LoginOutcome, ProtocolError, Session, UploadOutcome,
};

/// A file to upload: its path relative to the site root and its bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Destination path, forward slashes.
    pub path: String,
    /// Raw file contents.
    pub contents: Vec<u8>,
}

impl UploadFile {
    /// Create an upload entry.
    pub fn new(path: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("path", &self.path)
            .field("contents", &format!("[{} bytes]", self.contents.len()))
            .finish()
    }
}

/// Operations the sync needs from the hosting API.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ProtocolError>;

    /// Upload files, replacing any existing content at the same paths.
    ///
    /// An empty batch succeeds without contacting the remote.
    async fn upload(
        &self,
        session: &Session,
        files: Vec<UploadFile>,
    ) -> Result<UploadOutcome, ProtocolError>;

    /// Delete paths.
    ///
    /// An empty batch returns [`DeleteOutcome::NothingToDelete`] without
    /// contacting the remote.
    async fn delete(
        &self,
        session: &Session,
        paths: Vec<String>,
    ) -> Result<DeleteOutcome, ProtocolError>;

    /// List every file and directory on the remote.
    async fn list(&self, session: &Session) -> Result<ListOutcome, ProtocolError>;
}

/// What listing the remote produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    /// State seeded from the remote's files.
    Fetched(SyncState),
    /// The listing failed; the sync ends with this result.
    Unavailable(SyncResult),
}

/// Build a baseline from the authoritative remote listing.
///
/// Used when there is no local state file. Directories are ignored.
pub async fn fetch_remote_state<R>(remote: &R, session: &Session) -> Result<RemoteState, ProtocolError>
where
    R: RemoteApi + ?Sized,
{
    match remote.list(session).await? {
        ListOutcome::Listed(entries) => {
            let state = SyncState::from_remote(entries);
            tracing::info!("Fetched remote state: {} files", state.len());
            Ok(RemoteState::Fetched(state))
        }
        ListOutcome::InvalidAuth => {
            tracing::warn!("Remote listing rejected the session");
            Ok(RemoteState::Unavailable(SyncResult::InvalidAuth))
        }
        ListOutcome::NetworkError(reason) => {
            tracing::warn!("Remote listing failed: {}", reason);
            Ok(RemoteState::Unavailable(SyncResult::NetworkError))
        }
    }
}
