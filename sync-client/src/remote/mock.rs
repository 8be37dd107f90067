//! Mock remote for testing.
//!
//! Simulates a hosted site as an in-memory file map, records every call and
//! lets tests queue outcomes that override the simulation.

use super::{RemoteApi, UploadFile};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use sync_types::{
    ContentHash, Credentials, DeleteOutcome, ListOutcome, LoginOutcome, ProtocolError,
    RemoteEntry, Session, UploadOutcome,
};

/// API key handed out by a successful mock login.
pub const MOCK_API_KEY: &str = "mock-api-key";

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `login` with this username.
    Login {
        /// The username presented.
        username: String,
    },
    /// `upload` of these paths.
    Upload {
        /// Session key used.
        api_key: String,
        /// Uploaded paths, in request order.
        paths: Vec<String>,
    },
    /// `delete` of these paths.
    Delete {
        /// Session key used.
        api_key: String,
        /// Paths requested for deletion.
        paths: Vec<String>,
    },
    /// `list`.
    List {
        /// Session key used.
        api_key: String,
    },
}

/// Mock remote for testing.
///
/// Without queued outcomes it behaves like a well-mannered host: uploads
/// store content, deletes remove it (reporting `MissingFiles` if any path is
/// absent), and listings reflect the stored files.
#[derive(Debug, Default)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    files: BTreeMap<String, Vec<u8>>,
    calls: Vec<RemoteCall>,
    login_queue: VecDeque<LoginOutcome>,
    upload_queue: VecDeque<UploadOutcome>,
    delete_queue: VecDeque<DeleteOutcome>,
    list_queue: VecDeque<ListOutcome>,
    fail_next_protocol: Option<String>,
}

impl MockRemote {
    /// Create an empty mock site.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file on the simulated site.
    pub fn insert_file(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(path.into(), contents.into());
    }

    /// Snapshot of the simulated site's files.
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.files.clone()
    }

    /// Get all calls made so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Queue the outcome of the next `login()`.
    pub fn queue_login(&self, outcome: LoginOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.login_queue.push_back(outcome);
    }

    /// Queue the outcome of the next non-empty `upload()`.
    pub fn queue_upload(&self, outcome: UploadOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.upload_queue.push_back(outcome);
    }

    /// Queue the outcome of the next non-empty `delete()`.
    pub fn queue_delete(&self, outcome: DeleteOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.delete_queue.push_back(outcome);
    }

    /// Queue the outcome of the next `list()`.
    pub fn queue_list(&self, outcome: ListOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.list_queue.push_back(outcome);
    }

    /// Cause the next call to fail with an unexpected error type.
    pub fn fail_next_protocol(&self, error_type: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_protocol = Some(error_type.to_string());
    }

    /// Clear all state (files, calls, queues).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockRemoteInner::default();
    }
}

impl Clone for MockRemote {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MockRemoteInner {
    fn forced_failure(&mut self, operation: &'static str) -> Result<(), ProtocolError> {
        match self.fail_next_protocol.take() {
            Some(error_type) => Err(ProtocolError::UnexpectedError {
                operation,
                error_type,
                message: "forced by mock".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ProtocolError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::Login {
            username: credentials.username().to_string(),
        });
        inner.forced_failure("login")?;

        Ok(inner
            .login_queue
            .pop_front()
            .unwrap_or_else(|| LoginOutcome::LoggedIn(Session::new(MOCK_API_KEY))))
    }

    async fn upload(
        &self,
        session: &Session,
        files: Vec<UploadFile>,
    ) -> Result<UploadOutcome, ProtocolError> {
        if files.is_empty() {
            return Ok(UploadOutcome::Uploaded);
        }

        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::Upload {
            api_key: session.api_key().to_string(),
            paths: files.iter().map(|f| f.path.clone()).collect(),
        });
        inner.forced_failure("upload")?;

        let outcome = inner
            .upload_queue
            .pop_front()
            .unwrap_or(UploadOutcome::Uploaded);
        if outcome.is_success() {
            for file in files {
                inner.files.insert(file.path, file.contents);
            }
        }
        Ok(outcome)
    }

    async fn delete(
        &self,
        session: &Session,
        paths: Vec<String>,
    ) -> Result<DeleteOutcome, ProtocolError> {
        if paths.is_empty() {
            return Ok(DeleteOutcome::NothingToDelete);
        }

        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::Delete {
            api_key: session.api_key().to_string(),
            paths: paths.clone(),
        });
        inner.forced_failure("delete")?;

        if let Some(outcome) = inner.delete_queue.pop_front() {
            if outcome == DeleteOutcome::Deleted {
                for path in &paths {
                    inner.files.remove(path);
                }
            }
            return Ok(outcome);
        }

        // The host validates the whole batch before removing anything.
        if paths.iter().any(|p| !inner.files.contains_key(p)) {
            return Ok(DeleteOutcome::MissingFiles);
        }
        for path in &paths {
            inner.files.remove(path);
        }
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self, session: &Session) -> Result<ListOutcome, ProtocolError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RemoteCall::List {
            api_key: session.api_key().to_string(),
        });
        inner.forced_failure("list")?;

        if let Some(outcome) = inner.list_queue.pop_front() {
            return Ok(outcome);
        }
        let entries = inner
            .files
            .iter()
            .map(|(path, contents)| RemoteEntry::file(path.clone(), ContentHash::compute(contents)))
            .collect();
        Ok(ListOutcome::Listed(entries))
    }
}
