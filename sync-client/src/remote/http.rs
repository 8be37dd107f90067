//! HttpRemote - the hosting API over HTTPS.
//!
//! Every endpoint answers with the JSON envelope decoded by [`ApiResponse`].
//! Credentials go to `GET /key` as HTTP Basic auth; everything else carries
//! the API key as a bearer token.

use super::{RemoteApi, UploadFile};
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder};
use std::time::Duration;
use sync_types::{
    ApiResponse, Credentials, DeleteOutcome, ListOutcome, LoginOutcome, ProtocolError, Session,
    UploadOutcome,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://neocities.org/api";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Paths the host refuses to delete. They are dropped from delete batches.
pub const PROTECTED_PATHS: &[&str] = &["index.html"];

/// Configuration for HttpRemote.
#[derive(Clone, Debug)]
pub struct HttpRemoteConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for HttpRemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// What came back from one request.
enum Reply {
    /// A decoded JSON envelope, success or error.
    Response(ApiResponse),
    /// No usable answer: transport failure or a non-JSON body.
    Unreachable(String),
}

/// HttpRemote implements [`RemoteApi`] against the real hosting API.
///
/// # Example
///
/// ```ignore
/// let remote = HttpRemote::new()?;
/// let outcome = remote.login(&Credentials::new("user", "pass")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    config: HttpRemoteConfig,
}

impl HttpRemote {
    /// Create a client for the production API.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpRemoteConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: HttpRemoteConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("sitesync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &HttpRemoteConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Send a request and decode the envelope.
    ///
    /// Transport failures and non-JSON bodies are `Unreachable`. JSON that
    /// does not fit the envelope is a protocol error.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Reply, ProtocolError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("{} request failed: {}", operation, e);
                return Ok(Reply::Unreachable(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("{} body read failed: {}", operation, e);
                return Ok(Reply::Unreachable(e.to_string()));
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!("{} returned non-JSON body (HTTP {})", operation, status);
                return Ok(Reply::Unreachable(format!(
                    "HTTP {status}: response was not JSON"
                )));
            }
        };

        serde_json::from_value(value)
            .map(Reply::Response)
            .map_err(|e| ProtocolError::Malformed {
                operation,
                reason: e.to_string(),
            })
    }
}

/// The error kind of a failed response, from `error_type` or a non-success
/// `result`.
fn error_kind(response: &ApiResponse) -> Option<&str> {
    if !response.is_error() {
        return None;
    }
    response.error_type().or(response.result.as_deref())
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ProtocolError> {
        let token = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.username(),
            credentials.password()
        ));
        let request = self
            .client
            .get(self.url("key"))
            .header(header::AUTHORIZATION, format!("Basic {token}"));

        let response = match self.send("login", request).await? {
            Reply::Response(response) => response,
            Reply::Unreachable(reason) => return Ok(LoginOutcome::NetworkError(reason)),
        };

        match error_kind(&response) {
            Some("invalid_auth") => Ok(LoginOutcome::InvalidAuth),
            Some(_) => Err(response.unexpected("login")),
            None => {
                let api_key = response.api_key.ok_or(ProtocolError::MissingField {
                    operation: "login",
                    field: "api_key",
                })?;
                Ok(LoginOutcome::LoggedIn(Session::new(api_key)))
            }
        }
    }

    async fn upload(
        &self,
        session: &Session,
        files: Vec<UploadFile>,
    ) -> Result<UploadOutcome, ProtocolError> {
        if files.is_empty() {
            return Ok(UploadOutcome::Uploaded);
        }

        let count = files.len();
        let form = files.into_iter().fold(Form::new(), |form, file| {
            let part = Part::bytes(file.contents).file_name(file.path.clone());
            form.part(file.path, part)
        });
        let request = self
            .client
            .post(self.url("upload"))
            .bearer_auth(session.api_key())
            .multipart(form);

        tracing::debug!("Uploading {} files", count);
        let response = match self.send("upload", request).await? {
            Reply::Response(response) => response,
            Reply::Unreachable(reason) => return Ok(UploadOutcome::NetworkError(reason)),
        };

        match error_kind(&response) {
            Some("invalid_auth") => Ok(UploadOutcome::InvalidAuth),
            Some("invalid_file_type") => Ok(UploadOutcome::InvalidFileType),
            Some(_) => Err(response.unexpected("upload")),
            None => Ok(UploadOutcome::Uploaded),
        }
    }

    async fn delete(
        &self,
        session: &Session,
        paths: Vec<String>,
    ) -> Result<DeleteOutcome, ProtocolError> {
        let paths: Vec<String> = paths
            .into_iter()
            .filter(|path| {
                let protected = PROTECTED_PATHS.contains(&path.as_str());
                if protected {
                    tracing::debug!("Not deleting protected path {}", path);
                }
                !protected
            })
            .collect();
        if paths.is_empty() {
            return Ok(DeleteOutcome::NothingToDelete);
        }

        let count = paths.len();
        let form = paths
            .into_iter()
            .fold(Form::new(), |form, path| form.text("filenames[]", path));
        let request = self
            .client
            .post(self.url("delete"))
            .bearer_auth(session.api_key())
            .multipart(form);

        tracing::debug!("Deleting {} files", count);
        let response = match self.send("delete", request).await? {
            Reply::Response(response) => response,
            Reply::Unreachable(reason) => return Ok(DeleteOutcome::NetworkError(reason)),
        };

        match error_kind(&response) {
            Some("invalid_auth") => Ok(DeleteOutcome::InvalidAuth),
            Some("missing_files") => Ok(DeleteOutcome::MissingFiles),
            Some(_) => Err(response.unexpected("delete")),
            None => Ok(DeleteOutcome::Deleted),
        }
    }

    async fn list(&self, session: &Session) -> Result<ListOutcome, ProtocolError> {
        let request = self
            .client
            .get(self.url("list"))
            .bearer_auth(session.api_key());

        let response = match self.send("list", request).await? {
            Reply::Response(response) => response,
            Reply::Unreachable(reason) => return Ok(ListOutcome::NetworkError(reason)),
        };

        match error_kind(&response) {
            Some("invalid_auth") => Ok(ListOutcome::InvalidAuth),
            Some(_) => Err(response.unexpected("list")),
            None => {
                let files = response.files.ok_or(ProtocolError::MissingField {
                    operation: "list",
                    field: "files",
                })?;
                Ok(ListOutcome::Listed(files))
            }
        }
    }
}
