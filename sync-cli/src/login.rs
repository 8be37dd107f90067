//! Saved logins.
//!
//! `sitesync login` exchanges a username and password for an API key once
//! and keeps the key in the OS credential store under that username. The
//! first username to log in becomes the default, remembered in the data
//! directory, so later syncs need no credentials at all.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Service name API keys are stored under.
pub const KEYRING_SERVICE: &str = "sitesync";

const DEFAULT_USERNAME_FILE: &str = "default_username.txt";

/// Errors from saved-login handling.
#[derive(Debug, Error)]
pub enum LoginError {
    /// No username was given and none is saved.
    #[error("Not logged in. Use `sitesync login` first, or pass --username and --password.")]
    NotLoggedIn,

    /// The username has no saved API key.
    #[error("{0} is not logged in. Use `sitesync login` first, or pass --password.")]
    NoSavedKey(String),

    /// The OS credential store failed.
    #[error("credential store error: {0}")]
    Keyring(#[from] keyring::Error),

    /// The default-username file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Profile {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Where API keys are kept, by username.
pub trait SecretStore {
    /// The saved key, if any.
    fn api_key(&self, username: &str) -> Result<Option<String>, LoginError>;

    /// Save or replace the key.
    fn set_api_key(&self, username: &str, api_key: &str) -> Result<(), LoginError>;

    /// Remove the key. Returns whether one was saved.
    fn delete_api_key(&self, username: &str) -> Result<bool, LoginError>;
}

/// The OS credential store.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl SecretStore for KeyringStore {
    fn api_key(&self, username: &str) -> Result<Option<String>, LoginError> {
        match keyring::Entry::new(KEYRING_SERVICE, username)?.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_api_key(&self, username: &str, api_key: &str) -> Result<(), LoginError> {
        keyring::Entry::new(KEYRING_SERVICE, username)?.set_password(api_key)?;
        Ok(())
    }

    fn delete_api_key(&self, username: &str) -> Result<bool, LoginError> {
        match keyring::Entry::new(KEYRING_SERVICE, username)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// The remembered default username.
#[derive(Debug, Clone)]
pub struct Profile {
    path: PathBuf,
}

impl Profile {
    /// Keep the default username in `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(DEFAULT_USERNAME_FILE),
        }
    }

    /// The saved default username, if any.
    pub fn default_username(&self) -> Result<Option<String>, LoginError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let username = text.trim();
                Ok((!username.is_empty()).then(|| username.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.error(source)),
        }
    }

    /// Save the default username, creating the data directory if needed.
    pub fn set_default_username(&self, username: &str) -> Result<(), LoginError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        std::fs::write(&self.path, username).map_err(|e| self.error(e))
    }

    /// Forget the default username.
    pub fn clear_default_username(&self) -> Result<(), LoginError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.error(source)),
        }
    }

    fn error(&self, source: io::Error) -> LoginError {
        LoginError::Profile {
            path: self.path.clone(),
            source,
        }
    }
}

/// How a sync pass gets its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// A ready API key.
    ApiKey(String),
    /// Credentials to exchange for a key.
    Credentials {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
    },
}

/// Pick the sync credentials when no API key was given.
///
/// The username is the given one or the saved default. With a password it
/// is logged in; without one its saved key is used.
pub fn resolve(
    username: Option<String>,
    password: Option<String>,
    profile: &Profile,
    secrets: &dyn SecretStore,
) -> Result<Auth, LoginError> {
    let username = match username {
        Some(username) => username,
        None => profile.default_username()?.ok_or(LoginError::NotLoggedIn)?,
    };
    if let Some(password) = password {
        return Ok(Auth::Credentials { username, password });
    }
    match secrets.api_key(&username)? {
        Some(key) => Ok(Auth::ApiKey(key)),
        None => Err(LoginError::NoSavedKey(username)),
    }
}

/// Save a freshly issued key. The first saved username becomes the default.
pub fn remember(
    username: &str,
    api_key: &str,
    profile: &Profile,
    secrets: &dyn SecretStore,
) -> Result<(), LoginError> {
    secrets.set_api_key(username, api_key)?;
    if profile.default_username()?.is_none() {
        profile.set_default_username(username)?;
    }
    Ok(())
}

/// Remove the saved key for `username`, or for the default username.
///
/// The default is cleared when it is the one logged out. Returns the
/// username whose key was removed, or `None` if it had none saved.
pub fn forget(
    username: Option<String>,
    profile: &Profile,
    secrets: &dyn SecretStore,
) -> Result<Option<String>, LoginError> {
    let default = profile.default_username()?;
    let username = username
        .or_else(|| default.clone())
        .ok_or(LoginError::NotLoggedIn)?;

    let removed = secrets.delete_api_key(&username)?;
    if default.as_deref() == Some(username.as_str()) {
        profile.clear_default_username()?;
    }
    Ok(removed.then_some(username))
}
