//! # sync-client
//!
//! The I/O half of sitesync.
//!
//! This is the library the `sitesync` binary drives. It wraps the pure
//! logic in `sync-core` with everything that touches the outside world.
//!
//! ## Features
//!
//! - **Tree Scanning**: walkdir traversal with bounded-concurrency SHA-1 hashing
//! - **State Persistence**: `path:hash` state file, written via rename
//! - **Remote Abstraction**: Pluggable hosting API (HTTP, mock)
//! - **Two Apply Modes**: persist only confirmed changes, or fire everything at once
//!
//! ## Example
//!
//! ```ignore
//! use sync_client::{FileStateStore, HttpRemote, Scanner, Syncer};
//!
//! let scanner = Scanner::new("public", Exclusions::new());
//! let syncer = Syncer::new(HttpRemote::new()?, FileStateStore::new("public/.state"), scanner);
//!
//! let report = syncer.run(&session).await?;
//! println!("{}", report.result);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod remote;
pub mod scan;
pub mod store;
pub mod sync;

pub use remote::{
    fetch_remote_state, HttpRemote, HttpRemoteConfig, MockRemote, RemoteApi, RemoteCall,
    RemoteState, UploadFile, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MOCK_API_KEY, PROTECTED_PATHS,
};
pub use scan::{relative_to_root, ScanError, Scanner, DEFAULT_SCAN_CONCURRENCY};
pub use store::{FileStateStore, MemoryStateStore, StateStore, StoreError};
pub use sync::{BaselineSource, SyncError, SyncOptions, SyncReport, Syncer};
