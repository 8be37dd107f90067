//! # sync-core
//!
//! Pure logic for sitesync (no I/O, instant tests).
//!
//! This crate implements the sync algorithm without any network or disk
//! I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`state`]: the remembered remote state and its on-disk text format
//! - [`scan`]: the result of hashing the local tree
//! - [`filter`]: which local paths take part in a sync
//! - [`plan`]: the reconciler that turns state + scan into uploads and deletes
//! - [`result`]: folding remote outcomes into one terminal result
//! - [`apply`]: the two orderings of remote calls and the state write
//!
//! The actual I/O (walking the tree, HTTP, writing the state file) is
//! performed by `sync-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod filter;
pub mod plan;
pub mod result;
pub mod scan;
pub mod state;

pub use apply::ApplyMode;
pub use filter::{extension, Exclusions, DISALLOWED_EXTENSIONS, STATE_TMP_SUFFIX};
pub use plan::{reconcile, Confirmed, Plan};
pub use result::SyncResult;
pub use scan::ScanResult;
pub use state::SyncState;
