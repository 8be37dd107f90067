//! # sync-types
//!
//! Wire vocabulary for sitesync.
//!
//! This crate provides the foundational types used across all sitesync crates:
//! - [`ContentHash`], [`RecordedHash`] - File identity for change detection
//! - [`Session`], [`Credentials`] - Authentication values passed explicitly
//! - [`RemoteEntry`], [`ApiResponse`] - Shapes returned by the hosting API
//! - [`LoginOutcome`], [`UploadOutcome`], [`DeleteOutcome`], [`ListOutcome`] -
//!   Expected results of remote calls
//! - [`ProtocolError`] - Unexpected payload shapes

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod outcome;
mod response;
mod session;

pub use error::ProtocolError;
pub use hash::{ContentHash, RecordedHash};
pub use outcome::{DeleteOutcome, ListOutcome, LoginOutcome, UploadOutcome};
pub use response::{ApiResponse, RemoteEntry, RESULT_SUCCESS};
pub use session::{Credentials, Session};
