//! Error types for sitesync wire handling.

use thiserror::Error;

/// A response from the hosting API had a shape we do not understand.
///
/// Expected failures (bad credentials, network trouble, rejected file types)
/// are reported through the outcome enums instead. This error is fatal for a
/// sync pass.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The API reported an error type we have no outcome for.
    #[error("unexpected {operation} error: {error_type}: {message}")]
    UnexpectedError {
        /// The API operation (`login`, `upload`, ...).
        operation: &'static str,
        /// The `error_type` field of the response.
        error_type: String,
        /// The human-readable `message` field, if any.
        message: String,
    },

    /// A successful response lacked a field the operation needs.
    #[error("{operation} response is missing `{field}`")]
    MissingField {
        /// The API operation.
        operation: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The response was JSON but did not decode into the expected shape.
    #[error("malformed {operation} response: {reason}")]
    Malformed {
        /// The API operation.
        operation: &'static str,
        /// Decoder message.
        reason: String,
    },
}
