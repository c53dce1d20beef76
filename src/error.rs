//! Error types exposed by the StepSecurity API client.

use thiserror::Error;

/// Errors surfaced while building requests or communicating with the
/// StepSecurity API.
///
/// Every variant is terminal for the call that produced it; nothing in this
/// crate retries automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Networking failed before a response was received.
    #[error("network error talking to StepSecurity: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The API rejected the credentials (HTTP 401 or 403).
    #[error("StepSecurity rejected the API key with status {status}: {body}")]
    Authentication {
        /// HTTP status code returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The API answered with a status outside the accepted success set.
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        /// Operation whose response was being decoded.
        operation: String,
        /// Decoder error detail.
        message: String,
    },

    /// A request body could not be serialised.
    #[error("failed to encode {operation} request: {message}")]
    Encode {
        /// Operation whose request was being encoded.
        operation: String,
        /// Encoder error detail.
        message: String,
    },

    /// Configuration was missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A write was attempted with a policy that has nothing to apply.
    #[error("empty policy provided")]
    EmptyPolicy,

    /// The create-users endpoint reported no users as added.
    #[error("failed to create user")]
    UserCreationFailed,

    /// Writing output failed.
    #[error("I/O error: {message}")]
    Io {
        /// I/O error detail.
        message: String,
    },

    /// Caller-supplied input was rejected before any request was made.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },
}

impl ApiError {
    /// Returns the HTTP status code when the error came from an API response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
