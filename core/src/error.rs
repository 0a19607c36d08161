//! Error types for HTTP actions
//!
//! Every error a matched action can end with is an [`HttpError`]. The same
//! value is carried inside the `FAILURE`/`CANCEL` lifecycle action and used to
//! reject the caller's [request handle](crate::cancel::Cancellable), so it is
//! `Clone` and comparable.

use thiserror::Error;

/// Message used when a request is cancelled without an explicit reason.
pub const DEFAULT_CANCEL_MESSAGE: &str = "request cancelled";

/// Errors that can terminate a matched HTTP action
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
    /// The server answered with a status outside `200..=299`
    ///
    /// The decoded response body is kept so reducers can surface
    /// server-side validation messages.
    #[error("Request failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Decoded response body (`Null` when empty)
        data: serde_json::Value,
    },

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The request could not be built from its options
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read
    #[error("Failed to read response: {0}")]
    Decode(String),

    /// The transport task ended without producing a result
    #[error("Transport failed: {0}")]
    Transport(String),

    /// The request was cancelled through its cancellation token
    ///
    /// Only the cancellation path produces this variant; see
    /// [`is_cancel`](crate::cancel::is_cancel).
    #[error("Cancelled: {message}")]
    Cancelled {
        /// Reason given to the cancel call
        message: String,
    },
}

impl HttpError {
    /// Build the cancellation error with the default message
    #[must_use]
    pub fn cancelled() -> Self {
        Self::Cancelled {
            message: DEFAULT_CANCEL_MESSAGE.to_string(),
        }
    }

    /// Whether this error came from the cancellation path
    #[must_use]
    pub const fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Status code, when the server produced a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
