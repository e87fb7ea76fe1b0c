//! Translation error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Translation result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// The inbound event lacks a field its payload format requires, or a field
    /// has the wrong shape.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// The application answered a load balancer request with a status code
    /// that has no standard reason phrase.
    #[error("unsupported status code: {0}")]
    UnsupportedStatusCode(u16),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Convenience constructors
impl Error {
    pub fn malformed_event(msg: impl Into<String>) -> Self {
        Self::MalformedEvent(msg.into())
    }

    pub fn unsupported_status_code(code: u16) -> Self {
        Self::UnsupportedStatusCode(code)
    }
}
