//! Error types for jukegen-qp
//!
//! Defines service-level error types using thiserror for clear error
//! propagation. Generation-path failures are not errors in this sense:
//! they terminate as failed queue items and never surface to callers.

use thiserror::Error;

/// Main error type for the jukegen-qp service
#[derive(Error, Debug)]
pub enum Error {
    /// Shared jukegen error (configuration, validation)
    #[error(transparent)]
    Common(#[from] jukegen_common::Error),

    /// Remote generation service error
    #[error("Remote service error: {0}")]
    Client(#[from] crate::remote::ClientError),

    /// Audio decoding or output error
    #[error("Playback error: {0}")]
    Playback(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the jukegen-qp Error
pub type Result<T> = std::result::Result<T, Error>;
