//! Error types for newsrelay
//!
//! Only fatal conditions travel as `Err`. Per-feed and per-item failures
//! are reported through [`FetchOutcome`](crate::traits::FetchOutcome) and
//! [`DeliveryOutcome`](crate::traits::DeliveryOutcome) instead.

use thiserror::Error;

/// Result type alias for newsrelay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for newsrelay
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is absent or blank
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Link store errors
    #[error("Link store error: {0}")]
    LinkStore(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a link store error
    pub fn link_store(msg: impl Into<String>) -> Self {
        Self::LinkStore(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error should stop the process with a configuration exit code
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingCredential(_))
    }
}
