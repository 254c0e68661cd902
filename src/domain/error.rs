//! Error types for the vidshelf library host.
//!
//! This module defines the centralized error type [`VidshelfError`] and a type alias
//! [`Result`] used throughout the crate. Only the store and the request bridge ever
//! surface these errors; the directory scanner logs and swallows its failures.

use thiserror::Error;

/// The main error type for vidshelf operations.
///
/// # Examples
///
/// ```
/// use vidshelf::VidshelfError;
///
/// fn reject() -> Result<(), VidshelfError> {
///     Err(VidshelfError::Storage("channel list could not be written".to_string()))
/// }
/// assert!(reject().is_err());
/// ```
#[derive(Debug, Error)]
pub enum VidshelfError {
    /// Storage operation failed.
    ///
    /// Occurs when the JSON document cannot be parsed, serialized, or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request could not be decoded or a response could not be encoded.
    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    /// The worker could not service a request (e.g. store never opened).
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for vidshelf operations.
pub type Result<T> = std::result::Result<T, VidshelfError>;
