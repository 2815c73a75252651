//! Error types for the media type resolution pipeline.

use std::io;
use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error raised while probing the filesystem
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid registration in a file-name map or extension table
    #[error("MIME type error: {0}")]
    MimeType(String),

    /// Strict media type parse failure
    #[error("Media type error: {0}")]
    MediaType(String),

    /// A declared content encoding that names no known charset
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// A blocking resolution task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

/// Specialized Result type for media type operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}
