//! XLS error types

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur during XLS reading
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error (also covers CFB errors which use std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("Invalid XLS format: {0}")]
    InvalidFormat(String),

    /// Unsupported version
    #[error("Unsupported XLS version: {0}")]
    UnsupportedVersion(String),

    /// A record could not be decoded
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// Row assembly or consumer error
    #[error(transparent)]
    Core(#[from] sheetstream_core::Error),
}

impl XlsError {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        XlsError::Malformed(msg.into())
    }
}
