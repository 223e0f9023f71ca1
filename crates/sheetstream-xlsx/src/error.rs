//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// An element or attribute had an unusable value
    #[error("Malformed element: {0}")]
    Malformed(String),

    /// Row assembly or consumer error
    #[error(transparent)]
    Core(#[from] sheetstream_core::Error),
}

impl XlsxError {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        XlsxError::Malformed(msg.into())
    }
}
