//! Error types

use thiserror::Error;

use crate::detect::Format;

/// Result type for sheetstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or reading a spreadsheet
#[derive(Debug, Error)]
pub enum Error {
    /// The leading bytes match neither supported container
    #[error("Unrecognized spreadsheet format: not a compound file or zip package")]
    UnrecognizedFormat,

    /// The format was recognized but its reader is not compiled in
    #[error("{0} support is not enabled")]
    FormatDisabled(Format),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XLS reading error
    #[cfg(feature = "xls")]
    #[error(transparent)]
    Xls(#[from] sheetstream_xls::XlsError),

    /// XLSX reading error
    #[cfg(feature = "xlsx")]
    #[error(transparent)]
    Xlsx(#[from] sheetstream_xlsx::XlsxError),
}

impl Error {
    /// Whether the file content could not be decoded
    pub fn is_malformed(&self) -> bool {
        match self {
            #[cfg(feature = "xls")]
            Error::Xls(e) => {
                use sheetstream_xls::XlsError;
                matches!(
                    e,
                    XlsError::Malformed(_)
                        | XlsError::Core(sheetstream_core::Error::MalformedEvent(_))
                )
            }
            #[cfg(feature = "xlsx")]
            Error::Xlsx(e) => {
                use sheetstream_xlsx::XlsxError;
                matches!(
                    e,
                    XlsxError::Malformed(_)
                        | XlsxError::Xml(_)
                        | XlsxError::Core(sheetstream_core::Error::MalformedEvent(_))
                )
            }
            _ => false,
        }
    }

    /// Whether the read was ended by an error from the row consumer
    pub fn is_consumer_failure(&self) -> bool {
        self.consumer_error().is_some()
    }

    /// The error raised by the row consumer, if that is what ended the read
    pub fn consumer_error(&self) -> Option<&sheetstream_core::ConsumerError> {
        let core: &sheetstream_core::Error = match self {
            #[cfg(feature = "xls")]
            Error::Xls(sheetstream_xls::XlsError::Core(e)) => e,
            #[cfg(feature = "xlsx")]
            Error::Xlsx(sheetstream_xlsx::XlsxError::Core(e)) => e,
            _ => return None,
        };
        match core {
            sheetstream_core::Error::Consumer(e) => Some(e),
            _ => None,
        }
    }
}
