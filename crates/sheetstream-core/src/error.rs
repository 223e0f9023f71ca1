//! Error types for sheetstream-core

use thiserror::Error;

use crate::consumer::ConsumerError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling and delivering rows.
///
/// `SkipSheet` and `AbortAll` are not errors; they travel as
/// [`ControlSignal`](crate::ControlSignal) values.
#[derive(Debug, Error)]
pub enum Error {
    /// A record or element could not be decoded into a valid cell or row
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The row consumer failed inside a callback
    #[error("Row consumer failed: {0}")]
    Consumer(#[source] ConsumerError),
}

impl Error {
    /// Create a new malformed-event error with a message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedEvent(msg.into())
    }
}
