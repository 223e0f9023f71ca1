//! Prelude module - common imports for sheetstream users
//!
//! ```rust
//! use sheetstream::prelude::*;
//! ```

// Main types
pub use crate::{Format, ReadSession, ReadSummary, Row, SpreadsheetReader};

// Consumer protocol
pub use crate::{ConsumerResult, ControlSignal, RowConsumer};

// Stock consumers
pub use crate::{CollectedRow, RowCollector, RowCounter, RowLimit, SheetFilter};

// Error types
pub use crate::{Error, Result};
