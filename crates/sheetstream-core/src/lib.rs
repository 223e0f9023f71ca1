//! # sheetstream-core
//!
//! Core types shared by the sheetstream readers.
//!
//! This crate provides the pieces both row readers are built from:
//! - [`Row`] - a dense, column-indexed row of optional text cells
//! - [`SheetDescriptor`] and [`Visibility`] - what a reader knows about a sheet
//! - [`SharedStrings`] - the index-to-text lookup loaded once per file
//! - [`ReadSession`] - per-read state and the row delivery plumbing
//! - [`RowConsumer`] - the callback protocol application code implements
//! - [`column_index`] - column letters (`"AB"`) to a 0-based index
//!
//! ## Example
//!
//! ```rust
//! use sheetstream_core::{ControlSignal, ReadSession, Row, RowConsumer};
//!
//! struct Printer;
//!
//! impl RowConsumer for Printer {
//!     fn should_skip_sheet(&mut self, sheet_name: &str, _session: &ReadSession) -> bool {
//!         sheet_name.starts_with('_')
//!     }
//!
//!     fn on_row(
//!         &mut self,
//!         row: &Row,
//!         row_number: u32,
//!         sheet_name: &str,
//!         _session: &ReadSession,
//!     ) -> sheetstream_core::ConsumerResult {
//!         println!("{sheet_name}!{row_number}: {:?}", row.cells());
//!         Ok(ControlSignal::Continue)
//!     }
//! }
//! ```

pub mod address;
pub mod consumer;
pub mod error;
pub mod row;
pub mod session;
pub mod sheet;
pub mod strings;

// Re-exports for convenience
pub use address::{check_column, column_index, column_index_checked, MAX_COLUMN};
pub use consumer::{
    CollectedRow, ConsumerError, ConsumerResult, RowCollector, RowConsumer, RowCounter, RowLimit,
    SheetFilter,
};
pub use error::{Error, Result};
pub use row::Row;
pub use session::{ControlSignal, ReadSession, ReadSummary};
pub use sheet::{SheetDescriptor, Visibility};
pub use strings::SharedStrings;
