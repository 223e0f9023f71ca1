//! # sheetstream
//!
//! Stream the rows of large XLS and XLSX spreadsheets without loading the
//! workbook into memory.
//!
//! The format is sniffed from the leading bytes of the input, the matching
//! reader is chosen, and every row of every visible sheet is pushed to a
//! [`RowConsumer`] as a dense list of optional text cells. The consumer
//! decides which sheets to read and can skip the rest of a sheet or stop
//! the whole read from any row.
//!
//! ## Features
//!
//! - `xls` (default): legacy BIFF8 workbooks in a compound file
//! - `xlsx` (default): Office Open XML packages
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetstream::prelude::*;
//!
//! let mut reader = SpreadsheetReader::open_file("import.xlsx")?;
//! let mut rows = RowLimit::per_sheet(RowCollector::new(), 1000);
//! let summary = reader.read_rows(&mut rows)?;
//!
//! for row in rows.inner().rows() {
//!     println!("{}!{}: {:?}", row.sheet, row.row_number, row.cells);
//! }
//! println!("{} rows from {} sheets", summary.rows_delivered, summary.sheets_visited);
//! # Ok::<(), sheetstream::Error>(())
//! ```

pub mod detect;
pub mod error;
pub mod prelude;
pub mod reader;

pub use detect::{detect, detect_bytes, Format};
pub use error::{Error, Result};
pub use reader::SpreadsheetReader;

// Re-export core types
pub use sheetstream_core::{
    column_index, CollectedRow, ConsumerError, ConsumerResult, ControlSignal, ReadSession,
    ReadSummary, Row, RowCollector, RowConsumer, RowCounter, RowLimit, SharedStrings,
    SheetDescriptor, SheetFilter, Visibility,
};

// Re-export I/O types
#[cfg(feature = "xls")]
pub use sheetstream_xls::{XlsError, XlsReader};
#[cfg(feature = "xlsx")]
pub use sheetstream_xlsx::{XlsxError, XlsxReader};
