//! # sheetstream-xlsx
//!
//! Streaming row reader for XLSX (Office Open XML) packages.
//!
//! The shared strings and the workbook manifest are loaded up front; each
//! worksheet part is then parsed element by element and its rows handed to
//! a [`RowConsumer`](sheetstream_core::RowConsumer) as soon as they close.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::{read_sheet_rows, read_shared_strings, ManifestSheet, XlsxReader};
