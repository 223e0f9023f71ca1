//! # sheetstream-xls
//!
//! Streaming row reader for the legacy Excel binary format (.xls).
//!
//! The `Workbook` stream of the compound file is read one BIFF8 record at a
//! time, decoded into [`BiffEvent`]s and fed to a row state machine that
//! rebuilds rows and hands them to a [`RowConsumer`](sheetstream_core::RowConsumer).

pub mod biff;
pub mod error;
pub mod reader;

pub use biff::events::{BiffEvent, BiffEvents, BoundSheet, FormulaResult};
pub use error::{XlsError, XlsResult};
pub use reader::{read_rows, XlsReader};
