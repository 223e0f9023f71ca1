//! E2E tests for the XLS reader: build .xls fixtures in memory (BIFF8 records
//! inside a compound file), stream them back with XlsReader, and assert on
//! the delivered rows.

mod common;

// Re-export common utilities for use in submodules
pub use common::*;
