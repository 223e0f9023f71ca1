//! Read session state and the row delivery protocol
//!
//! Both readers drive a [`ReadSession`]: they announce sheets with
//! [`ReadSession::begin_sheet`], fill the row buffer, and hand finished rows
//! to the consumer with [`ReadSession::deliver_row`]. The session turns the
//! consumer's [`ControlSignal`] into the skipped/aborted flags the readers
//! consult, so the interrupt protocol lives in one place.

use crate::consumer::RowConsumer;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::sheet::SheetDescriptor;

/// What the consumer wants the reader to do after a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlSignal {
    /// Keep reading
    #[default]
    Continue,
    /// Abandon the rest of the current sheet, continue with the next one
    SkipSheet,
    /// Stop reading; the read still completes successfully
    AbortAll,
}

/// Outcome of a completed read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadSummary {
    /// Sheets announced to the session, hidden and skipped ones included
    pub sheets_visited: usize,
    /// Rows handed to the consumer
    pub rows_delivered: u64,
    /// Whether the consumer raised [`ControlSignal::AbortAll`]
    pub aborted: bool,
}

/// Mutable state of one read pass.
///
/// Consumers receive a shared reference to it in every callback and can
/// query where the reader currently is.
#[derive(Debug, Default)]
pub struct ReadSession {
    sheet_index: Option<usize>,
    sheet_name: String,
    row_number: u32,
    row: Row,
    sheet_skipped: bool,
    aborted: bool,
    rows_delivered: u64,
}

impl ReadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0-based index of the current sheet, `None` before the first sheet
    pub fn sheet_index(&self) -> Option<usize> {
        self.sheet_index
    }

    /// Name of the current sheet
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// 1-based number of the row being assembled or delivered
    pub fn row_number(&self) -> u32 {
        self.row_number
    }

    /// The row buffer
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Whether the rest of the current sheet is being skipped
    pub fn is_sheet_skipped(&self) -> bool {
        self.sheet_skipped
    }

    /// Whether the consumer aborted the whole read
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Rows delivered so far, across all sheets
    pub fn rows_delivered(&self) -> u64 {
        self.rows_delivered
    }

    /// Start a new sheet.
    ///
    /// Advances the sheet index and resets row tracking. Hidden and
    /// very-hidden sheets are skipped without asking the consumer; for any
    /// other sheet the consumer's skip predicate is called exactly once and
    /// its answer holds for the whole sheet.
    ///
    /// Returns `true` when the sheet's rows should be read.
    pub fn begin_sheet<C>(&mut self, sheet: &SheetDescriptor, consumer: &mut C) -> bool
    where
        C: RowConsumer + ?Sized,
    {
        self.sheet_index = Some(self.sheet_index.map_or(0, |i| i + 1));
        self.sheet_name.clone_from(&sheet.name);
        self.row_number = 0;
        self.row.clear();

        let skipped = if sheet.visibility.is_hidden() {
            log::debug!("skipping {} sheet '{}'", sheet.visibility, sheet.name);
            true
        } else {
            let skip = consumer.should_skip_sheet(&sheet.name, self);
            if skip {
                log::debug!("consumer skipped sheet '{}'", sheet.name);
            }
            skip
        };
        self.sheet_skipped = skipped;

        !skipped
    }

    /// Finish the current sheet, discarding anything left in the buffer
    pub fn end_sheet(&mut self) {
        self.row.clear();
    }

    /// Set the 1-based number of the row being assembled
    pub fn set_row_number(&mut self, row_number: u32) {
        self.row_number = row_number;
    }

    /// Store a cell in the row buffer
    pub fn set_cell(&mut self, col: u32, text: impl Into<String>) {
        self.row.set(col, text);
    }

    /// Clear the row buffer
    pub fn clear_row(&mut self) {
        self.row.clear();
    }

    /// Hand the buffered row to the consumer and clear the buffer.
    ///
    /// Nothing is delivered while the sheet is skipped or the read aborted;
    /// the corresponding signal is returned instead. A consumer error is
    /// returned as [`Error::Consumer`] and ends the read.
    pub fn deliver_row<C>(&mut self, consumer: &mut C) -> Result<ControlSignal>
    where
        C: RowConsumer + ?Sized,
    {
        if self.aborted {
            self.row.clear();
            return Ok(ControlSignal::AbortAll);
        }
        if self.sheet_skipped {
            self.row.clear();
            return Ok(ControlSignal::SkipSheet);
        }

        log::trace!(
            "delivering row {} of '{}' ({} cells)",
            self.row_number,
            self.sheet_name,
            self.row.len()
        );
        let signal = consumer
            .on_row(&self.row, self.row_number, &self.sheet_name, self)
            .map_err(Error::Consumer)?;
        self.rows_delivered += 1;
        self.row.clear();

        match signal {
            ControlSignal::Continue => {}
            ControlSignal::SkipSheet => {
                log::debug!(
                    "consumer skipped the rest of sheet '{}' after row {}",
                    self.sheet_name,
                    self.row_number
                );
                self.sheet_skipped = true;
            }
            ControlSignal::AbortAll => {
                log::debug!(
                    "consumer aborted the read at row {} of sheet '{}'",
                    self.row_number,
                    self.sheet_name
                );
                self.aborted = true;
            }
        }
        Ok(signal)
    }

    /// Summarize the read
    pub fn summary(&self) -> ReadSummary {
        ReadSummary {
            sheets_visited: self.sheet_index.map_or(0, |i| i + 1),
            rows_delivered: self.rows_delivered,
            aborted: self.aborted,
        }
    }
}
