//! Row consumer protocol and stock consumers
//!
//! A [`RowConsumer`] is the application side of a read: it decides which
//! sheets to read and receives every completed row. Consumers steer the
//! reader by returning a [`ControlSignal`] from [`RowConsumer::on_row`];
//! any `Err` ends the read as a failure.

use std::collections::HashSet;

use crate::row::Row;
use crate::session::{ControlSignal, ReadSession};

/// Error type a consumer may fail with
pub type ConsumerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of [`RowConsumer::on_row`]
pub type ConsumerResult = std::result::Result<ControlSignal, ConsumerError>;

/// Receives rows from a reader.
///
/// Callbacks run synchronously on the reading thread, in row order, and are
/// never invoked concurrently.
pub trait RowConsumer {
    /// Called once for every visible sheet, before its first row.
    ///
    /// Return `true` to skip the sheet. Hidden sheets are skipped without
    /// calling this.
    fn should_skip_sheet(&mut self, sheet_name: &str, session: &ReadSession) -> bool;

    /// Called once per completed row.
    ///
    /// `row_number` is 1-based, as displayed by spreadsheet applications.
    fn on_row(
        &mut self,
        row: &Row,
        row_number: u32,
        sheet_name: &str,
        session: &ReadSession,
    ) -> ConsumerResult;
}

impl<C: RowConsumer + ?Sized> RowConsumer for &mut C {
    fn should_skip_sheet(&mut self, sheet_name: &str, session: &ReadSession) -> bool {
        (**self).should_skip_sheet(sheet_name, session)
    }

    fn on_row(
        &mut self,
        row: &Row,
        row_number: u32,
        sheet_name: &str,
        session: &ReadSession,
    ) -> ConsumerResult {
        (**self).on_row(row, row_number, sheet_name, session)
    }
}

/// A row captured by [`RowCollector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedRow {
    /// Name of the sheet the row came from
    pub sheet: String,
    /// 1-based row number
    pub row_number: u32,
    /// Cells in column order
    pub cells: Vec<Option<String>>,
}

/// Collects every row it receives. Never skips a sheet.
#[derive(Debug, Clone, Default)]
pub struct RowCollector {
    rows: Vec<CollectedRow>,
}

impl RowCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows received so far
    pub fn rows(&self) -> &[CollectedRow] {
        &self.rows
    }

    /// Rows received from the sheet named `sheet`
    pub fn rows_for<'a>(&'a self, sheet: &'a str) -> impl Iterator<Item = &'a CollectedRow> + 'a {
        self.rows.iter().filter(move |r| r.sheet == sheet)
    }

    pub fn into_rows(self) -> Vec<CollectedRow> {
        self.rows
    }
}

impl RowConsumer for RowCollector {
    fn should_skip_sheet(&mut self, _sheet_name: &str, _session: &ReadSession) -> bool {
        false
    }

    fn on_row(
        &mut self,
        row: &Row,
        row_number: u32,
        sheet_name: &str,
        _session: &ReadSession,
    ) -> ConsumerResult {
        self.rows.push(CollectedRow {
            sheet: sheet_name.to_string(),
            row_number,
            cells: row.cells().to_vec(),
        });
        Ok(ControlSignal::Continue)
    }
}

/// Counts rows per sheet without keeping them
#[derive(Debug, Clone, Default)]
pub struct RowCounter {
    counts: Vec<(String, u64)>,
}

impl RowCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows counted for `sheet`
    pub fn count_for(&self, sheet: &str) -> u64 {
        self.counts
            .iter()
            .filter(|(name, _)| name == sheet)
            .map(|(_, n)| n)
            .sum()
    }

    /// Rows counted across all sheets
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Per-sheet counts in the order sheets were read
    pub fn counts(&self) -> &[(String, u64)] {
        &self.counts
    }
}

impl RowConsumer for RowCounter {
    fn should_skip_sheet(&mut self, _sheet_name: &str, _session: &ReadSession) -> bool {
        false
    }

    fn on_row(
        &mut self,
        _row: &Row,
        _row_number: u32,
        sheet_name: &str,
        _session: &ReadSession,
    ) -> ConsumerResult {
        match self.counts.last_mut() {
            Some((name, n)) if name == sheet_name => *n += 1,
            _ => self.counts.push((sheet_name.to_string(), 1)),
        }
        Ok(ControlSignal::Continue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LimitScope {
    PerSheet,
    Total,
}

/// Stops reading after a number of rows.
///
/// With [`RowLimit::per_sheet`] the wrapped consumer sees at most `limit`
/// rows of each sheet; with [`RowLimit::total`] the whole read is aborted
/// once `limit` rows were delivered.
#[derive(Debug, Clone)]
pub struct RowLimit<C> {
    inner: C,
    limit: u64,
    scope: LimitScope,
    seen_in_sheet: u64,
    seen_total: u64,
}

impl<C: RowConsumer> RowLimit<C> {
    /// Skip the rest of each sheet after `limit` rows
    pub fn per_sheet(inner: C, limit: u64) -> Self {
        Self::with_scope(inner, limit, LimitScope::PerSheet)
    }

    /// Abort the read after `limit` rows in total
    pub fn total(inner: C, limit: u64) -> Self {
        Self::with_scope(inner, limit, LimitScope::Total)
    }

    fn with_scope(inner: C, limit: u64, scope: LimitScope) -> Self {
        Self {
            inner,
            limit,
            scope,
            seen_in_sheet: 0,
            seen_total: 0,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: RowConsumer> RowConsumer for RowLimit<C> {
    fn should_skip_sheet(&mut self, sheet_name: &str, session: &ReadSession) -> bool {
        self.seen_in_sheet = 0;
        // A zero limit can't be enforced from on_row, the first row would
        // already have been delivered.
        let exhausted = match self.scope {
            LimitScope::PerSheet => self.limit == 0,
            LimitScope::Total => self.seen_total >= self.limit,
        };
        exhausted || self.inner.should_skip_sheet(sheet_name, session)
    }

    fn on_row(
        &mut self,
        row: &Row,
        row_number: u32,
        sheet_name: &str,
        session: &ReadSession,
    ) -> ConsumerResult {
        let signal = self.inner.on_row(row, row_number, sheet_name, session)?;
        self.seen_in_sheet += 1;
        self.seen_total += 1;

        if signal != ControlSignal::Continue {
            return Ok(signal);
        }
        let signal = match self.scope {
            LimitScope::PerSheet if self.seen_in_sheet >= self.limit => ControlSignal::SkipSheet,
            LimitScope::Total if self.seen_total >= self.limit => ControlSignal::AbortAll,
            _ => ControlSignal::Continue,
        };
        Ok(signal)
    }
}

/// Reads only the named sheets
#[derive(Debug, Clone)]
pub struct SheetFilter<C> {
    inner: C,
    allowed: HashSet<String>,
}

impl<C: RowConsumer> SheetFilter<C> {
    pub fn new<I, S>(inner: C, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            allowed: sheets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: RowConsumer> RowConsumer for SheetFilter<C> {
    fn should_skip_sheet(&mut self, sheet_name: &str, session: &ReadSession) -> bool {
        !self.allowed.contains(sheet_name) || self.inner.should_skip_sheet(sheet_name, session)
    }

    fn on_row(
        &mut self,
        row: &Row,
        row_number: u32,
        sheet_name: &str,
        session: &ReadSession,
    ) -> ConsumerResult {
        self.inner.on_row(row, row_number, sheet_name, session)
    }
}
