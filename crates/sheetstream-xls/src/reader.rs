//! XLS (BIFF8) row reader.
//!
//! [`XlsReader`] opens a Compound File Binary (CFB/OLE2) container and
//! streams its `Workbook` stream through [`read_rows`], the state machine
//! that turns [`BiffEvent`]s back into rows:
//!
//! ```text
//! Idle ──BOF(worksheet)──▶ InSheet{read|skipped} ──EOF──▶ Idle ──▶ … ──▶ Done
//! ```
//!
//! Cells of one row arrive as consecutive records, so a row is complete as
//! soon as a cell of a different row (or the sheet's EOF) shows up.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use sheetstream_core::{
    ControlSignal, ReadSession, ReadSummary, RowConsumer, SharedStrings, SheetDescriptor,
};

use crate::biff::events::{BiffEvent, BiffEvents, BoundSheet, FormulaResult};
use crate::biff::records;
use crate::error::{XlsError, XlsResult};

/// XLS file reader.
pub struct XlsReader<R> {
    cfb: cfb::CompoundFile<R>,
    stream_path: &'static str,
}

impl XlsReader<BufReader<File>> {
    /// Open an XLS file from a filesystem path.
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsReader<R> {
    /// Open an XLS container from any `Read + Seek` source.
    pub fn new(reader: R) -> XlsResult<Self> {
        let cfb = cfb::CompoundFile::open(reader)?;

        // Some files use "Book" (BIFF5) instead of "Workbook"
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        Ok(Self { cfb, stream_path })
    }

    /// Stream every row of every readable sheet to `consumer`.
    pub fn read_rows<C>(&mut self, consumer: &mut C) -> XlsResult<ReadSummary>
    where
        C: RowConsumer + ?Sized,
    {
        let stream = self.cfb.open_stream(self.stream_path)?;
        read_rows(BiffEvents::new(BufReader::new(stream)), consumer)
    }

    /// Give back the underlying source.
    pub fn into_inner(self) -> R {
        self.cfb.into_inner()
    }
}

/// Rebuild rows from a stream of BIFF8 events and deliver them to `consumer`.
///
/// Returns normally when the stream ends, when the last worksheet ends, or
/// when the consumer raises [`ControlSignal::AbortAll`].
pub fn read_rows<I, C>(events: I, consumer: &mut C) -> XlsResult<ReadSummary>
where
    I: IntoIterator<Item = XlsResult<BiffEvent>>,
    C: RowConsumer + ?Sized,
{
    let mut reader = LegacyRowReader::default();
    for event in events {
        if reader.handle(event?, consumer)? == Flow::Stop {
            break;
        }
    }
    reader.finish();
    Ok(reader.session.summary())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// A FORMULA cell waiting for the STRING record that carries its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingFormula {
    row: u32,
    col: u32,
}

/// A worksheet descriptor placed in stream order
#[derive(Debug)]
struct OrderedSheet {
    offset: u32,
    descriptor: SheetDescriptor,
}

#[derive(Debug, Default)]
struct LegacyRowReader {
    session: ReadSession,
    strings: SharedStrings,
    /// BOUNDSHEET records in arrival order
    announced: Vec<BoundSheet>,
    /// Worksheets sorted by BOF offset, built at the first worksheet BOF
    ordered: Option<Vec<OrderedSheet>>,
    worksheets_started: usize,
    /// Open substreams (BOF types), innermost last
    substreams: Vec<u16>,
    last_row: Option<u32>,
    pending_formula: Option<PendingFormula>,
}

impl LegacyRowReader {
    fn handle<C>(&mut self, event: BiffEvent, consumer: &mut C) -> XlsResult<Flow>
    where
        C: RowConsumer + ?Sized,
    {
        // The pending slot only survives until the very next event
        let pending = self.pending_formula.take();

        let (row, col, text) = match event {
            BiffEvent::BoundSheet(sheet) => {
                if self.ordered.is_some() {
                    log::warn!("ignoring BOUNDSHEET '{}' after the first sheet", sheet.name);
                } else {
                    self.announced.push(sheet);
                }
                return Ok(Flow::Continue);
            }
            BiffEvent::SharedStrings(table) => {
                log::debug!("loaded {} shared strings", table.len());
                self.strings = table;
                return Ok(Flow::Continue);
            }
            BiffEvent::Bof {
                version,
                substream,
                offset,
            } => return self.begin_substream(version, substream, offset, consumer),
            BiffEvent::Eof => return self.end_substream(consumer),

            BiffEvent::Blank { row, col } => (row, col, Some(String::new())),
            BiffEvent::BoolErr { row, col, value } => {
                (row, col, Some(value.map(|b| b.to_string()).unwrap_or_default()))
            }
            BiffEvent::Formula { row, col, result } => match result {
                FormulaResult::Number(value) => (row, col, Some(value.to_string())),
                _ => {
                    self.pending_formula = Some(PendingFormula { row, col });
                    (row, col, None)
                }
            },
            BiffEvent::FormulaString(text) => match pending {
                Some(PendingFormula { row, col }) => (row, col, Some(text)),
                None => {
                    log::warn!("STRING record without a preceding string FORMULA");
                    return Ok(Flow::Continue);
                }
            },
            BiffEvent::Label { row, col, text } => (row, col, Some(text.trim().to_string())),
            BiffEvent::LabelSst { row, col, index } => {
                (row, col, Some(self.strings.resolve(index).trim().to_string()))
            }
            BiffEvent::Number { row, col, value } => (row, col, Some(value.to_string())),
        };

        self.absorb(row, col, text, consumer)
    }

    /// Add a decoded cell to the row buffer, flushing the buffered row first
    /// when the cell belongs to a new row.
    ///
    /// `text` is `None` for a formula whose text is still pending: it takes
    /// part in row-change detection but stores nothing.
    fn absorb<C>(
        &mut self,
        row: u32,
        col: u32,
        text: Option<String>,
        consumer: &mut C,
    ) -> XlsResult<Flow>
    where
        C: RowConsumer + ?Sized,
    {
        if !self.in_worksheet() {
            return Ok(Flow::Continue);
        }

        if self.last_row != Some(row)
            && !self.session.row().is_empty()
            && self.flush(consumer)? == Flow::Stop
        {
            return Ok(Flow::Stop);
        }

        if let Some(text) = text {
            if !self.session.is_sheet_skipped() {
                self.session.set_cell(col, text);
            }
        }
        self.last_row = Some(row);
        self.session.set_row_number(row + 1);
        Ok(Flow::Continue)
    }

    fn flush<C>(&mut self, consumer: &mut C) -> XlsResult<Flow>
    where
        C: RowConsumer + ?Sized,
    {
        match self.session.deliver_row(consumer)? {
            ControlSignal::AbortAll => Ok(Flow::Stop),
            ControlSignal::Continue | ControlSignal::SkipSheet => Ok(Flow::Continue),
        }
    }

    fn in_worksheet(&self) -> bool {
        self.substreams.len() == 1 && self.substreams[0] == records::BOF_WORKSHEET
    }

    fn begin_substream<C>(
        &mut self,
        version: u16,
        substream: u16,
        offset: u64,
        consumer: &mut C,
    ) -> XlsResult<Flow>
    where
        C: RowConsumer + ?Sized,
    {
        self.substreams.push(substream);
        if self.substreams.len() > 1 {
            // Embedded chart or similar inside a sheet
            return Ok(Flow::Continue);
        }

        match substream {
            records::BOF_WORKBOOK_GLOBALS if version != records::BIFF8_VERSION => {
                Err(XlsError::UnsupportedVersion(format!(
                    "expected BIFF8 (0x0600), got 0x{version:04X}"
                )))
            }
            records::BOF_WORKSHEET => {
                let announced = &self.announced;
                let ordered = self.ordered.get_or_insert_with(|| order_worksheets(announced));
                let sheet = ordered.get(self.worksheets_started).ok_or_else(|| {
                    XlsError::malformed(format!(
                        "worksheet BOF at offset {offset} has no BOUNDSHEET record"
                    ))
                })?;
                if u64::from(sheet.offset) != offset {
                    log::warn!(
                        "sheet '{}' declared at offset {} but starts at {offset}",
                        sheet.descriptor.name,
                        sheet.offset
                    );
                }
                self.worksheets_started += 1;
                self.last_row = None;

                let read = self.session.begin_sheet(&sheet.descriptor, consumer);
                log::debug!(
                    "sheet {} '{}' {}",
                    sheet.descriptor.index,
                    sheet.descriptor.name,
                    if read { "started" } else { "skipped" }
                );
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Continue),
        }
    }

    fn end_substream<C>(&mut self, consumer: &mut C) -> XlsResult<Flow>
    where
        C: RowConsumer + ?Sized,
    {
        let finished = match self.substreams.pop() {
            Some(substream) => substream,
            None => {
                log::warn!("EOF record without a matching BOF");
                return Ok(Flow::Continue);
            }
        };
        if !self.substreams.is_empty() {
            return Ok(Flow::Continue);
        }

        match finished {
            records::BOF_WORKSHEET => {
                let flow = if self.session.row().is_empty() {
                    Flow::Continue
                } else {
                    self.flush(consumer)?
                };
                self.last_row = None;
                self.session.end_sheet();

                let remaining = self
                    .ordered
                    .as_ref()
                    .map_or(0, |o| o.len() - self.worksheets_started);
                if flow == Flow::Stop || remaining == 0 {
                    return Ok(Flow::Stop);
                }
                Ok(Flow::Continue)
            }
            records::BOF_WORKBOOK_GLOBALS => {
                let announced = &self.announced;
                let ordered = self.ordered.get_or_insert_with(|| order_worksheets(announced));
                if ordered.is_empty() {
                    log::debug!("workbook declares no worksheets");
                    return Ok(Flow::Stop);
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Continue),
        }
    }

    fn finish(&mut self) {
        if !self.session.is_aborted() && !self.substreams.is_empty() {
            log::warn!(
                "BIFF stream ended inside a substream; {} buffered cells dropped",
                self.session.row().len()
            );
        }
        self.session.end_sheet();
    }
}

/// Worksheet descriptors in the order their substreams appear.
///
/// BOUNDSHEET records carry the stream offset of each sheet's BOF; sorting
/// by it makes the N-th worksheet BOF match the N-th entry regardless of
/// the order the records were declared in. Charts and macro sheets never
/// get a worksheet BOF and are left out.
fn order_worksheets(announced: &[BoundSheet]) -> Vec<OrderedSheet> {
    let mut ordered: Vec<OrderedSheet> = announced
        .iter()
        .enumerate()
        .filter(|(_, sheet)| sheet.sheet_type == records::SHEET_TYPE_WORKSHEET)
        .map(|(index, sheet)| OrderedSheet {
            offset: sheet.offset,
            descriptor: SheetDescriptor::new(sheet.name.clone(), index, sheet.visibility),
        })
        .collect();
    ordered.sort_by_key(|s| s.offset);
    ordered
}
