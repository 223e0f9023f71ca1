//! Decoding BIFF8 records into row-reader events.
//!
//! Only the records that matter for row reconstruction produce events.
//! Multi-cell records (MULRK, MULBLANK) are expanded into one event per
//! column, and RK numbers are widened to plain numbers, so the row reader
//! sees a single kind of event per cell type.

use std::collections::VecDeque;
use std::io::Read;

use sheetstream_core::{SharedStrings, Visibility};

use super::parser::ByteReader;
use super::records;
use super::strings::{parse_sst, read_short_string, read_unicode_string};
use super::{BiffRecord, RecordReader};
use crate::error::{XlsError, XlsResult};

/// Sheet metadata from a BOUNDSHEET record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSheet {
    /// Stream offset of the sheet's BOF record
    pub offset: u32,
    pub visibility: Visibility,
    /// Sheet type: 0 = worksheet/dialog, 2 = chart, 6 = macro/VBA
    pub sheet_type: u8,
    pub name: String,
}

/// Cached result of a FORMULA record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormulaResult {
    Number(f64),
    /// The text follows in a STRING record
    String,
    Boolean(bool),
    /// Excel error code (e.g. 0x07 = #DIV/0!)
    Error(u8),
    /// Empty string result, no STRING record follows
    Empty,
}

impl FormulaResult {
    /// Decode the 8-byte result field of a FORMULA record.
    ///
    /// Non-numeric results are flagged by `0xFFFF` in the two high bytes,
    /// with the result type in the first byte.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        if bytes[6] != 0xFF || bytes[7] != 0xFF {
            return FormulaResult::Number(f64::from_le_bytes(bytes));
        }
        match bytes[0] {
            0x00 => FormulaResult::String,
            0x01 => FormulaResult::Boolean(bytes[2] != 0),
            0x02 => FormulaResult::Error(bytes[2]),
            _ => FormulaResult::Empty,
        }
    }
}

/// A decoded record, as consumed by the row reader.
#[derive(Debug, Clone, PartialEq)]
pub enum BiffEvent {
    /// Start of a substream
    Bof {
        version: u16,
        substream: u16,
        /// Stream offset of the BOF record
        offset: u64,
    },
    /// End of a substream
    Eof,
    BoundSheet(BoundSheet),
    SharedStrings(SharedStrings),
    Blank {
        row: u32,
        col: u32,
    },
    /// Boolean cell, or error cell when `value` is `None`
    BoolErr {
        row: u32,
        col: u32,
        value: Option<bool>,
    },
    Formula {
        row: u32,
        col: u32,
        result: FormulaResult,
    },
    /// Text result of the FORMULA immediately before it
    FormulaString(String),
    Label {
        row: u32,
        col: u32,
        text: String,
    },
    LabelSst {
        row: u32,
        col: u32,
        index: usize,
    },
    Number {
        row: u32,
        col: u32,
        value: f64,
    },
}

/// Decode one record, appending its events to `out`.
///
/// Records that carry nothing the row reader needs produce no events.
pub fn decode_record(record: &BiffRecord, out: &mut VecDeque<BiffEvent>) -> XlsResult<()> {
    let mut r = ByteReader::with_continuations(&record.data, &record.continuations);

    match record.record_type {
        records::BOF => {
            let version = r.u16()?;
            let substream = r.u16()?;
            out.push_back(BiffEvent::Bof {
                version,
                substream,
                offset: record.stream_offset,
            });
        }
        records::EOF => out.push_back(BiffEvent::Eof),
        records::BOUNDSHEET => {
            let offset = r.u32()?;
            let visibility = Visibility::from_biff(r.u8()?);
            let sheet_type = r.u8()?;
            let name = read_short_string(&mut r)?;
            out.push_back(BiffEvent::BoundSheet(BoundSheet {
                offset,
                visibility,
                sheet_type,
                name,
            }));
        }
        records::SST => {
            let table = parse_sst(&record.data, &record.continuations)?;
            out.push_back(BiffEvent::SharedStrings(table));
        }
        records::BLANK => {
            let (row, col) = cell_header(&mut r)?;
            out.push_back(BiffEvent::Blank { row, col });
        }
        records::MULBLANK => {
            let (row, first_col, last_col) = multi_cell_header(&record.data, 2)?;
            r.skip(4)?;
            for col in first_col..=last_col {
                r.skip(2)?; // xf
                out.push_back(BiffEvent::Blank { row, col });
            }
        }
        records::BOOLERR => {
            let (row, col) = cell_header(&mut r)?;
            let value = r.u8()?;
            let is_error = r.u8()? != 0;
            out.push_back(BiffEvent::BoolErr {
                row,
                col,
                value: (!is_error).then_some(value != 0),
            });
        }
        records::FORMULA => {
            let (row, col) = cell_header(&mut r)?;
            let result = FormulaResult::from_bytes(r.array8()?);
            // options(2) + reserved(4) + parsed expression follow
            r.skip(6)?;
            out.push_back(BiffEvent::Formula { row, col, result });
        }
        records::STRING => {
            let text = read_unicode_string(&mut r)?;
            out.push_back(BiffEvent::FormulaString(text));
        }
        records::LABEL | records::RSTRING => {
            let (row, col) = cell_header(&mut r)?;
            let text = read_unicode_string(&mut r)?;
            out.push_back(BiffEvent::Label { row, col, text });
        }
        records::LABELSST => {
            let (row, col) = cell_header(&mut r)?;
            let index = r.u32()? as usize;
            out.push_back(BiffEvent::LabelSst { row, col, index });
        }
        records::NUMBER => {
            let (row, col) = cell_header(&mut r)?;
            let value = r.f64()?;
            out.push_back(BiffEvent::Number { row, col, value });
        }
        records::RK => {
            let (row, col) = cell_header(&mut r)?;
            let value = r.rk()?;
            out.push_back(BiffEvent::Number { row, col, value });
        }
        records::MULRK => {
            let (row, first_col, last_col) = multi_cell_header(&record.data, 6)?;
            r.skip(4)?;
            for col in first_col..=last_col {
                r.skip(2)?; // xf
                let value = r.rk()?;
                out.push_back(BiffEvent::Number { row, col, value });
            }
        }
        _ => {}
    }

    Ok(())
}

/// row(2) + col(2) + xf(2), common to all single-cell records
fn cell_header(r: &mut ByteReader<'_>) -> XlsResult<(u32, u32)> {
    let row = r.u16()? as u32;
    let col = r.u16()? as u32;
    r.skip(2)?;
    Ok((row, col))
}

/// row(2) + first_col(2) + [entry]* + last_col(2), with the body length
/// checked against the column span.
fn multi_cell_header(data: &[u8], entry_size: usize) -> XlsResult<(u32, u32, u32)> {
    let mut r = ByteReader::new(data);
    let row = r.u16()? as u32;
    let first_col = r.u16()? as u32;

    if data.len() < 6 {
        return Err(XlsError::malformed("multi-cell record too short"));
    }
    let last_col = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]) as u32;

    let span = last_col
        .checked_sub(first_col)
        .map(|n| n as usize + 1)
        .ok_or_else(|| {
            XlsError::malformed(format!(
                "multi-cell record columns reversed ({first_col} > {last_col})"
            ))
        })?;
    if data.len() != 6 + span * entry_size {
        return Err(XlsError::malformed(format!(
            "multi-cell record of {} bytes does not hold {span} cells",
            data.len()
        )));
    }

    Ok((row, first_col, last_col))
}

/// Streams [`BiffEvent`]s out of a BIFF8 byte stream.
pub struct BiffEvents<R> {
    records: RecordReader<R>,
    queue: VecDeque<BiffEvent>,
}

impl<R: Read> BiffEvents<R> {
    pub fn new(inner: R) -> Self {
        Self {
            records: RecordReader::new(inner),
            queue: VecDeque::new(),
        }
    }
}

impl<R: Read> Iterator for BiffEvents<R> {
    type Item = XlsResult<BiffEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(Ok(event));
            }
            let record = match self.records.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };
            if let Err(e) = decode_record(&record, &mut self.queue) {
                return Some(Err(e));
            }
        }
    }
}
