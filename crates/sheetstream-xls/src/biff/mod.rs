//! BIFF8 (Binary Interchange File Format) handling.
//!
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//!
//! CONTINUE records (type 0x003C) extend the body of the preceding record
//! beyond the 8224-byte per-record limit. [`RecordReader`] merges them while
//! remembering where each continuation started, because strings that cross
//! a continuation carry an extra flags byte at the boundary.

pub mod events;
pub mod parser;
pub mod records;
pub mod strings;

use std::io::{ErrorKind, Read};

use crate::error::{XlsError, XlsResult};

/// A single BIFF8 record (with CONTINUE bodies already merged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiffRecord {
    /// Record type ID (e.g. `records::SST`, `records::NUMBER`).
    pub record_type: u16,
    /// Record body bytes (CONTINUE records have been concatenated).
    pub data: Vec<u8>,
    /// Byte offset of this record's header in the stream.
    pub stream_offset: u64,
    /// Offsets into `data` where each merged CONTINUE body starts.
    pub continuations: Vec<usize>,
}

/// Record header and body as found in the stream, before merging.
struct RawRecord {
    record_type: u16,
    body: Vec<u8>,
    stream_offset: u64,
}

/// Reads BIFF8 records one at a time from a byte stream.
///
/// Only one record of lookahead is buffered (needed to find the CONTINUE
/// records belonging to the current one), so arbitrarily large streams are
/// read in constant memory apart from the records themselves.
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    lookahead: Option<RawRecord>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            lookahead: None,
        }
    }

    /// Read the next record, merging any CONTINUE records that follow it.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    pub fn next_record(&mut self) -> XlsResult<Option<BiffRecord>> {
        let first = loop {
            let raw = match self.lookahead.take() {
                Some(raw) => raw,
                None => match self.read_raw()? {
                    Some(raw) => raw,
                    None => return Ok(None),
                },
            };
            if raw.record_type == records::CONTINUE {
                log::warn!(
                    "dropping orphaned CONTINUE record at offset {}",
                    raw.stream_offset
                );
                continue;
            }
            break raw;
        };

        let mut record = BiffRecord {
            record_type: first.record_type,
            data: first.body,
            stream_offset: first.stream_offset,
            continuations: Vec::new(),
        };

        while let Some(raw) = self.read_raw()? {
            if raw.record_type != records::CONTINUE {
                self.lookahead = Some(raw);
                break;
            }
            record.continuations.push(record.data.len());
            record.data.extend_from_slice(&raw.body);
        }

        Ok(Some(record))
    }

    fn read_raw(&mut self) -> XlsResult<Option<RawRecord>> {
        let stream_offset = self.offset;
        let mut header = [0u8; 4];

        // A stream that ends inside a header is treated like a clean end;
        // some writers pad the Workbook stream after the last EOF.
        match self.inner.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(XlsError::Io(e)),
        }

        let record_type = u16::from_le_bytes([header[0], header[1]]);
        let body_len = u16::from_le_bytes([header[2], header[3]]) as usize;

        let mut body = vec![0u8; body_len];
        match self.inner.read_exact(&mut body) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(XlsError::malformed(format!(
                    "record 0x{record_type:04X} at offset {stream_offset} is truncated \
                     (declared {body_len} bytes)"
                )));
            }
            Err(e) => return Err(XlsError::Io(e)),
        }

        self.offset += 4 + body_len as u64;
        Ok(Some(RawRecord {
            record_type,
            body,
            stream_offset,
        }))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = XlsResult<BiffRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
