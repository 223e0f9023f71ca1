//! Common utilities for XLS E2E tests.
//!
//! `WorkbookBuilder` writes a minimal BIFF8 workbook stream: a globals
//! substream with BOUNDSHEET and SST records, then one worksheet substream
//! per sheet. BOUNDSHEET offsets are patched once the sheet BOFs are placed.

use std::io::{Cursor, Write};

use sheetstream_core::{CollectedRow, RowCollector};
use sheetstream_xls::XlsReader;

pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;
pub const BOUNDSHEET: u16 = 0x0085;
pub const SST: u16 = 0x00FC;
pub const LABELSST: u16 = 0x00FD;
pub const LABEL: u16 = 0x0204;
pub const NUMBER: u16 = 0x0203;
pub const RK: u16 = 0x027E;
pub const MULRK: u16 = 0x00BD;
pub const BLANK: u16 = 0x0201;
pub const MULBLANK: u16 = 0x00BE;
pub const BOOLERR: u16 = 0x0205;
pub const FORMULA: u16 = 0x0006;
pub const STRING: u16 = 0x0207;

pub const VISIBLE: u8 = 0;
pub const HIDDEN: u8 = 1;
pub const VERY_HIDDEN: u8 = 2;

pub fn record(out: &mut Vec<u8>, record_type: u16, body: &[u8]) {
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
}

pub fn bof_body(version: u16, substream: u16) -> Vec<u8> {
    let mut body = Vec::with_capacity(16);
    body.extend_from_slice(&version.to_le_bytes());
    body.extend_from_slice(&substream.to_le_bytes());
    body.extend_from_slice(&[0; 12]);
    body
}

/// A compressed (Latin-1) string with a 2-byte length prefix
pub fn unicode_string(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(text.len() as u16).to_le_bytes());
    out.push(0x00);
    out.extend_from_slice(text.as_bytes());
    out
}

fn cell(row: u16, col: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&row.to_le_bytes());
    body.extend_from_slice(&col.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // xf
    body
}

pub fn rk_int(value: i32) -> u32 {
    ((value << 2) as u32) | 0x02
}

/// One worksheet and its cell records
pub struct SheetFixture {
    name: String,
    visibility: u8,
    records: Vec<(u16, Vec<u8>)>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visibility: VISIBLE,
            records: Vec::new(),
        }
    }

    pub fn visibility(mut self, visibility: u8) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn raw(mut self, record_type: u16, body: Vec<u8>) -> Self {
        self.records.push((record_type, body));
        self
    }

    pub fn number(self, row: u16, col: u16, value: f64) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&value.to_le_bytes());
        self.raw(NUMBER, body)
    }

    pub fn rk(self, row: u16, col: u16, rk: u32) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&rk.to_le_bytes());
        self.raw(RK, body)
    }

    pub fn mulrk(self, row: u16, first_col: u16, values: &[i32]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&row.to_le_bytes());
        body.extend_from_slice(&first_col.to_le_bytes());
        for &v in values {
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&rk_int(v).to_le_bytes());
        }
        let last_col = first_col + values.len() as u16 - 1;
        body.extend_from_slice(&last_col.to_le_bytes());
        self.raw(MULRK, body)
    }

    pub fn label_sst(self, row: u16, col: u16, index: u32) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&index.to_le_bytes());
        self.raw(LABELSST, body)
    }

    pub fn label(self, row: u16, col: u16, text: &str) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&unicode_string(text));
        self.raw(LABEL, body)
    }

    pub fn blank(self, row: u16, col: u16) -> Self {
        self.raw(BLANK, cell(row, col))
    }

    pub fn mulblank(self, row: u16, first_col: u16, last_col: u16) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&row.to_le_bytes());
        body.extend_from_slice(&first_col.to_le_bytes());
        for _ in first_col..=last_col {
            body.extend_from_slice(&0u16.to_le_bytes());
        }
        body.extend_from_slice(&last_col.to_le_bytes());
        self.raw(MULBLANK, body)
    }

    pub fn boolean(self, row: u16, col: u16, value: bool) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&[u8::from(value), 0]);
        self.raw(BOOLERR, body)
    }

    pub fn error(self, row: u16, col: u16, code: u8) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&[code, 1]);
        self.raw(BOOLERR, body)
    }

    fn formula(self, row: u16, col: u16, result: [u8; 8]) -> Self {
        let mut body = cell(row, col);
        body.extend_from_slice(&result);
        body.extend_from_slice(&[0; 6]); // options + reserved
        body.extend_from_slice(&[0x03, 0x00, 0x1E, 0x01, 0x00]); // =1
        self.raw(FORMULA, body)
    }

    pub fn formula_number(self, row: u16, col: u16, value: f64) -> Self {
        self.formula(row, col, value.to_le_bytes())
    }

    /// A string-valued formula followed by its STRING record
    pub fn formula_text(self, row: u16, col: u16, text: &str) -> Self {
        self.formula(row, col, [0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF])
            .raw(STRING, unicode_string(text))
    }

    /// A string-valued formula whose STRING record never arrives
    pub fn formula_text_missing(self, row: u16, col: u16) -> Self {
        self.formula(row, col, [0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF])
    }
}

#[derive(Default)]
pub struct WorkbookBuilder {
    version: Option<u16>,
    shared_strings: Vec<String>,
    sheets: Vec<SheetFixture>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn sheet(mut self, sheet: SheetFixture) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// The raw `Workbook` stream
    pub fn stream(&self) -> Vec<u8> {
        let version = self.version.unwrap_or(0x0600);
        let mut out = Vec::new();
        record(&mut out, BOF, &bof_body(version, 0x0005));

        let mut offset_slots = Vec::new();
        for sheet in &self.sheets {
            offset_slots.push(out.len() + 4);
            let mut body = Vec::new();
            body.extend_from_slice(&0u32.to_le_bytes());
            body.push(sheet.visibility);
            body.push(0x00);
            body.push(sheet.name.len() as u8);
            body.push(0x00);
            body.extend_from_slice(sheet.name.as_bytes());
            record(&mut out, BOUNDSHEET, &body);
        }

        if !self.shared_strings.is_empty() {
            let count = self.shared_strings.len() as u32;
            let mut body = Vec::new();
            body.extend_from_slice(&count.to_le_bytes());
            body.extend_from_slice(&count.to_le_bytes());
            for s in &self.shared_strings {
                body.extend_from_slice(&unicode_string(s));
            }
            record(&mut out, SST, &body);
        }
        record(&mut out, EOF, &[]);

        for (sheet, slot) in self.sheets.iter().zip(offset_slots) {
            let offset = out.len() as u32;
            out[slot..slot + 4].copy_from_slice(&offset.to_le_bytes());

            record(&mut out, BOF, &bof_body(0x0600, 0x0010));
            for (record_type, body) in &sheet.records {
                record(&mut out, *record_type, body);
            }
            record(&mut out, EOF, &[]);
        }
        out
    }

    /// The workbook wrapped in a compound file
    pub fn build(&self) -> Vec<u8> {
        compound_file("/Workbook", &self.stream())
    }
}

/// A compound file holding a single stream
pub fn compound_file(stream_name: &str, data: &[u8]) -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut stream = comp.create_stream(stream_name).unwrap();
        stream.write_all(data).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}

/// Read every row of `bytes` with a collector
pub fn collect_rows(bytes: Vec<u8>) -> Vec<CollectedRow> {
    let mut reader = XlsReader::new(Cursor::new(bytes)).unwrap();
    let mut collector = RowCollector::new();
    reader.read_rows(&mut collector).unwrap();
    collector.into_rows()
}

pub fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}
