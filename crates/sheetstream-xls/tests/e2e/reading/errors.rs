//! Tests for rejected and damaged inputs.

use std::io::Cursor;

use crate::{compound_file, record, SheetFixture, WorkbookBuilder, BOF, EOF, SST};
use sheetstream_core::{ConsumerResult, ReadSession, Row, RowConsumer, RowCounter};
use sheetstream_xls::{XlsError, XlsReader};

#[test]
fn test_xls_not_a_compound_file() {
    let result = XlsReader::new(Cursor::new(b"definitely not ole2".to_vec()));
    assert!(matches!(result, Err(XlsError::Io(_))));
}

#[test]
fn test_xls_missing_workbook_stream() {
    let bytes = compound_file("/Other", b"data");
    let result = XlsReader::new(Cursor::new(bytes));
    assert!(matches!(result, Err(XlsError::InvalidFormat(_))));
}

#[test]
fn test_xls_book_stream_is_accepted() {
    let stream = WorkbookBuilder::new()
        .sheet(SheetFixture::new("S").number(0, 0, 1.0))
        .stream();
    let bytes = compound_file("/Book", &stream);

    let mut reader = XlsReader::new(Cursor::new(bytes)).unwrap();
    let mut counter = RowCounter::new();
    reader.read_rows(&mut counter).unwrap();
    assert_eq!(counter.total(), 1);
}

#[test]
fn test_xls_biff5_unsupported() {
    let bytes = WorkbookBuilder::new()
        .version(0x0500)
        .sheet(SheetFixture::new("S"))
        .build();

    let mut reader = XlsReader::new(Cursor::new(bytes)).unwrap();
    let result = reader.read_rows(&mut RowCounter::new());
    assert!(matches!(result, Err(XlsError::UnsupportedVersion(_))));
}

#[test]
fn test_xls_truncated_record_is_malformed() {
    let mut stream = WorkbookBuilder::new()
        .sheet(SheetFixture::new("S").number(0, 0, 1.0))
        .stream();
    // Drop the sheet EOF and half of the NUMBER record
    stream.truncate(stream.len() - 4 - 8);
    let bytes = compound_file("/Workbook", &stream);

    let mut reader = XlsReader::new(Cursor::new(bytes)).unwrap();
    let result = reader.read_rows(&mut RowCounter::new());
    assert!(matches!(result, Err(XlsError::Malformed(_))));
}

#[test]
fn test_xls_sst_continue_record() {
    // Globals with an SST whose second string is split by a CONTINUE
    // record that switches to UTF-16
    let mut stream = Vec::new();
    record(&mut stream, BOF, &crate::bof_body(0x0600, 0x0005));
    let boundsheet_at = stream.len() + 4;
    record(&mut stream, 0x0085, &[0, 0, 0, 0, 0, 0, 1, 0, b'S']);

    let mut sst = Vec::new();
    sst.extend_from_slice(&2u32.to_le_bytes());
    sst.extend_from_slice(&2u32.to_le_bytes());
    sst.extend_from_slice(&[0x01, 0x00, 0x00, b'a']);
    sst.extend_from_slice(&[0x04, 0x00, 0x00, b'L', b'o']);
    record(&mut stream, SST, &sst);
    record(&mut stream, crate::CONTINUE, &[0x01, b'n', 0x00, b'g', 0x00]);
    record(&mut stream, EOF, &[]);

    let sheet_at = stream.len() as u32;
    stream[boundsheet_at..boundsheet_at + 4].copy_from_slice(&sheet_at.to_le_bytes());
    record(&mut stream, BOF, &crate::bof_body(0x0600, 0x0010));
    record(&mut stream, crate::LABELSST, &[0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
    record(&mut stream, EOF, &[]);

    let rows = crate::collect_rows(compound_file("/Workbook", &stream));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells, crate::cells(&[Some("Long")]));
}

struct Exploding;

impl RowConsumer for Exploding {
    fn should_skip_sheet(&mut self, _sheet_name: &str, _session: &ReadSession) -> bool {
        false
    }

    fn on_row(
        &mut self,
        _row: &Row,
        _row_number: u32,
        _sheet_name: &str,
        _session: &ReadSession,
    ) -> ConsumerResult {
        Err("disk full".into())
    }
}

#[test]
fn test_xls_consumer_error_propagates() {
    let bytes = WorkbookBuilder::new()
        .sheet(SheetFixture::new("S").number(0, 0, 1.0))
        .build();

    let mut reader = XlsReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.read_rows(&mut Exploding).unwrap_err();
    match err {
        XlsError::Core(sheetstream_core::Error::Consumer(source)) => {
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("expected consumer error, got {other:?}"),
    }
}
