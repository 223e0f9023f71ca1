//! Tests for sheet selection, consumer control signals and entry points.

use std::io::Cursor;

use crate::{numbered_rows, PackageBuilder};
use pretty_assertions::assert_eq;
use sheetstream_core::{
    ConsumerResult, ReadSession, Row, RowCollector, RowConsumer, RowCounter, RowLimit,
    SheetFilter,
};
use sheetstream_xlsx::{XlsxError, XlsxReader};

/// Records which sheets the skip predicate was asked about
#[derive(Default)]
struct Probe {
    asked: Vec<String>,
    rows: Vec<(String, u32)>,
}

impl RowConsumer for Probe {
    fn should_skip_sheet(&mut self, sheet_name: &str, session: &ReadSession) -> bool {
        assert!(session.row().is_empty());
        self.asked.push(sheet_name.to_string());
        false
    }

    fn on_row(
        &mut self,
        _row: &Row,
        row_number: u32,
        sheet_name: &str,
        session: &ReadSession,
    ) -> ConsumerResult {
        assert_eq!(session.sheet_name(), sheet_name);
        assert_eq!(session.row_number(), row_number);
        self.rows.push((sheet_name.to_string(), row_number));
        Ok(Default::default())
    }
}

#[test]
fn test_xlsx_hidden_sheets_never_consulted_or_delivered() {
    let bytes = PackageBuilder::new()
        .sheet("Visible", &numbered_rows(3))
        .hidden_sheet("Hidden", &numbered_rows(5))
        .very_hidden_sheet("Internal", &numbered_rows(2))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let mut probe = Probe::default();
    let summary = reader.read_rows(&mut probe).unwrap();

    assert_eq!(probe.asked, vec!["Visible".to_string()]);
    assert_eq!(probe.rows.len(), 3);
    assert!(probe.rows.iter().all(|(sheet, _)| sheet == "Visible"));
    assert_eq!(summary.sheets_visited, 3);
    assert_eq!(summary.rows_delivered, 3);
}

#[test]
fn test_xlsx_sheets_read_in_workbook_order() {
    let bytes = PackageBuilder::new()
        .sheet("Zeta", &numbered_rows(1))
        .sheet("Alpha", &numbered_rows(2))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let mut probe = Probe::default();
    reader.read_rows(&mut probe).unwrap();

    assert_eq!(
        probe.rows,
        vec![
            ("Zeta".to_string(), 1),
            ("Alpha".to_string(), 1),
            ("Alpha".to_string(), 2),
        ]
    );
}

#[test]
fn test_xlsx_skip_sheet_only_affects_current_sheet() {
    let bytes = PackageBuilder::new()
        .sheet("A", &numbered_rows(10))
        .sheet("B", &numbered_rows(10))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let mut limit = RowLimit::per_sheet(RowCounter::new(), 4);
    let summary = reader.read_rows(&mut limit).unwrap();

    assert_eq!(limit.inner().count_for("A"), 4);
    assert_eq!(limit.inner().count_for("B"), 4);
    assert!(!summary.aborted);
    assert_eq!(summary.sheets_visited, 2);
}

#[test]
fn test_xlsx_abort_all_completes_normally() {
    let bytes = PackageBuilder::new()
        .sheet("A", &numbered_rows(3))
        .sheet("B", &numbered_rows(3))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let mut limit = RowLimit::total(RowCounter::new(), 5);
    let summary = reader.read_rows(&mut limit).unwrap();

    assert_eq!(limit.inner().count_for("A"), 3);
    assert_eq!(limit.inner().count_for("B"), 2);
    assert!(summary.aborted);
    assert_eq!(summary.rows_delivered, 5);
}

#[test]
fn test_xlsx_sheet_filter() {
    let bytes = PackageBuilder::new()
        .sheet("Keep", &numbered_rows(2))
        .sheet("Drop", &numbered_rows(2))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let mut filter = SheetFilter::new(RowCollector::new(), ["Keep"]);
    reader.read_rows(&mut filter).unwrap();

    let rows = filter.into_inner().into_rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.sheet == "Keep"));
}

#[test]
fn test_xlsx_consumer_error_is_fatal() {
    struct Failing;

    impl RowConsumer for Failing {
        fn should_skip_sheet(&mut self, _sheet_name: &str, _session: &ReadSession) -> bool {
            false
        }

        fn on_row(
            &mut self,
            _row: &Row,
            row_number: u32,
            _sheet_name: &str,
            _session: &ReadSession,
        ) -> ConsumerResult {
            Err(format!("rejected row {row_number}").into())
        }
    }

    let bytes = PackageBuilder::new()
        .sheet("A", &numbered_rows(3))
        .build();

    let mut reader = XlsxReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.read_rows(&mut Failing).unwrap_err();
    assert!(matches!(
        err,
        XlsxError::Core(sheetstream_core::Error::Consumer(ref e)) if e.to_string() == "rejected row 1"
    ));
}

#[test]
fn test_xlsx_open_file() {
    let bytes = PackageBuilder::new()
        .sheet("Sheet1", &numbered_rows(4))
        .build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    std::fs::write(&path, bytes).unwrap();

    let mut reader = XlsxReader::open_file(&path).unwrap();
    let mut counter = RowCounter::new();
    reader.read_rows(&mut counter).unwrap();
    assert_eq!(counter.total(), 4);
}

#[test]
fn test_xlsx_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = XlsxReader::open_file(dir.path().join("nope.xlsx"));
    assert!(matches!(result, Err(XlsxError::Io(_))));
}
