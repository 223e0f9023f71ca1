//! Worksheet part row assembly.
//!
//! The sheet XML is consumed as a flat stream of element events; a row is
//! handed to the consumer when its `</row>` closes.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use sheetstream_core::{
    check_column, column_index_checked, ControlSignal, ReadSession, RowConsumer, SharedStrings,
};

use crate::error::{XlsxError, XlsxResult};
use crate::reader::attr_value;
use crate::reader::strings::decode_excel_escapes;

/// Per-sheet parse state
#[derive(Debug, Default)]
struct SheetRows {
    /// Text collected since the last element start
    text: String,
    row_number: u32,
    column: Option<u32>,
    shared: bool,
    /// Inline string (`<is>`) being collected
    inline: Option<String>,
    phonetic_depth: usize,
}

impl SheetRows {
    fn start_row(&mut self, e: &BytesStart<'_>, session: &mut ReadSession) -> XlsxResult<()> {
        self.row_number = match attr_value(e, b"r")? {
            Some(r) => r
                .trim()
                .parse()
                .map_err(|_| XlsxError::malformed(format!("invalid row number '{r}'")))?,
            None => self.row_number.checked_add(1).ok_or_else(|| {
                XlsxError::malformed(format!("row after {} has no number", self.row_number))
            })?,
        };
        self.column = None;
        session.clear_row();
        session.set_row_number(self.row_number);
        Ok(())
    }

    fn start_cell(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        self.shared = attr_value(e, b"t")?.as_deref() == Some("s");
        self.column = Some(match attr_value(e, b"r")? {
            Some(r) => column_index_checked(&r)?,
            None => match self.column {
                Some(previous) => check_column(previous.saturating_add(1))?,
                None => 0,
            },
        });
        self.inline = None;
        Ok(())
    }

    fn end_value(&mut self, strings: &SharedStrings, session: &mut ReadSession) -> XlsxResult<()> {
        let Some(column) = self.column else {
            return Ok(());
        };
        let value = if self.shared {
            let raw = self.text.trim();
            let index: usize = raw
                .parse()
                .map_err(|_| XlsxError::malformed(format!("invalid shared string index '{raw}'")))?;
            strings.resolve(index).trim().to_string()
        } else {
            self.text.trim().to_string()
        };
        session.set_cell(column, value);
        Ok(())
    }
}

/// Stream the rows of one worksheet part to `consumer`.
///
/// The session must already have begun the sheet. Returns when the part
/// ends or the consumer raises [`ControlSignal::SkipSheet`] or
/// [`ControlSignal::AbortAll`]; the latter is left recorded on the session.
pub fn read_sheet_rows<B, C>(
    xml: B,
    strings: &SharedStrings,
    session: &mut ReadSession,
    consumer: &mut C,
) -> XlsxResult<()>
where
    B: BufRead,
    C: RowConsumer + ?Sized,
{
    let mut xml_reader = Reader::from_reader(xml);
    xml_reader.trim_text(false);
    // `<row/>` and `<c/>` then go through the same start/end handling
    xml_reader.expand_empty_elements(true);

    let mut buf = Vec::new();
    let mut state = SheetRows::default();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                state.text.clear();
                match e.local_name().as_ref() {
                    b"row" => state.start_row(&e, session)?,
                    b"c" => state.start_cell(&e)?,
                    b"is" => state.inline = Some(String::new()),
                    b"rPh" => state.phonetic_depth += 1,
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => state.end_value(strings, session)?,
                b"t" if state.phonetic_depth == 0 => {
                    if let Some(inline) = state.inline.as_mut() {
                        inline.push_str(&state.text);
                    }
                }
                b"rPh" => state.phonetic_depth = state.phonetic_depth.saturating_sub(1),
                b"is" => {
                    if let (Some(column), Some(inline)) = (state.column, state.inline.take()) {
                        session.set_cell(column, decode_excel_escapes(&inline).trim());
                    }
                }
                b"row" => match session.deliver_row(consumer)? {
                    ControlSignal::Continue => {}
                    ControlSignal::SkipSheet | ControlSignal::AbortAll => return Ok(()),
                },
                _ => {}
            },
            Event::Text(e) => state.text.push_str(&e.unescape()?),
            Event::CData(e) => state
                .text
                .push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !session.row().is_empty() {
        log::warn!(
            "sheet '{}' ended inside row {}; row dropped",
            session.sheet_name(),
            state.row_number
        );
    }
    Ok(())
}
