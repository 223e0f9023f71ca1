//! Format-dispatching reader

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use sheetstream_core::{ReadSummary, RowConsumer};

use crate::detect::{detect, Format};
use crate::error::{Error, Result};

enum Inner<R> {
    #[cfg(feature = "xls")]
    Xls(sheetstream_xls::XlsReader<R>),
    #[cfg(feature = "xlsx")]
    Xlsx(sheetstream_xlsx::XlsxReader<R>),
    #[cfg(not(any(feature = "xls", feature = "xlsx")))]
    #[allow(dead_code)]
    Unavailable(std::convert::Infallible, std::marker::PhantomData<R>),
}

/// Reads either spreadsheet format, chosen from the input's leading bytes.
///
/// The reader owns the input for its whole lifetime; it is released when
/// the reader is dropped, saved, or taken back with
/// [`SpreadsheetReader::into_inner`].
pub struct SpreadsheetReader<R> {
    inner: Inner<R>,
    format: Format,
    /// Stream position the spreadsheet starts at
    start: u64,
}

impl SpreadsheetReader<BufReader<File>> {
    /// Open a spreadsheet file. The extension is ignored.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        log::debug!("opening {}", path.as_ref().display());
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> SpreadsheetReader<R> {
    /// Detect the format of `reader` and open the matching reader.
    pub fn open(mut reader: R) -> Result<Self> {
        let start = reader.stream_position()?;
        let format = detect(&mut reader)?;

        let inner = match format {
            #[cfg(feature = "xls")]
            Format::LegacyBinary => Inner::Xls(sheetstream_xls::XlsReader::new(reader)?),
            #[cfg(feature = "xlsx")]
            Format::PackagedXml => Inner::Xlsx(sheetstream_xlsx::XlsxReader::new(reader)?),
            #[allow(unreachable_patterns)]
            disabled => return Err(Error::FormatDisabled(disabled)),
        };

        Ok(Self {
            inner,
            format,
            start,
        })
    }

    /// The detected format
    pub fn format(&self) -> Format {
        self.format
    }

    /// Stream every row of every readable sheet to `consumer`.
    ///
    /// Hidden sheets are never offered to the consumer. Returns once all
    /// sheets are read or the consumer raised
    /// [`ControlSignal::AbortAll`](sheetstream_core::ControlSignal::AbortAll).
    pub fn read_rows<C>(&mut self, consumer: &mut C) -> Result<ReadSummary>
    where
        C: RowConsumer + ?Sized,
    {
        let summary = match &mut self.inner {
            #[cfg(feature = "xls")]
            Inner::Xls(reader) => reader.read_rows(consumer)?,
            #[cfg(feature = "xlsx")]
            Inner::Xlsx(reader) => reader.read_rows(consumer)?,
            #[cfg(not(any(feature = "xls", feature = "xlsx")))]
            Inner::Unavailable(never, _) => match *never {},
        };
        log::debug!(
            "read {} rows from {} sheets{}",
            summary.rows_delivered,
            summary.sheets_visited,
            if summary.aborted { " (aborted)" } else { "" }
        );
        Ok(summary)
    }

    /// Give back the input stream, positioned wherever reading left it
    pub fn into_inner(self) -> R {
        match self.inner {
            #[cfg(feature = "xls")]
            Inner::Xls(reader) => reader.into_inner(),
            #[cfg(feature = "xlsx")]
            Inner::Xlsx(reader) => reader.into_inner(),
            #[cfg(not(any(feature = "xls", feature = "xlsx")))]
            Inner::Unavailable(never, _) => match never {},
        }
    }

    /// Write the original spreadsheet bytes to `writer`, unchanged.
    ///
    /// The copy starts from the position the reader was opened at and does
    /// not depend on how far rows were read. Returns the number of bytes
    /// written.
    pub fn save<W: Write + ?Sized>(self, writer: &mut W) -> Result<u64> {
        let start = self.start;
        let mut source = self.into_inner();
        source.seek(SeekFrom::Start(start))?;
        let written = io::copy(&mut source, writer)?;
        log::debug!("saved {written} bytes");
        Ok(written)
    }
}
