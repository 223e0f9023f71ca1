//! Format detection from leading bytes

use std::fmt;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Compound File Binary (OLE2) header signature
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Zip local file header signature
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// The two container formats a spreadsheet can come in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// BIFF8 workbook stream inside a compound file (`.xls`)
    LegacyBinary,
    /// SpreadsheetML parts inside a zip package (`.xlsx`)
    PackagedXml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::LegacyBinary => f.write_str("XLS (compound file)"),
            Format::PackagedXml => f.write_str("XLSX (zip package)"),
        }
    }
}

/// Identify the format from an in-memory header.
pub fn detect_bytes(header: &[u8]) -> Result<Format> {
    if header.starts_with(&CFB_SIGNATURE) {
        Ok(Format::LegacyBinary)
    } else if header.starts_with(&ZIP_SIGNATURE) {
        Ok(Format::PackagedXml)
    } else {
        Err(Error::UnrecognizedFormat)
    }
}

/// Identify the format of a stream.
///
/// The stream is left at the position it had before the call, whatever the
/// outcome.
pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<Format> {
    let start = reader.stream_position()?;
    let mut header = [0u8; 8];
    let filled = read_header(reader, &mut header);
    reader.seek(SeekFrom::Start(start))?;

    let format = detect_bytes(&header[..filled?])?;
    log::debug!("detected {format}");
    Ok(format)
}

/// Fill `header` as far as the stream allows
fn read_header<R: Read>(reader: &mut R, header: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
