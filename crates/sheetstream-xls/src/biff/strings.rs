//! BIFF8 Unicode string decoding.
//!
//! BIFF8 strings have a complex encoding:
//! - Header: char_count (1 or 2 bytes) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data, then the runs (4 bytes each), then the ext data
//!
//! When character data crosses a CONTINUE boundary the continuation starts
//! with a fresh flags byte, which may switch between compressed and
//! uncompressed encoding mid-string.

use sheetstream_core::SharedStrings;

use super::parser::ByteReader;
use crate::error::{XlsError, XlsResult};

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_EXT: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET).
pub fn read_short_string(r: &mut ByteReader<'_>) -> XlsResult<String> {
    let char_count = r.u8()? as usize;
    let flags = r.u8()?;
    read_characters(r, char_count, flags)
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (SST, LABEL,
/// STRING), skipping any rich-text runs and phonetic data.
pub fn read_unicode_string(r: &mut ByteReader<'_>) -> XlsResult<String> {
    let char_count = r.u16()? as usize;
    let flags = r.u8()?;

    let run_count = if flags & FLAG_RICH != 0 { r.u16()? } else { 0 };
    let ext_size = if flags & FLAG_EXT != 0 { r.u32()? } else { 0 };

    let text = read_characters(r, char_count, flags)?;

    r.skip(run_count as usize * 4)?;
    r.skip(ext_size as usize)?;

    Ok(text)
}

/// Read `char_count` characters, re-reading the flags byte at every
/// CONTINUE boundary the data crosses.
fn read_characters(r: &mut ByteReader<'_>, char_count: usize, flags: u8) -> XlsResult<String> {
    let mut wide = flags & FLAG_HIGH_BYTE != 0;
    let mut units: Vec<u16> = Vec::with_capacity(char_count);

    while units.len() < char_count {
        if r.at_continuation() {
            wide = r.u8()? & FLAG_HIGH_BYTE != 0;
        }

        let width = if wide { 2 } else { 1 };
        let fits = r.remaining_in_segment() / width;
        let take = fits.min(char_count - units.len());
        if take == 0 {
            return Err(XlsError::malformed(format!(
                "string data too short: need {} more characters at offset {}",
                char_count - units.len(),
                r.position()
            )));
        }

        let bytes = r.bytes(take * width)?;
        if wide {
            units.extend(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
            );
        } else {
            units.extend(bytes.iter().map(|&b| b as u16));
        }
    }

    String::from_utf16(&units)
        .map_err(|e| XlsError::malformed(format!("invalid UTF-16 string: {e}")))
}

/// Parse the SST (Shared String Table) record body, CONTINUE bodies included.
///
/// The SST body starts with:
/// - `total_strings` (4 bytes, u32) : total string refs in workbook
/// - `unique_strings` (4 bytes, u32) : number of unique strings in this table
/// - Then `unique_strings` Unicode string entries
///
/// A table that ends early keeps the strings decoded so far; cells that
/// reference the missing ones resolve to empty text.
pub fn parse_sst(data: &[u8], continuations: &[usize]) -> XlsResult<SharedStrings> {
    let mut r = ByteReader::with_continuations(data, continuations);

    let _total_strings = r.u32()?;
    let unique_count = r.u32()? as usize;

    // Don't trust the declared count for the allocation; a string takes at
    // least 3 bytes.
    let mut strings = Vec::with_capacity(unique_count.min(r.remaining() / 3));

    for i in 0..unique_count {
        match read_unicode_string(&mut r) {
            Ok(s) => strings.push(s),
            Err(e) => {
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(SharedStrings::from(strings))
}
