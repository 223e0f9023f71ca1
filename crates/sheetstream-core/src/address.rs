//! Cell coordinate decoding

use crate::error::{Error, Result};

/// Highest 0-based column a worksheet can hold (`XFD`)
pub const MAX_COLUMN: u32 = 16_383;

/// Convert the column letters of a cell coordinate to a 0-based index.
///
/// Only the leading alphabetic run is considered, so both `"AB"` and
/// `"AB12"` decode to 27. Letters are case-insensitive and there is no zero
/// digit: `A` = 1 .. `Z` = 26, most significant letter first.
///
/// # Examples
/// ```
/// use sheetstream_core::column_index;
///
/// assert_eq!(column_index("A1").unwrap(), 0);
/// assert_eq!(column_index("Z").unwrap(), 25);
/// assert_eq!(column_index("aa7").unwrap(), 26);
/// assert_eq!(column_index("XFD1048576").unwrap(), 16383);
/// ```
pub fn column_index(coordinate: &str) -> Result<u32> {
    let letters = coordinate
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic());

    let mut value: u32 = 0;
    let mut seen = false;
    for b in letters {
        seen = true;
        let digit = (b.to_ascii_uppercase() - b'A' + 1) as u32;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| {
                Error::malformed(format!("column letters overflow in '{coordinate}'"))
            })?;
    }

    if !seen {
        return Err(Error::malformed(format!(
            "no column letters in '{coordinate}'"
        )));
    }

    Ok(value - 1)
}

/// [`column_index`], rejecting columns past [`MAX_COLUMN`].
pub fn column_index_checked(coordinate: &str) -> Result<u32> {
    let column = column_index(coordinate)?;
    check_column(column)
}

/// Reject a 0-based column past [`MAX_COLUMN`].
pub fn check_column(column: u32) -> Result<u32> {
    if column > MAX_COLUMN {
        return Err(Error::malformed(format!(
            "column {column} is past the last worksheet column {MAX_COLUMN}"
        )));
    }
    Ok(column)
}
