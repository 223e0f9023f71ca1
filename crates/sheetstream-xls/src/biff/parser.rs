//! Low-level binary parsing helpers for BIFF8 record bodies.
//!
//! All multi-byte integers in BIFF8 are little-endian.

use crate::error::{XlsError, XlsResult};

/// Cursor over a record body.
///
/// Carries the record's CONTINUE boundaries so string decoding can detect
/// when character data crosses into a continuation.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    continuations: &'a [usize],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_continuations(data, &[])
    }

    pub fn with_continuations(data: &'a [u8], continuations: &'a [usize]) -> Self {
        Self {
            data,
            pos: 0,
            continuations,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor sits exactly at the start of a CONTINUE body
    pub fn at_continuation(&self) -> bool {
        self.continuations.binary_search(&self.pos).is_ok()
    }

    /// Bytes left before the next CONTINUE boundary (or the end of data)
    pub fn remaining_in_segment(&self) -> usize {
        let end = self
            .continuations
            .iter()
            .copied()
            .find(|&b| b > self.pos)
            .unwrap_or(self.data.len());
        end - self.pos
    }

    /// Take the next `n` bytes.
    pub fn bytes(&mut self, n: usize) -> XlsResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(XlsError::malformed(format!(
                "unexpected end of data at offset {}, need {} bytes, have {}",
                self.pos,
                n,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> XlsResult<()> {
        self.bytes(n).map(|_| ())
    }

    #[inline]
    pub fn u8(&mut self) -> XlsResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    #[inline]
    pub fn u16(&mut self) -> XlsResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn u32(&mut self) -> XlsResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read an 8-byte little-endian block, e.g. an IEEE 754 double or a
    /// FORMULA result field.
    #[inline]
    pub fn array8(&mut self) -> XlsResult<[u8; 8]> {
        let b = self.bytes(8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(b);
        Ok(out)
    }

    #[inline]
    pub fn f64(&mut self) -> XlsResult<f64> {
        Ok(f64::from_le_bytes(self.array8()?))
    }

    /// Read an RK-encoded number.
    #[inline]
    pub fn rk(&mut self) -> XlsResult<f64> {
        Ok(decode_rk(self.u32()?))
    }
}

/// Decode an RK-encoded number.
///
/// RK encoding (4 bytes):
/// - Bit 0: if 1, the decoded number should be divided by 100
/// - Bit 1: if 1, value is an integer (bits 2..31 as signed 30-bit int)
///   if 0, value is the upper 30 bits of an IEEE 754 double
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}
