//! Prefix integer encoding and decoding.
//!
//! Implements the variable-length integer encoding defined in RFC 7541 Section 5.1,
//! used by every QPACK instruction. The format lets an integer share its first
//! byte with other fields (opcode, static bit, Huffman bit).
//!
//! ## Format
//!
//! An integer is represented in two parts:
//! - A prefix that fills the low N bits of a byte (1 ≤ N ≤ 8)
//! - Optional continuation bytes if the value doesn't fit in the prefix
//!
//! If I < 2^N - 1, the integer is encoded in the N-bit prefix.
//! Otherwise, the prefix bits are all set to 1, and I - (2^N - 1) is encoded
//! in base-128 continuation bytes, least significant group first, with the
//! high bit of each byte meaning "more follows".

use bytes::BufMut;

use crate::error::{Error, Result};

/// Largest integer QPACK requires a decoder to accept (2^62 - 1).
pub const MAX_INTEGER: u64 = (1u64 << 62) - 1;

#[inline]
fn prefix_max(prefix_bits: u8) -> u64 {
    if prefix_bits == 8 {
        0xFF
    } else {
        (1u64 << prefix_bits) - 1
    }
}

/// Encodes `value` with an N-bit prefix.
///
/// `high_bits` carries whatever the instruction already wrote into the first
/// byte above the prefix; it must not overlap the low `prefix_bits` bits.
///
/// # Example
///
/// ```
/// use quicd_qpack_core::integer::encode;
///
/// let mut buf = Vec::new();
/// // 10 with a 5-bit prefix under the `001` Set Dynamic Table Capacity opcode
/// encode(10, 5, 0b001_00000, &mut buf);
/// assert_eq!(buf, [0b001_01010]);
/// ```
pub fn encode<B: BufMut>(value: u64, prefix_bits: u8, high_bits: u8, buf: &mut B) {
    debug_assert!(
        (1..=8).contains(&prefix_bits),
        "prefix_bits must be 1-8"
    );
    let max_prefix = prefix_max(prefix_bits);
    debug_assert_eq!(
        u64::from(high_bits) & max_prefix,
        0,
        "high bits overlap the integer prefix"
    );

    if value < max_prefix {
        buf.put_u8(high_bits | value as u8);
        return;
    }

    buf.put_u8(high_bits | max_prefix as u8);
    let mut remaining = value - max_prefix;
    while remaining >= 128 {
        buf.put_u8(0x80 | (remaining & 0x7F) as u8);
        remaining >>= 7;
    }
    buf.put_u8(remaining as u8);
}

/// Returns the number of bytes [`encode`] writes for `value`.
pub fn encoded_len(value: u64, prefix_bits: u8) -> usize {
    let max_prefix = prefix_max(prefix_bits);
    if value < max_prefix {
        return 1;
    }
    let mut remaining = value - max_prefix;
    let mut len = 2;
    while remaining >= 128 {
        remaining >>= 7;
        len += 1;
    }
    len
}

/// Decodes an integer with an N-bit prefix.
///
/// Bits of the first byte above the prefix are ignored. Returns the value and
/// the number of bytes consumed.
///
/// Truncated input yields `Incomplete(1)`: at least one more byte is needed,
/// and the true shortfall cannot be known before the last byte is seen.
///
/// # Example
///
/// ```
/// use quicd_qpack_core::integer::decode;
///
/// let (value, consumed) = decode(5, &[0x1f, 0xd5, 0x03]).unwrap();
/// assert_eq!(value, 500);
/// assert_eq!(consumed, 3);
/// ```
pub fn decode(prefix_bits: u8, data: &[u8]) -> Result<(u64, usize)> {
    if !(1..=8).contains(&prefix_bits) {
        return Err(Error::IntegerError("prefix_bits must be 1-8".into()));
    }

    let first = *data.first().ok_or(Error::Incomplete(1))?;
    let max_prefix = prefix_max(prefix_bits);
    let mut value = u64::from(first) & max_prefix;
    if value < max_prefix {
        return Ok((value, 1));
    }

    let mut pos = 1;
    let mut shift = 0u32;
    loop {
        let byte = *data.get(pos).ok_or(Error::Incomplete(1))?;
        pos += 1;

        // Past 56 bits a 7-bit group can no longer land inside 62 bits.
        if shift > 56 {
            return Err(Error::IntegerError("integer encoding too long".into()));
        }

        value = value
            .checked_add(u64::from(byte & 0x7F) << shift)
            .filter(|v| *v <= MAX_INTEGER)
            .ok_or_else(|| Error::IntegerError("value exceeds maximum (2^62 - 1)".into()))?;

        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
        shift += 7;
    }
}
