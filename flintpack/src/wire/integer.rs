//! Varint encoding helpers for compact u64 representation.
//!
//! Lengths and counts in the container layout use this scheme; fixed-width
//! fields (indices, scalars) do not.

use crate::wire::DynBuf;

/// Encode an unsigned 64-bit integer into `buf` using a compact base-128
/// scheme and return the number of bytes written.
///
/// Format:
/// - Split the value into 7-bit chunks (base-128 digits), least-significant
///   first.
/// - Every chunk except the last is pushed with MSB = 1 (continuation); the
///   final chunk has MSB = 0.
///
/// Value 0 encodes to the single byte `0x00`; 300 encodes to `[0xAC, 0x02]`.
pub fn encode_u64(mut value: u64, buf: &mut DynBuf) -> usize {
    let mut size = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        size += 1;
        if value == 0 {
            buf.push(byte);
            break size;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode one unsigned 64-bit integer from the front of the given slice.
///
/// On success, returns `Some(value)` and advances `buf` past the consumed
/// bytes. Returns `None` when the slice ends before a terminating byte
/// (MSB = 0) is found.
pub fn decode_u64(buf: &mut &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    let mut shift = 0;

    loop {
        let (byte, rest) = buf.split_first()?;
        *buf = rest;
        value |= ((*byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            break Some(value);
        }
        shift += 7;
    }
}

/// Compute the encoded size in bytes of a u64 value using the varint scheme.
pub fn encoded_size_u64(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let sig_bits = (64 - value.leading_zeros()) as usize;
    // Each byte encodes 7 bits; ceil_div(sig_bits, 7)
    (sig_bits + 6) / 7
}
