//! Low-level byte emission for the container layout.
//!
//! Everything on the wire is little-endian. Lengths and counts use the
//! compact base-128 varint from [`integer`]; fixed scalars use fixed width.
use smallvec::SmallVec;

pub mod integer;

/// A small, stack-allocated-first buffer used by the wire writer.
///
/// Backed by `smallvec`, this stores up to 32 bytes inline before spilling
/// to the heap.
pub type DynBuf = SmallVec<[u8; 32]>;

/// Types that know how to append their wire representation to a buffer.
pub trait WireEncodable {
    fn encode_wire(&self, buf: &mut DynBuf);
}

impl<T: WireEncodable> WireEncodable for &T {
    #[inline]
    fn encode_wire(&self, buf: &mut DynBuf) {
        (*self).encode_wire(buf)
    }
}

#[inline]
pub(crate) fn push_len(len: usize, buf: &mut DynBuf) {
    integer::encode_u64(len as u64, buf);
}

#[inline]
pub(crate) fn push_u32(value: u32, buf: &mut DynBuf) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn push_i32(value: i32, buf: &mut DynBuf) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn push_i64(value: i64, buf: &mut DynBuf) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn push_f64(value: f64, buf: &mut DynBuf) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn push_bool(value: bool, buf: &mut DynBuf) {
    buf.push(value as u8);
}

/// Length-prefixed UTF-8 string.
pub(crate) fn push_str(value: &str, buf: &mut DynBuf) {
    push_len(value.len(), buf);
    buf.extend_from_slice(value.as_bytes());
}

/// Length-prefixed raw byte block.
pub(crate) fn push_bytes(value: &[u8], buf: &mut DynBuf) {
    push_len(value.len(), buf);
    buf.extend_from_slice(value);
}

/// Count-prefixed vector of fixed u32 indices.
pub(crate) fn push_index_vec(indices: &[u32], buf: &mut DynBuf) {
    push_len(indices.len(), buf);
    for index in indices {
        push_u32(*index, buf);
    }
}

/// Count-prefixed vector of fixed i32 scalars.
pub(crate) fn push_i32_vec(values: &[i32], buf: &mut DynBuf) {
    push_len(values.len(), buf);
    for value in values {
        push_i32(*value, buf);
    }
}
