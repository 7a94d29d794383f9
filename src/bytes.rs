//! Little-endian byte writing helpers.
//!
//! The export engine always knows exactly how many bytes it is writing and
//! at what offset, so these helpers write in place into a caller-owned
//! buffer rather than through a `Write` adapter — mirroring the teacher's
//! `parser/byteorder.rs`, inverted from reads to writes. Panics on an
//! out-of-range offset are intentional: an offset past the end of a page
//! or subheader buffer is a defect in the layout code, not a caller error
//! (spec.md §7, "internal invariants ... enforced via assertions").

/// Writes a little-endian `u16` at `offset`.
pub fn write_u16_le(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian `u32` at `offset`.
pub fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian `u64` at `offset`.
pub fn write_u64_le(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian `i16` at `offset`.
pub fn write_i16_le(buf: &mut [u8], offset: usize, value: i16) {
    write_u16_le(buf, offset, value as u16);
}

/// Writes the IEEE-754 bit pattern of `value` at `offset`, little-endian.
pub fn write_f64_le(buf: &mut [u8], offset: usize, value: f64) {
    write_u64_le(buf, offset, value.to_bits());
}

/// Copies the UTF-8 bytes of `s` into `buf` at `offset`, padding the
/// remainder of `length` bytes with `pad_byte`.
///
/// # Panics
///
/// Panics if `s` is longer than `length` bytes — callers are expected to
/// have already validated length against the field's byte budget.
pub fn write_utf8(buf: &mut [u8], offset: usize, s: &str, length: usize, pad_byte: u8) {
    let bytes = s.as_bytes();
    assert!(
        bytes.len() <= length,
        "UTF-8 value of {} bytes does not fit in a {length}-byte field",
        bytes.len()
    );
    let field = &mut buf[offset..offset + length];
    field[..bytes.len()].copy_from_slice(bytes);
    field[bytes.len()..].fill(pad_byte);
}

/// Like [`write_utf8`], space-padded (0x20), asserting `s` is ASCII-only.
///
/// # Panics
///
/// Panics if `s` contains non-ASCII bytes or is longer than `length`.
pub fn write_ascii(buf: &mut [u8], offset: usize, s: &str, length: usize) {
    assert!(s.is_ascii(), "value '{s}' is not ASCII");
    write_utf8(buf, offset, s, length, b' ');
}

/// Returns the smallest multiple of `k` that is `>= n`.
#[must_use]
pub const fn align(n: usize, k: usize) -> usize {
    n.div_ceil(k) * k
}
