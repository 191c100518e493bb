use crate::DecodeError;

/// Read a little-endian u16 from a byte slice.
///
/// Panics if `offset + 2` exceeds the slice; callers check lengths up front.
pub fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Read a little-endian u32 from a byte slice.
///
/// Panics if `offset + 4` exceeds the slice; callers check lengths up front.
pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Borrow `len` bytes at `offset`, failing with `TruncatedInput` when the
/// range does not fit inside `buf`.
pub fn slice_at<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DecodeError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(DecodeError::truncated(what, offset, len, buf.len()))
}

/// Checked little-endian u16 read.
pub fn try_read_u16_le(buf: &[u8], offset: usize, what: &'static str) -> Result<u16, DecodeError> {
    slice_at(buf, offset, 2, what).map(|b| read_u16_le(b, 0))
}

/// Checked little-endian u32 read.
pub fn try_read_u32_le(buf: &[u8], offset: usize, what: &'static str) -> Result<u32, DecodeError> {
    slice_at(buf, offset, 4, what).map(|b| read_u32_le(b, 0))
}

/// Decode a fixed-length byte field one byte per char (Latin-1), so the
/// original bytes can be reproduced exactly with [`encode_latin1`].
pub fn read_latin1(buf: &[u8]) -> String {
    buf.iter().map(|&b| b as char).collect()
}

/// Like [`read_latin1`] but with trailing NUL padding removed.
pub fn read_latin1_trimmed(buf: &[u8]) -> String {
    let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    read_latin1(&buf[..end])
}

/// Write `s` into `out` one byte per char, NUL-padding the remainder.
/// Chars above U+00FF become `?` and excess chars are dropped.
pub fn encode_latin1(s: &str, out: &mut [u8]) {
    out.fill(0);
    for (slot, c) in out.iter_mut().zip(s.chars()) {
        *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
}

/// Format a byte count as a human-readable size string (e.g., "4 KB", "2 MB").
///
/// Uses exact integer division: values that aren't clean multiples of KB/MB
/// are shown in bytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}
