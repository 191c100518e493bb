//! Backward LZ decompression for ARM9 binaries and overlays.
//!
//! The compressed stream is read from the end of the blob towards the start,
//! and output is produced from the end of a larger buffer towards the start.
//! Back-references therefore point *up* into bytes that were already written.
//!
//! Footer (last 8 bytes, little-endian):
//!
//! | Offset  | Field                                                     |
//! |---------|-----------------------------------------------------------|
//! | `L - 8` | bits 0–23: compressed length from the end, bits 24–31: header length |
//! | `L - 4` | number of bytes the output grows by                        |

use nitro_junk_core::DecodeError;
use nitro_junk_core::util::read_u32_le;
use serde::{Deserialize, Serialize};

/// Size of the trailing footer.
pub const FOOTER_SIZE: usize = 8;

/// Valid header lengths: the 8-byte footer plus up to 3 bytes of padding.
const BACK_SHIFT_RANGE: std::ops::RangeInclusive<usize> = 8..=0x0B;

/// Decompressed images have to fit in main RAM (16 MB on DSi).
const MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Parsed compression footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionFooter {
    /// Extra bytes the decompressed output has beyond the blob length
    pub extra_size: u32,
    /// Distance from the end of the blob to the first control byte
    pub back_shift: u8,
    /// Distance from the end of the blob to where compressed data stops
    pub end_threshold: u32,
}

impl CompressionFooter {
    /// Read the footer from the last 8 bytes of `blob`.
    pub fn parse(blob: &[u8]) -> Result<Self, DecodeError> {
        let len = blob.len();
        if len < FOOTER_SIZE {
            return Err(DecodeError::TruncatedFooter(len));
        }
        let packed = read_u32_le(blob, len - 8);
        Ok(Self {
            extra_size: read_u32_le(blob, len - 4),
            back_shift: (packed >> 24) as u8,
            end_threshold: packed & 0x00FF_FFFF,
        })
    }

    /// Reject footers no encoder produces.
    fn validate(&self, len: usize) -> Result<(), DecodeError> {
        let back_shift = self.back_shift as usize;
        let end_threshold = self.end_threshold as usize;
        if !BACK_SHIFT_RANGE.contains(&back_shift) {
            return Err(DecodeError::unsupported(format!(
                "header length {back_shift} outside 8..=11"
            )));
        }
        if end_threshold < back_shift || end_threshold > len {
            return Err(DecodeError::unsupported(format!(
                "compressed length {end_threshold} outside {back_shift}..={len}"
            )));
        }
        let out_len = len.saturating_add(self.extra_size as usize);
        if out_len > MAX_DECOMPRESSED_SIZE {
            return Err(DecodeError::unsupported(format!(
                "decompressed size {out_len} exceeds {MAX_DECOMPRESSED_SIZE}"
            )));
        }
        Ok(())
    }

    pub fn decompressed_len(&self, len: usize) -> usize {
        len + self.extra_size as usize
    }
}

/// Move a cursor back by `n`, treating underflow as stream corruption.
fn step_back(cursor: usize, n: usize, what: &str) -> Result<usize, DecodeError> {
    cursor
        .checked_sub(n)
        .ok_or_else(|| DecodeError::corrupt(format!("{what} cursor ran past the start of the buffer")))
}

/// Decompress a whole blob. A footer with `extra_size == 0` marks data that
/// was never compressed, and the blob is returned unchanged.
pub fn decompress(blob: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let footer = CompressionFooter::parse(blob)?;
    if footer.extra_size == 0 {
        log::debug!("BLZ footer has no extra size, data is stored uncompressed");
        return Ok(blob.to_vec());
    }

    let len = blob.len();
    footer.validate(len)?;
    let out_len = footer.decompressed_len(len);
    log::debug!(
        "BLZ: {} -> {} bytes (header {}, compressed tail {})",
        len,
        out_len,
        footer.back_shift,
        footer.end_threshold
    );

    let mut out = Vec::with_capacity(out_len);
    out.extend_from_slice(blob);
    out.resize(out_len, 0);

    let mut src = len - footer.back_shift as usize;
    let mut dst = out_len;
    let stop = len - footer.end_threshold as usize;

    'stream: while src > stop {
        src = step_back(src, 1, "source")?;
        let mut control = out[src];

        for _ in 0..8 {
            if control & 0x80 == 0 {
                src = step_back(src, 1, "source")?;
                dst = step_back(dst, 1, "destination")?;
                out[dst] = out[src];
            } else {
                src = step_back(src, 2, "source")?;
                let a = out[src + 1];
                let b = out[src];
                let disp = ((((a & 0x0F) as usize) << 8) | b as usize) + 2;
                let run = (a >> 4) as usize + 3;

                for _ in 0..run {
                    dst = step_back(dst, 1, "destination")?;
                    let from = dst + disp;
                    if from >= out_len {
                        return Err(DecodeError::corrupt(format!(
                            "back-reference to 0x{from:X} beyond output end 0x{out_len:X}"
                        )));
                    }
                    out[dst] = out[from];
                }
            }

            control <<= 1;
            if src <= stop {
                break 'stream;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "tests/blz_tests.rs"]
mod tests;
