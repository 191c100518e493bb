//! Module parameters trailer of an executable region and the compression
//! check built on it.
//!
//! The record is nine little-endian words (0x24 bytes) located 36 bytes
//! before the end of the blob. The word at +0x14 holds the end of the
//! compressed static data; zero means the blob is stored uncompressed.

use nitro_junk_core::DecodeError;
use nitro_junk_core::util::{read_u32_le, slice_at};
use serde::{Deserialize, Serialize};

use crate::blz;

/// Size of the module parameters record.
pub const MODULE_PARAMS_SIZE: usize = 0x24;

/// Offset of the compressed-static-end word within the record.
const COMPRESSED_END_OFFSET: usize = 0x14;

/// Marker words the SDK places at the end of the record.
pub const NITRO_CODE_BE: u32 = 0xDEC0_0621;
pub const NITRO_CODE_LE: u32 = 0x2106_C0DE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleParams {
    pub autoload_list_start: u32,
    pub autoload_list_end: u32,
    pub autoload_start: u32,
    pub static_bss_start: u32,
    pub static_bss_end: u32,
    /// Non-zero when the region is compressed
    pub compressed_static_end: u32,
    pub sdk_version: u32,
    pub nitro_code_be: u32,
    pub nitro_code_le: u32,
}

impl ModuleParams {
    /// Decode the record starting at `len - 36`.
    pub fn locate(blob: &[u8]) -> Result<Self, DecodeError> {
        let at = record_offset(blob)?;
        let raw = slice_at(blob, at, MODULE_PARAMS_SIZE, "module parameters")?;
        Ok(Self {
            autoload_list_start: read_u32_le(raw, 0x00),
            autoload_list_end: read_u32_le(raw, 0x04),
            autoload_start: read_u32_le(raw, 0x08),
            static_bss_start: read_u32_le(raw, 0x0C),
            static_bss_end: read_u32_le(raw, 0x10),
            compressed_static_end: read_u32_le(raw, COMPRESSED_END_OFFSET),
            sdk_version: read_u32_le(raw, 0x18),
            nitro_code_be: read_u32_le(raw, 0x1C),
            nitro_code_le: read_u32_le(raw, 0x20),
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_static_end != 0
    }

    /// Both SDK marker words are present.
    pub fn has_nitro_code(&self) -> bool {
        self.nitro_code_be == NITRO_CODE_BE && self.nitro_code_le == NITRO_CODE_LE
    }

    /// SDK version as "major.minor.relstep".
    pub fn sdk_version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            self.sdk_version >> 24,
            (self.sdk_version >> 16) & 0xFF,
            self.sdk_version & 0xFFFF
        )
    }
}

fn record_offset(blob: &[u8]) -> Result<usize, DecodeError> {
    blob.len()
        .checked_sub(MODULE_PARAMS_SIZE)
        .ok_or(DecodeError::truncated(
            "module parameters",
            0,
            MODULE_PARAMS_SIZE,
            blob.len(),
        ))
}

/// Decompress `blob` if its module parameters say it is compressed.
///
/// Returns the bytes and whether decompression happened. After decompressing,
/// the compressed-static-end word is cleared in the output so the result
/// reads as uncompressed. Errors from the decompressor are passed through
/// unchanged, so callers can tell "not compressed" from "failed".
pub fn decompress_if_needed(blob: &[u8]) -> Result<(Vec<u8>, bool), DecodeError> {
    let params = ModuleParams::locate(blob)?;
    if !params.is_compressed() {
        return Ok((blob.to_vec(), false));
    }

    let mut out = blz::decompress(blob)?;
    let at = record_offset(&out)? + COMPRESSED_END_OFFSET;
    out[at..at + 4].fill(0);
    Ok((out, true))
}

#[cfg(test)]
#[path = "tests/module_params_tests.rs"]
mod tests;
