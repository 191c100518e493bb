//! Overlay tables: 32-byte records describing relocatable code modules that
//! are loaded from the FAT on demand.

use nitro_junk_core::DecodeError;
use nitro_junk_core::util::{read_u32_le, slice_at};
use serde::{Deserialize, Serialize};

use crate::blz;
use crate::fat::FatEntry;

/// Size of one overlay table record.
pub const OVERLAY_RECORD_SIZE: usize = 32;

/// Flag bit in the last word marking a compressed overlay file.
pub const COMPRESSED_FLAG: u32 = 1 << 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    pub overlay_id: u32,
    pub ram_address: u32,
    pub ram_size: u32,
    pub bss_size: u32,
    pub static_initializer_start: u32,
    pub static_initializer_end: u32,
    pub file_id: u32,
    /// Low 24 bits: compressed size; bit 24: compressed flag
    pub reserved: u32,
}

impl OverlayEntry {
    fn decode(record: &[u8]) -> Self {
        Self {
            overlay_id: read_u32_le(record, 0x00),
            ram_address: read_u32_le(record, 0x04),
            ram_size: read_u32_le(record, 0x08),
            bss_size: read_u32_le(record, 0x0C),
            static_initializer_start: read_u32_le(record, 0x10),
            static_initializer_end: read_u32_le(record, 0x14),
            file_id: read_u32_le(record, 0x18),
            reserved: read_u32_le(record, 0x1C),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.reserved & COMPRESSED_FLAG != 0
    }

    pub fn compressed_size(&self) -> u32 {
        self.reserved & 0x00FF_FFFF
    }
}

/// Decode the overlay table at `offset`. An empty table yields no entries.
pub fn decode_overlay_table(
    rom: &[u8],
    offset: u32,
    size: u32,
) -> Result<Vec<OverlayEntry>, DecodeError> {
    let size = size as usize;
    if size % OVERLAY_RECORD_SIZE != 0 {
        return Err(DecodeError::MalformedTable {
            table: "overlay table",
            len: size,
            record_size: OVERLAY_RECORD_SIZE,
        });
    }
    if size == 0 {
        return Ok(Vec::new());
    }

    let table = slice_at(rom, offset as usize, size, "overlay table")?;
    Ok(table
        .chunks_exact(OVERLAY_RECORD_SIZE)
        .map(OverlayEntry::decode)
        .collect())
}

/// Fetch an overlay's file through the FAT, decompressing it when flagged.
///
/// Returns the bytes and whether decompression was applied.
pub fn load_overlay(
    rom: &[u8],
    fat: &[FatEntry],
    entry: &OverlayEntry,
) -> Result<(Vec<u8>, bool), DecodeError> {
    let file = fat
        .get(entry.file_id as usize)
        .ok_or(DecodeError::truncated(
            "FAT entry for overlay",
            entry.file_id as usize,
            1,
            fat.len(),
        ))?;
    let data = file.data(rom)?;

    if !entry.is_compressed() {
        return Ok((data.to_vec(), false));
    }

    log::debug!(
        "Overlay {} (file {}) compressed, {} bytes",
        entry.overlay_id,
        entry.file_id,
        entry.compressed_size()
    );
    blz::decompress(data).map(|out| (out, true))
}

#[cfg(test)]
#[path = "tests/overlay_tests.rs"]
mod tests;
