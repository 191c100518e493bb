//! File allocation table: a flat array of (start, end) ROM offsets indexed by
//! file id.

use nitro_junk_core::util::{read_u32_le, slice_at};
use nitro_junk_core::{DecodeError, FatPolicy};
use serde::{Deserialize, Serialize};

/// Size of one FAT record.
pub const FAT_RECORD_SIZE: usize = 8;

/// Byte range of one file inside the ROM image. `end` is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatEntry {
    pub start: u32,
    pub end: u32,
}

impl FatEntry {
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow this file's bytes from the ROM image.
    pub fn data<'a>(&self, rom: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        if self.end < self.start {
            return Err(DecodeError::truncated(
                "FAT file range",
                self.start as usize,
                0,
                rom.len(),
            ));
        }
        slice_at(rom, self.start as usize, self.len() as usize, "FAT file")
    }
}

/// Decode the FAT at `offset`, one entry per 8-byte record.
pub fn decode_fat(rom: &[u8], offset: u32, size: u32) -> Result<Vec<FatEntry>, DecodeError> {
    decode_fat_with_policy(rom, offset, size, FatPolicy::PreserveIndices)
}

/// Decode the FAT, optionally dropping all-zero records.
pub fn decode_fat_with_policy(
    rom: &[u8],
    offset: u32,
    size: u32,
    policy: FatPolicy,
) -> Result<Vec<FatEntry>, DecodeError> {
    let size = size as usize;
    if size % FAT_RECORD_SIZE != 0 {
        return Err(DecodeError::MalformedTable {
            table: "FAT",
            len: size,
            record_size: FAT_RECORD_SIZE,
        });
    }
    let table = slice_at(rom, offset as usize, size, "FAT")?;

    let entries: Vec<FatEntry> = table
        .chunks_exact(FAT_RECORD_SIZE)
        .map(|record| FatEntry {
            start: read_u32_le(record, 0),
            end: read_u32_le(record, 4),
        })
        .filter(|entry| {
            policy == FatPolicy::PreserveIndices || entry.start != 0 || entry.end != 0
        })
        .collect();

    log::debug!(
        "FAT at 0x{:08X}: {} records, {} kept",
        offset,
        size / FAT_RECORD_SIZE,
        entries.len()
    );
    Ok(entries)
}

#[cfg(test)]
#[path = "tests/fat_tests.rs"]
mod tests;
