//! Whole-image loading: header, tables and boot executables in one pass.

use nitro_junk_core::util::{format_bytes, slice_at};
use nitro_junk_core::{DecodeError, DecodeOptions};
use serde::Serialize;

use crate::fat::{FatEntry, decode_fat_with_policy};
use crate::fnt::{FileTree, decode_fnt_tree};
use crate::header::{
    CartridgeHeader, ChecksumStatus, EXPECTED_LOGO_CHECKSUM, ExecutableRegion, decode_header,
};
use crate::module_params::{MODULE_PARAMS_SIZE, decompress_if_needed};
use crate::overlay::{OverlayEntry, decode_overlay_table, load_overlay};

/// Where a host should map one boot executable. `size` is the size of the
/// mapped image, which for a decompressed ARM9 exceeds the stored size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// "ARM9" or "ARM7"
    pub name: &'static str,
    /// Symbol to define at the entry address
    pub symbol_name: &'static str,
    pub rom_offset: u32,
    pub load_address: u32,
    pub size: u32,
    pub entry_address: u32,
}

impl Segment {
    fn new(name: &'static str, symbol_name: &'static str, region: &ExecutableRegion) -> Self {
        Self {
            name,
            symbol_name,
            rom_offset: region.rom_offset,
            load_address: region.ram_address,
            size: region.size,
            entry_address: region.entry_address,
        }
    }
}

/// A boot executable's bytes as they should appear in RAM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableImage {
    pub segment: Segment,
    pub data: Vec<u8>,
    /// The backward compression was undone
    pub was_compressed: bool,
}

/// A fully decoded cartridge image.
#[derive(Debug, Clone)]
pub struct NdsRom {
    pub header: CartridgeHeader,
    pub checksums: ChecksumStatus,
    pub fat: Vec<FatEntry>,
    pub files: FileTree,
    pub arm9_overlays: Vec<OverlayEntry>,
    pub arm7_overlays: Vec<OverlayEntry>,
    pub arm9: ExecutableImage,
    pub arm7: ExecutableImage,
    options: DecodeOptions,
}

impl NdsRom {
    /// Format probe: the header decodes and both checksums match.
    pub fn is_valid(rom: &[u8]) -> bool {
        matches!(decode_header(rom), Ok((_, status)) if status.is_valid())
    }

    /// Decode everything the header points at.
    pub fn read(rom: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        let (header, checksums) = decode_header(rom)?;
        if let Some(err) = checksums.to_error() {
            if options.strict_checksums {
                return Err(err);
            }
            log::warn!("{err}; continuing with the decoded header");
        }
        if !header.has_nintendo_logo() {
            log::debug!(
                "Header logo differs from the Nintendo logo (CRC {:04X}, expected {:04X})",
                checksums.logo.computed,
                EXPECTED_LOGO_CHECKSUM
            );
        }

        let fat = if header.fat.is_empty() {
            Vec::new()
        } else {
            decode_fat_with_policy(rom, header.fat.offset, header.fat.size, options.fat_policy)?
        };
        let files = if header.fnt.is_empty() {
            FileTree::default()
        } else {
            decode_fnt_tree(rom, header.fnt.offset, header.fnt.size)?
        };
        let arm9_overlays =
            decode_overlay_table(rom, header.arm9_overlays.offset, header.arm9_overlays.size)?;
        let arm7_overlays =
            decode_overlay_table(rom, header.arm7_overlays.offset, header.arm7_overlays.size)?;

        let arm9 = load_arm9(rom, &header.arm9, options.decompress_arm9)?;
        let arm7 = ExecutableImage {
            segment: Segment::new("ARM7", "_start7", &header.arm7),
            data: region_bytes(rom, &header.arm7, "ARM7 binary")?.to_vec(),
            was_compressed: false,
        };

        for image in [&arm9, &arm7] {
            log::info!(
                "{} entry=0x{:08x}, load=0x{:08x}, size=0x{:08x}, offset=0x{:08x} ({})",
                image.segment.name,
                image.segment.entry_address,
                image.segment.load_address,
                image.segment.size,
                image.segment.rom_offset,
                format_bytes(image.data.len() as u64)
            );
        }

        Ok(Self {
            header,
            checksums,
            fat,
            files,
            arm9_overlays,
            arm7_overlays,
            arm9,
            arm7,
            options: options.clone(),
        })
    }

    /// The two segments a host maps, ARM9 first.
    pub fn segments(&self) -> [Segment; 2] {
        [self.arm9.segment, self.arm7.segment]
    }

    /// Program entry point (the ARM9 entry address).
    pub fn entry_point(&self) -> u32 {
        self.header.arm9.entry_address
    }

    fn fat_entry(&self, index: usize) -> Result<&FatEntry, DecodeError> {
        self.fat
            .get(index)
            .ok_or(DecodeError::truncated("FAT entry", index, 1, self.fat.len()))
    }

    /// Raw bytes of a file by id.
    pub fn file_data<'a>(&self, rom: &'a [u8], file_id: u16) -> Result<&'a [u8], DecodeError> {
        self.fat_entry(file_id as usize)?.data(rom)
    }

    /// Raw bytes of a file by path. `Ok(None)` means no such path; a path
    /// whose FAT range is bad is an error.
    pub fn file_by_path<'a>(
        &self,
        rom: &'a [u8],
        path: &str,
    ) -> Result<Option<&'a [u8]>, DecodeError> {
        self.files
            .file_id(path)
            .map(|id| self.file_data(rom, id))
            .transpose()
    }

    /// An overlay's bytes, decompressed when flagged and enabled in the options.
    pub fn overlay_data(&self, rom: &[u8], entry: &OverlayEntry) -> Result<Vec<u8>, DecodeError> {
        if self.options.decompress_overlays {
            return load_overlay(rom, &self.fat, entry).map(|(data, _)| data);
        }
        self.fat_entry(entry.file_id as usize)?
            .data(rom)
            .map(<[u8]>::to_vec)
    }
}

fn region_bytes<'a>(
    rom: &'a [u8],
    region: &ExecutableRegion,
    what: &'static str,
) -> Result<&'a [u8], DecodeError> {
    slice_at(rom, region.rom_offset as usize, region.size as usize, what)
}

/// Load the ARM9 binary, falling back to the stored bytes if decompression fails.
fn load_arm9(
    rom: &[u8],
    region: &ExecutableRegion,
    decompress: bool,
) -> Result<ExecutableImage, DecodeError> {
    let raw = region_bytes(rom, region, "ARM9 binary")?;
    let mut segment = Segment::new("ARM9", "_start9", region);

    let too_short = raw.len() < MODULE_PARAMS_SIZE;
    if too_short {
        log::debug!(
            "ARM9 binary is {} bytes, too short for module parameters; treating as uncompressed",
            raw.len()
        );
    }
    if !decompress || too_short {
        return Ok(ExecutableImage {
            segment,
            data: raw.to_vec(),
            was_compressed: false,
        });
    }

    let (data, was_compressed) = match decompress_if_needed(raw) {
        Ok(result) => result,
        Err(e) if !e.is_structural() => {
            log::warn!("ARM9 decompression failed ({e}); using stored bytes");
            (raw.to_vec(), false)
        }
        Err(e) => return Err(e),
    };
    if was_compressed {
        segment.size = data.len() as u32;
    }
    Ok(ExecutableImage {
        segment,
        data,
        was_compressed,
    })
}

#[cfg(test)]
#[path = "tests/rom_tests.rs"]
mod tests;
