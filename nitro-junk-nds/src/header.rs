//! Nintendo DS cartridge header (0x000–0x1FF).
//!
//! Every field sits at a fixed offset and all integers are little-endian. Two
//! CRC-16 values protect the header: the logo checksum at 0x15C covers the
//! 156-byte logo at 0x0C0, and the header checksum at 0x15E covers bytes
//! 0x000–0x15D. A mismatch is reported through [`ChecksumStatus`] rather than
//! failing the decode, because plenty of real dumps carry patched headers.

use nitro_junk_core::util::{encode_latin1, read_latin1, read_latin1_trimmed, read_u16_le, read_u32_le};
use nitro_junk_core::{ChecksumCheck, DecodeError, Region, crc16};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The header is always exactly 512 bytes.
pub const HEADER_SIZE: usize = 0x200;

/// Byte range covered by the logo checksum.
const LOGO_RANGE: std::ops::Range<usize> = 0x0C0..0x15C;

/// Byte range covered by the header checksum.
const HEADER_CRC_RANGE: std::ops::Range<usize> = 0x000..0x15E;

/// Logo checksum every licensed cartridge carries at 0x15C.
pub const EXPECTED_LOGO_CHECKSUM: u16 = 0xCF56;

/// Nintendo compressed logo bitmap (156 bytes at offset 0xC0), shared with the GBA.
pub const NINTENDO_LOGO: [u8; 156] = [
    0x24, 0xFF, 0xAE, 0x51, 0x69, 0x9A, 0xA2, 0x21, 0x3D, 0x84, 0x82, 0x0A, 0x84, 0xE4, 0x09, 0xAD,
    0x11, 0x24, 0x8B, 0x98, 0xC0, 0x81, 0x7F, 0x21, 0xA3, 0x52, 0xBE, 0x19, 0x93, 0x09, 0xCE, 0x20,
    0x10, 0x46, 0x4A, 0x4A, 0xF8, 0x27, 0x31, 0xEC, 0x58, 0xC7, 0xE8, 0x33, 0x82, 0xE3, 0xCE, 0xBF,
    0x85, 0xF4, 0xDF, 0x94, 0xCE, 0x4B, 0x09, 0xC1, 0x94, 0x56, 0x8A, 0xC0, 0x13, 0x72, 0xA7, 0xFC,
    0x9F, 0x84, 0x4D, 0x73, 0xA3, 0xCA, 0x9A, 0x61, 0x58, 0x97, 0xA3, 0x27, 0xFC, 0x03, 0x98, 0x76,
    0x23, 0x1D, 0xC7, 0x61, 0x03, 0x04, 0xAE, 0x56, 0xBF, 0x38, 0x84, 0x00, 0x40, 0xA7, 0x0E, 0xFD,
    0xFF, 0x52, 0xFE, 0x03, 0x6F, 0x95, 0x30, 0xF1, 0x97, 0xFB, 0xC0, 0x85, 0x60, 0xD6, 0x80, 0x25,
    0xA9, 0x63, 0xBE, 0x03, 0x01, 0x4E, 0x38, 0xE2, 0xF9, 0xA2, 0x34, 0xFF, 0xBB, 0x3E, 0x03, 0x44,
    0x78, 0x00, 0x90, 0xCB, 0x88, 0x11, 0x3A, 0x94, 0x65, 0xC0, 0x7C, 0x63, 0x87, 0xF0, 0x3C, 0xAF,
    0xD6, 0x25, 0xE4, 0x8B, 0x38, 0x0A, 0xAC, 0x72, 0x21, 0xD4, 0xF8, 0x07,
];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One of the two boot executables (ARM9 at 0x020, ARM7 at 0x030).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableRegion {
    /// Where the code starts in the ROM image
    pub rom_offset: u32,
    /// First instruction executed after loading
    pub entry_address: u32,
    /// Where the code is copied to in RAM
    pub ram_address: u32,
    /// Number of bytes copied
    pub size: u32,
}

impl ExecutableRegion {
    fn decode(buf: &[u8], at: usize) -> Self {
        Self {
            rom_offset: read_u32_le(buf, at),
            entry_address: read_u32_le(buf, at + 4),
            ram_address: read_u32_le(buf, at + 8),
            size: read_u32_le(buf, at + 12),
        }
    }

    fn encode(&self, out: &mut [u8], at: usize) {
        put_u32(out, at, self.rom_offset);
        put_u32(out, at + 4, self.entry_address);
        put_u32(out, at + 8, self.ram_address);
        put_u32(out, at + 12, self.size);
    }
}

/// An (offset, size) pair locating a table inside the ROM image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLocation {
    pub offset: u32,
    pub size: u32,
}

impl TableLocation {
    fn decode(buf: &[u8], at: usize) -> Self {
        Self {
            offset: read_u32_le(buf, at),
            size: read_u32_le(buf, at + 4),
        }
    }

    fn encode(&self, out: &mut [u8], at: usize) {
        put_u32(out, at, self.offset);
        put_u32(out, at + 4, self.size);
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Debug ROM descriptor at 0x160 (zero on retail cartridges).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugRegion {
    pub rom_offset: u32,
    pub size: u32,
    pub ram_address: u32,
}

/// Parsed NDS cartridge header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeHeader {
    /// Game title (0x000, 12 bytes, trailing NULs removed)
    pub title: String,
    /// Game code (0x00C, 4 bytes), e.g. "ADME"
    pub game_code: String,
    /// Maker code (0x010, 2 bytes), e.g. "01"
    pub maker_code: String,
    pub unit_code: u8,
    pub encryption_seed_select: u8,
    pub device_capacity: u8,
    /// 0x015–0x01D; the last byte is the region lock
    pub reserved1: [u8; 9],
    pub rom_version: u8,
    pub autostart: u8,
    pub arm9: ExecutableRegion,
    pub arm7: ExecutableRegion,
    pub fnt: TableLocation,
    pub fat: TableLocation,
    pub arm9_overlays: TableLocation,
    pub arm7_overlays: TableLocation,
    /// Port 0x40001A4 setting for normal commands
    pub port_normal: u32,
    /// Port 0x40001A4 setting for KEY1 commands
    pub port_key1: u32,
    pub icon_title_offset: u32,
    pub secure_area_checksum: u16,
    pub secure_area_delay: u16,
    pub arm9_autoload_list: u32,
    pub arm7_autoload_list: u32,
    pub secure_area_disable: [u8; 8],
    pub total_used_rom_size: u32,
    pub header_size: u32,
    /// 0x088–0x0BF
    pub reserved2: Vec<u8>,
    /// 0x0C0–0x15B
    pub logo: Vec<u8>,
    pub logo_checksum: u16,
    pub header_checksum: u16,
    pub debug: DebugRegion,
    pub reserved3: u32,
    /// 0x170–0x1FF
    pub reserved4: Vec<u8>,
}

/// Result of validating both header checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumStatus {
    /// Logo CRC-16 at 0x15C over 0x0C0–0x15B
    pub logo: ChecksumCheck,
    /// Header CRC-16 at 0x15E over 0x000–0x15D
    pub header: ChecksumCheck,
}

impl ChecksumStatus {
    pub fn is_valid(&self) -> bool {
        self.logo.is_valid() && self.header.is_valid()
    }

    /// The first failing check as an error, for callers that refuse to load
    /// a cartridge with a bad header.
    pub fn to_error(&self) -> Option<DecodeError> {
        [("logo checksum", self.logo), ("header checksum", self.header)]
            .into_iter()
            .find(|(_, check)| !check.is_valid())
            .map(|(what, check)| DecodeError::ChecksumMismatch {
                what,
                stored: check.stored,
                computed: check.computed,
            })
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn put_u16(out: &mut [u8], at: usize, value: u16) {
    out[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Copy `src` into `out[at..at + len]`, zero-filling whatever `src` lacks.
fn put_bytes(out: &mut [u8], at: usize, len: usize, src: &[u8]) {
    let field = &mut out[at..at + len];
    field.fill(0);
    let n = src.len().min(len);
    field[..n].copy_from_slice(&src[..n]);
}

/// Recompute both checksums over a raw header.
fn checksum_status_of(raw: &[u8]) -> ChecksumStatus {
    ChecksumStatus {
        logo: ChecksumCheck::new(read_u16_le(raw, 0x15C), crc16(&raw[LOGO_RANGE])),
        header: ChecksumCheck::new(read_u16_le(raw, 0x15E), crc16(&raw[HEADER_CRC_RANGE])),
    }
}

/// Decode the 512-byte header at the start of `rom` and validate its checksums.
pub fn decode_header(rom: &[u8]) -> Result<(CartridgeHeader, ChecksumStatus), DecodeError> {
    let buf = rom
        .get(..HEADER_SIZE)
        .ok_or(DecodeError::truncated("cartridge header", 0, HEADER_SIZE, rom.len()))?;

    let mut reserved1 = [0u8; 9];
    reserved1.copy_from_slice(&buf[0x015..0x01E]);
    let mut secure_area_disable = [0u8; 8];
    secure_area_disable.copy_from_slice(&buf[0x078..0x080]);

    let header = CartridgeHeader {
        title: read_latin1_trimmed(&buf[0x000..0x00C]),
        game_code: read_latin1(&buf[0x00C..0x010]),
        maker_code: read_latin1(&buf[0x010..0x012]),
        unit_code: buf[0x012],
        encryption_seed_select: buf[0x013],
        device_capacity: buf[0x014],
        reserved1,
        rom_version: buf[0x01E],
        autostart: buf[0x01F],
        arm9: ExecutableRegion::decode(buf, 0x020),
        arm7: ExecutableRegion::decode(buf, 0x030),
        fnt: TableLocation::decode(buf, 0x040),
        fat: TableLocation::decode(buf, 0x048),
        arm9_overlays: TableLocation::decode(buf, 0x050),
        arm7_overlays: TableLocation::decode(buf, 0x058),
        port_normal: read_u32_le(buf, 0x060),
        port_key1: read_u32_le(buf, 0x064),
        icon_title_offset: read_u32_le(buf, 0x068),
        secure_area_checksum: read_u16_le(buf, 0x06C),
        secure_area_delay: read_u16_le(buf, 0x06E),
        arm9_autoload_list: read_u32_le(buf, 0x070),
        arm7_autoload_list: read_u32_le(buf, 0x074),
        secure_area_disable,
        total_used_rom_size: read_u32_le(buf, 0x080),
        header_size: read_u32_le(buf, 0x084),
        reserved2: buf[0x088..0x0C0].to_vec(),
        logo: buf[LOGO_RANGE].to_vec(),
        logo_checksum: read_u16_le(buf, 0x15C),
        header_checksum: read_u16_le(buf, 0x15E),
        debug: DebugRegion {
            rom_offset: read_u32_le(buf, 0x160),
            size: read_u32_le(buf, 0x164),
            ram_address: read_u32_le(buf, 0x168),
        },
        reserved3: read_u32_le(buf, 0x16C),
        reserved4: buf[0x170..0x200].to_vec(),
    };

    let status = checksum_status_of(buf);
    log::debug!(
        "NDS header '{}' ({}): logo CRC {}, header CRC {}",
        header.title,
        header.game_code,
        status.logo.status(),
        status.header.status()
    );
    Ok((header, status))
}

impl CartridgeHeader {
    /// Re-encode the record into its 512-byte on-cartridge form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        encode_latin1(&self.title, &mut out[0x000..0x00C]);
        encode_latin1(&self.game_code, &mut out[0x00C..0x010]);
        encode_latin1(&self.maker_code, &mut out[0x010..0x012]);
        out[0x012] = self.unit_code;
        out[0x013] = self.encryption_seed_select;
        out[0x014] = self.device_capacity;
        out[0x015..0x01E].copy_from_slice(&self.reserved1);
        out[0x01E] = self.rom_version;
        out[0x01F] = self.autostart;
        self.arm9.encode(&mut out, 0x020);
        self.arm7.encode(&mut out, 0x030);
        self.fnt.encode(&mut out, 0x040);
        self.fat.encode(&mut out, 0x048);
        self.arm9_overlays.encode(&mut out, 0x050);
        self.arm7_overlays.encode(&mut out, 0x058);
        put_u32(&mut out, 0x060, self.port_normal);
        put_u32(&mut out, 0x064, self.port_key1);
        put_u32(&mut out, 0x068, self.icon_title_offset);
        put_u16(&mut out, 0x06C, self.secure_area_checksum);
        put_u16(&mut out, 0x06E, self.secure_area_delay);
        put_u32(&mut out, 0x070, self.arm9_autoload_list);
        put_u32(&mut out, 0x074, self.arm7_autoload_list);
        out[0x078..0x080].copy_from_slice(&self.secure_area_disable);
        put_u32(&mut out, 0x080, self.total_used_rom_size);
        put_u32(&mut out, 0x084, self.header_size);
        put_bytes(&mut out, 0x088, 0x38, &self.reserved2);
        put_bytes(&mut out, 0x0C0, LOGO_RANGE.len(), &self.logo);
        put_u16(&mut out, 0x15C, self.logo_checksum);
        put_u16(&mut out, 0x15E, self.header_checksum);
        put_u32(&mut out, 0x160, self.debug.rom_offset);
        put_u32(&mut out, 0x164, self.debug.size);
        put_u32(&mut out, 0x168, self.debug.ram_address);
        put_u32(&mut out, 0x16C, self.reserved3);
        put_bytes(&mut out, 0x170, 0x90, &self.reserved4);
        out
    }

    /// Checksums recomputed from the record's current field values.
    pub fn checksum_status(&self) -> ChecksumStatus {
        checksum_status_of(&self.to_bytes())
    }

    /// Store freshly computed checksums, e.g. after editing fields.
    pub fn update_checksums(&mut self) {
        let mut raw = self.to_bytes();
        self.logo_checksum = crc16(&raw[LOGO_RANGE]);
        put_u16(&mut raw, 0x15C, self.logo_checksum);
        self.header_checksum = crc16(&raw[HEADER_CRC_RANGE]);
    }

    pub fn has_nintendo_logo(&self) -> bool {
        self.logo == NINTENDO_LOGO
    }

    /// Unit code bit 1 marks DSi-enhanced or DSi-exclusive titles.
    pub fn is_dsi(&self) -> bool {
        self.unit_code & 0x02 != 0
    }

    pub fn unit_code_name(&self) -> &'static str {
        match self.unit_code {
            0x00 => "NDS",
            0x02 => "NDS+DSi",
            0x03 => "DSi",
            _ => "Unknown",
        }
    }

    /// Serial number: NTR-XXXX for NDS, TWL-XXXX for DSi.
    pub fn serial(&self) -> Option<String> {
        if self.game_code.chars().count() != 4 {
            return None;
        }
        let prefix = if self.is_dsi() { "TWL" } else { "NTR" };
        Some(format!("{}-{}", prefix, self.game_code))
    }

    /// Region from the 4th character of the game code.
    pub fn region(&self) -> Option<Region> {
        self.game_code.chars().nth(3).and_then(Region::from_game_code_char)
    }

    /// Region lock byte at 0x01D.
    pub fn region_lock(&self) -> &'static str {
        match self.reserved1[8] {
            0x00 => "Normal",
            0x40 => "Korea",
            0x80 => "China",
            _ => "Unknown",
        }
    }

    pub fn maker_name(&self) -> Option<&'static str> {
        maker_code_name(&self.maker_code)
    }

    /// Cartridge chip capacity: 128 KB << n. `None` for nonsensical values.
    pub fn chip_capacity(&self) -> Option<u64> {
        (self.device_capacity <= 12).then(|| 131_072u64 << self.device_capacity)
    }
}

/// Look up maker/publisher name from the 2-character ASCII code.
fn maker_code_name(code: &str) -> Option<&'static str> {
    match code {
        "01" => Some("Nintendo"),
        "08" => Some("Capcom"),
        "13" => Some("EA (Electronic Arts)"),
        "18" => Some("Hudson Soft"),
        "20" => Some("Destination Software"),
        "41" => Some("Ubi Soft"),
        "4F" => Some("Eidos"),
        "52" => Some("Activision"),
        "5G" => Some("Majesco"),
        "69" => Some("EA (Electronic Arts)"),
        "78" => Some("THQ"),
        "7D" => Some("Vivendi"),
        "8P" => Some("Sega"),
        "A4" => Some("Konami"),
        "AF" => Some("Namco Bandai"),
        "B2" => Some("Bandai"),
        "EB" => Some("Atlus"),
        "GT" => Some("2K Games"),
        "HF" => Some("Level-5"),
        "XS" => Some("Aksys Games"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/header_tests.rs"]
mod tests;
