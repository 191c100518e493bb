//! Shared building blocks for cartridge image decoding: the header CRC-16,
//! the error taxonomy, decode options and little-endian byte helpers.

use serde::{Deserialize, Serialize};

pub mod checksum;
pub mod error;
pub mod region;
pub mod util;

pub use checksum::{ChecksumCheck, crc16};
pub use error::DecodeError;
pub use region::Region;

/// How the file allocation table treats all-zero records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FatPolicy {
    /// One entry per 8-byte slot, so the vector index is always the file id.
    #[default]
    PreserveIndices,
    /// Drop records whose start and end are both zero. Matches older tools but
    /// shifts every later file id down.
    SkipEmpty,
}

/// Options that control how a cartridge image is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Fail the load with `ChecksumMismatch` instead of warning.
    pub strict_checksums: bool,

    /// Treatment of empty FAT records.
    pub fat_policy: FatPolicy,

    /// Undo the backward compression of the primary executable region.
    pub decompress_arm9: bool,

    /// Undo overlay compression when overlay data is requested.
    pub decompress_overlays: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_checksums: false,
            fat_policy: FatPolicy::PreserveIndices,
            decompress_arm9: true,
            decompress_overlays: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_checksums(mut self, strict: bool) -> Self {
        self.strict_checksums = strict;
        self
    }

    pub fn fat_policy(mut self, policy: FatPolicy) -> Self {
        self.fat_policy = policy;
        self
    }

    pub fn decompress_arm9(mut self, decompress: bool) -> Self {
        self.decompress_arm9 = decompress;
        self
    }

    pub fn decompress_overlays(mut self, decompress: bool) -> Self {
        self.decompress_overlays = decompress;
        self
    }
}
