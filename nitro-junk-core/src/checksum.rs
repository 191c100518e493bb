use serde::{Deserialize, Serialize};

/// CRC-16 used by cartridge headers (polynomial 0x8005, reflected, init 0xFFFF).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001; // 0xA001 is reflected 0x8005
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// A stored checksum next to the value computed from the data it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumCheck {
    /// Value found in the image
    pub stored: u16,
    /// Value recomputed over the covered byte range
    pub computed: u16,
}

impl ChecksumCheck {
    pub fn new(stored: u16, computed: u16) -> Self {
        Self { stored, computed }
    }

    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }

    /// Short human-readable verdict ("OK" or "MISMATCH (...)").
    pub fn status(&self) -> String {
        if self.is_valid() {
            "OK".into()
        } else {
            format!(
                "MISMATCH (expected {:04X}, got {:04X})",
                self.stored, self.computed
            )
        }
    }
}

#[cfg(test)]
#[path = "tests/checksum_tests.rs"]
mod tests;
