use thiserror::Error;

/// Errors that can occur while decoding a cartridge image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is shorter than a required fixed region
    #[error("{what} truncated: need {expected} bytes at 0x{offset:X}, buffer has {actual}")]
    TruncatedInput {
        what: &'static str,
        offset: usize,
        expected: usize,
        actual: usize,
    },

    /// A table length is not a multiple of its record size
    #[error("Malformed {table}: length {len} is not a multiple of {record_size}")]
    MalformedTable {
        table: &'static str,
        len: usize,
        record_size: usize,
    },

    /// Stored checksums disagree with the computed ones
    #[error("Checksum mismatch in {what}: stored {stored:04X}, computed {computed:04X}")]
    ChecksumMismatch {
        what: &'static str,
        stored: u16,
        computed: u16,
    },

    /// A directory was reached twice while walking the name table
    #[error("Directory table revisits directory {0:04X}")]
    CyclicDirectoryTable(u16),

    /// A directory id that is not present in the main directory table
    #[error("Directory {0:04X} is not in the directory table")]
    UnknownDirectory(u16),

    /// A compressed blob too short to hold its 8-byte footer
    #[error("Compressed blob of {0} bytes has no room for its footer")]
    TruncatedFooter(usize),

    /// Bounds violation or inconsistent footer during decompression
    #[error("Corrupt compressed stream: {0}")]
    CorruptCompressedStream(String),

    /// Footer values outside every known-valid range
    #[error("Unsupported compression variant: {0}")]
    UnsupportedCompressionVariant(String),
}

impl DecodeError {
    pub fn truncated(what: &'static str, offset: usize, expected: usize, actual: usize) -> Self {
        Self::TruncatedInput {
            what,
            offset,
            expected,
            actual,
        }
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptCompressedStream(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCompressionVariant(msg.into())
    }

    /// True for errors that mean "this is not a well-formed image" as opposed
    /// to "the compressed payload inside it is damaged".
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Self::CorruptCompressedStream(_)
                | Self::UnsupportedCompressionVariant(_)
                | Self::TruncatedFooter(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_split() {
        assert!(DecodeError::truncated("FAT", 0, 8, 4).is_structural());
        assert!(DecodeError::UnknownDirectory(0xF003).is_structural());
        assert!(!DecodeError::TruncatedFooter(3).is_structural());
        assert!(!DecodeError::corrupt("bad").is_structural());
        assert!(!DecodeError::unsupported("bad").is_structural());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DecodeError::truncated("FNT", 0x10, 8, 4).to_string(),
            "FNT truncated: need 8 bytes at 0x10, buffer has 4"
        );
        assert_eq!(
            DecodeError::CyclicDirectoryTable(0xF001).to_string(),
            "Directory table revisits directory F001"
        );
    }
}
