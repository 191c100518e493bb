//! Nintendo DS cartridge image decoding.
//!
//! - [`header`]: the 512-byte cartridge header and its two CRC-16 checks
//! - [`fat`]: file allocation table
//! - [`fnt`]: file name table and directory tree
//! - [`overlay`]: ARM9/ARM7 overlay tables
//! - [`blz`]: backward LZ decompression of executables and overlays
//! - [`module_params`]: compression detection for the ARM9 binary
//! - [`rom`]: one-shot loading of a whole image
//!
//! Every decoder is a pure function over an immutable byte slice and returns
//! owned records, so independent decodes of one image may run on separate
//! threads.

pub mod blz;
pub mod fat;
pub mod fnt;
pub mod header;
pub mod module_params;
pub mod overlay;
pub mod rom;

pub use blz::{CompressionFooter, decompress};
pub use fat::{FatEntry, decode_fat, decode_fat_with_policy};
pub use fnt::{
    DirectoryEntry, DirectoryTable, FileTree, NameEntry, ROOT_DIRECTORY_ID, TreeEntry,
    TreeEntryKind, decode_directory_table, decode_fnt_tree,
};
pub use header::{CartridgeHeader, ChecksumStatus, decode_header};
pub use module_params::{ModuleParams, decompress_if_needed};
pub use overlay::{OverlayEntry, decode_overlay_table, load_overlay};
pub use rom::{ExecutableImage, NdsRom, Segment};

pub use nitro_junk_core::{DecodeError, DecodeOptions, FatPolicy};
