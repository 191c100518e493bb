//! File name table: a main table of 8-byte directory records followed by
//! variable-length sub-tables listing each directory's children.
//!
//! Directory ids are `0xF000 + index` into the main table. The root record
//! stores the total directory count where the other records store their
//! parent id. Files carry no id in the sub-tables: a directory's files are
//! numbered consecutively from its `first_file_id` in table order.

use std::collections::HashSet;

use nitro_junk_core::DecodeError;
use nitro_junk_core::util::{read_u16_le, read_u32_le, slice_at, try_read_u16_le};
use serde::{Deserialize, Serialize};

/// Id of the root directory.
pub const ROOT_DIRECTORY_ID: u16 = 0xF000;

/// Size of one main-table record.
const DIRECTORY_RECORD_SIZE: usize = 8;

const MAX_DIRECTORIES: usize = 0x1000;

/// One record of the main directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: u16,
    /// Offset of the sub-table, relative to the start of the FNT
    pub sub_table_offset: u32,
    /// File id of the first file listed in the sub-table
    pub first_file_id: u16,
    /// `None` for the root
    pub parent: Option<u16>,
}

/// One child listed in a directory's sub-table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameEntry {
    File { name: String },
    Directory { name: String, id: u16 },
}

impl NameEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::File { name } | Self::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

/// The decoded main table plus a private copy of the FNT bytes, so
/// sub-tables can be parsed on demand.
#[derive(Debug, Clone)]
pub struct DirectoryTable {
    fnt: Vec<u8>,
    directories: Vec<DirectoryEntry>,
}

/// Decode the main directory table of the FNT at `offset`.
pub fn decode_directory_table(
    rom: &[u8],
    offset: u32,
    size: u32,
) -> Result<DirectoryTable, DecodeError> {
    let fnt = slice_at(rom, offset as usize, size as usize, "FNT")?;
    if fnt.len() < DIRECTORY_RECORD_SIZE {
        return Err(DecodeError::truncated(
            "FNT root directory",
            0,
            DIRECTORY_RECORD_SIZE,
            fnt.len(),
        ));
    }

    // Ids are 0xF000..=0xFFFF, so the count must be in 1..=0x1000. A root
    // record outside that range is not a directory table at all.
    let count = read_u16_le(fnt, 6) as usize;
    if count == 0 || count > MAX_DIRECTORIES {
        return Err(DecodeError::UnknownDirectory(ROOT_DIRECTORY_ID));
    }
    let table_len = count * DIRECTORY_RECORD_SIZE;
    if table_len > fnt.len() {
        return Err(DecodeError::truncated(
            "FNT directory table",
            0,
            table_len,
            fnt.len(),
        ));
    }

    let directories = fnt[..table_len]
        .chunks_exact(DIRECTORY_RECORD_SIZE)
        .enumerate()
        .map(|(i, record)| DirectoryEntry {
            id: ROOT_DIRECTORY_ID + i as u16,
            sub_table_offset: read_u32_le(record, 0),
            first_file_id: read_u16_le(record, 4),
            parent: (i != 0).then(|| read_u16_le(record, 6)),
        })
        .collect();

    log::debug!("FNT at 0x{:08X}: {} directories", offset, count);
    Ok(DirectoryTable {
        fnt: fnt.to_vec(),
        directories,
    })
}

impl DirectoryTable {
    pub fn directories(&self) -> &[DirectoryEntry] {
        &self.directories
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn directory(&self, id: u16) -> Option<&DirectoryEntry> {
        id.checked_sub(ROOT_DIRECTORY_ID)
            .and_then(|index| self.directories.get(index as usize))
    }

    /// Parse the sub-table of directory `id`.
    pub fn entries(&self, id: u16) -> Result<Vec<NameEntry>, DecodeError> {
        let dir = self.directory(id).ok_or(DecodeError::UnknownDirectory(id))?;
        let fnt = self.fnt.as_slice();
        let mut pos = dir.sub_table_offset as usize;
        let mut entries = Vec::new();

        loop {
            let tag = *fnt
                .get(pos)
                .ok_or(DecodeError::truncated("FNT sub-table", pos, 1, fnt.len()))?;
            if tag == 0 {
                break;
            }

            let name_len = (tag & 0x7F) as usize;
            let name = slice_at(fnt, pos + 1, name_len, "FNT entry name")?;
            let name = String::from_utf8_lossy(name).into_owned();
            pos += 1 + name_len;

            if tag & 0x80 != 0 {
                let child = try_read_u16_le(fnt, pos, "FNT directory id")?;
                pos += 2;
                entries.push(NameEntry::Directory { name, id: child });
            } else {
                entries.push(NameEntry::File { name });
            }
        }

        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tree traversal
// ---------------------------------------------------------------------------

/// What a [`TreeEntry`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeEntryKind {
    File { file_id: u16 },
    Directory { id: u16 },
}

/// One named node of the flattened tree, in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    /// Slash-separated path from the root, without a leading slash
    pub path: String,
    /// 0 for children of the root
    pub depth: usize,
    pub kind: TreeEntryKind,
}

/// The whole file system, flattened depth-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTree {
    pub entries: Vec<TreeEntry>,
}

impl FileTree {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// Every file as `(path, file_id)`.
    pub fn files(&self) -> impl Iterator<Item = (&str, u16)> {
        self.entries.iter().filter_map(|e| match e.kind {
            TreeEntryKind::File { file_id } => Some((e.path.as_str(), file_id)),
            TreeEntryKind::Directory { .. } => None,
        })
    }

    /// File id for a path such as `"data/sound.sdat"`. A leading slash is ignored.
    pub fn file_id(&self, path: &str) -> Option<u16> {
        let path = path.trim_start_matches('/');
        self.files().find(|(p, _)| *p == path).map(|(_, id)| id)
    }

    /// Path of the file with the given id.
    pub fn file_path(&self, file_id: u16) -> Option<&str> {
        self.files().find(|(_, id)| *id == file_id).map(|(p, _)| p)
    }
}

struct Frame {
    children: std::vec::IntoIter<NameEntry>,
    next_file_id: u16,
    prefix: String,
    depth: usize,
}

impl DirectoryTable {
    fn frame(&self, id: u16, prefix: String, depth: usize) -> Result<Frame, DecodeError> {
        let dir = self.directory(id).ok_or(DecodeError::UnknownDirectory(id))?;
        Ok(Frame {
            children: self.entries(id)?.into_iter(),
            next_file_id: dir.first_file_id,
            prefix,
            depth,
        })
    }

    /// Walk the tree from the root with an explicit stack. Each directory may
    /// be entered once; a second visit means the table is cyclic.
    pub fn walk(&self) -> Result<FileTree, DecodeError> {
        let mut visited = HashSet::from([ROOT_DIRECTORY_ID]);
        let mut stack = vec![self.frame(ROOT_DIRECTORY_ID, String::new(), 0)?];
        let mut tree = FileTree::default();

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.next() else {
                stack.pop();
                continue;
            };

            let depth = frame.depth;
            let path = if frame.prefix.is_empty() {
                child.name().to_string()
            } else {
                format!("{}/{}", frame.prefix, child.name())
            };

            match child {
                NameEntry::File { name } => {
                    let file_id = frame.next_file_id;
                    frame.next_file_id = frame.next_file_id.wrapping_add(1);
                    tree.entries.push(TreeEntry {
                        name,
                        path,
                        depth,
                        kind: TreeEntryKind::File { file_id },
                    });
                }
                NameEntry::Directory { name, id } => {
                    if !visited.insert(id) {
                        return Err(DecodeError::CyclicDirectoryTable(id));
                    }
                    tree.entries.push(TreeEntry {
                        name,
                        path: path.clone(),
                        depth,
                        kind: TreeEntryKind::Directory { id },
                    });
                    let next = self.frame(id, path, depth + 1)?;
                    stack.push(next);
                }
            }
        }

        Ok(tree)
    }
}

/// Decode the FNT at `offset` and flatten it into a [`FileTree`].
pub fn decode_fnt_tree(rom: &[u8], offset: u32, size: u32) -> Result<FileTree, DecodeError> {
    decode_directory_table(rom, offset, size)?.walk()
}

#[cfg(test)]
#[path = "tests/fnt_tests.rs"]
mod tests;
