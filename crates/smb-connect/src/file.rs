//! Immutable snapshot of a remote directory entry.

use serde::{Deserialize, Serialize};

use crate::types::{DirEntry, FileAttributes};

/// The current-directory pseudo-entry name.
pub const CURRENT_DIRECTORY: &str = ".";

/// The parent-directory pseudo-entry name.
pub const PARENT_DIRECTORY: &str = "..";

/// A remote directory entry with its DOS attribute flags decoded.
///
/// Pure value type: two entries with equal fields are the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmbFile {
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Entry name, no path component.
    pub file_name: String,
    /// File size in bytes.
    pub file_length: u64,
    /// Last modification time, epoch milliseconds.
    pub last_modified: i64,
    /// DOS archive flag.
    pub archive: bool,
    /// DOS hidden flag.
    pub hidden: bool,
    /// DOS read-only flag.
    pub read_only: bool,
    /// DOS system flag.
    pub system: bool,
}

impl From<&DirEntry> for SmbFile {
    fn from(entry: &DirEntry) -> Self {
        let attrs = entry.attributes;
        Self {
            is_directory: attrs.is_directory(),
            file_name: entry.file_name.clone(),
            file_length: entry.end_of_file,
            last_modified: entry.last_write_time,
            archive: attrs.has(FileAttributes::ARCHIVE),
            hidden: attrs.has(FileAttributes::HIDDEN),
            read_only: attrs.has(FileAttributes::READONLY),
            system: attrs.has(FileAttributes::SYSTEM),
        }
    }
}

impl SmbFile {
    /// Whether this is the `.` or `..` pseudo-entry.
    pub fn is_pseudo_entry(name: &str) -> bool {
        name == CURRENT_DIRECTORY || name == PARENT_DIRECTORY
    }
}
