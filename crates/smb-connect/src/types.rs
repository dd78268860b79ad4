//! Wire-level value types consumed from the underlying SMB client.
//!
//! Numeric values follow MS-SMB2 / MS-FSCC; the connector only interprets
//! them, it never encodes them onto the wire.

/// Create disposition (how to handle an existing file on open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CreateDisposition {
    /// If exists, replace. If not exists, create.
    Supersede = 0,
    /// If exists, open. If not exists, fail.
    Open = 1,
    /// If exists, fail. If not exists, create.
    Create = 2,
    /// If exists, open. If not exists, create.
    OpenIf = 3,
    /// If exists, overwrite. If not exists, fail.
    Overwrite = 4,
    /// If exists, overwrite. If not exists, create.
    OverwriteIf = 5,
}

/// Desired access flags for an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredAccess(u32);

impl DesiredAccess {
    /// Read attributes
    pub const FILE_READ_ATTRIBUTES: u32 = 0x0000_0080;
    /// Delete
    pub const DELETE: u32 = 0x0001_0000;
    /// Synchronize
    pub const SYNCHRONIZE: u32 = 0x0010_0000;
    /// Generic read
    pub const GENERIC_READ: u32 = 0x8000_0000;
    /// Generic write
    pub const GENERIC_WRITE: u32 = 0x4000_0000;

    /// Create new access flags.
    pub fn new(flags: u32) -> Self {
        Self(flags)
    }

    /// Get the raw value.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether a flag is set.
    pub fn has(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Share access flags (what concurrent opens by other clients may do).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareAccess(u32);

impl ShareAccess {
    /// Share read
    pub const READ: u32 = 0x0000_0001;
    /// Share write
    pub const WRITE: u32 = 0x0000_0002;
    /// Share delete
    pub const DELETE: u32 = 0x0000_0004;

    /// Create new share access flags.
    pub fn new(flags: u32) -> Self {
        Self(flags)
    }

    /// Allow concurrent readers only.
    pub fn read_only() -> Self {
        Self(Self::READ)
    }

    /// Allow all sharing.
    pub fn all() -> Self {
        Self(Self::READ | Self::WRITE | Self::DELETE)
    }

    /// Get the raw value.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether a flag is set.
    pub fn has(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// DOS file attribute bitmask (MS-FSCC 2.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttributes(u64);

impl FileAttributes {
    /// Read-only
    pub const READONLY: u64 = 0x01;
    /// Hidden
    pub const HIDDEN: u64 = 0x02;
    /// System
    pub const SYSTEM: u64 = 0x04;
    /// Directory
    pub const DIRECTORY: u64 = 0x10;
    /// Archive
    pub const ARCHIVE: u64 = 0x20;

    /// Create from a raw bitmask.
    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Get the raw value.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Check whether an attribute is set.
    pub fn has(&self, attr: u64) -> bool {
        self.0 & attr == attr
    }

    /// Directory bit.
    pub fn is_directory(&self) -> bool {
        self.has(Self::DIRECTORY)
    }
}

/// Open request parameters passed through to the underlying client.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Desired access mask.
    pub access: DesiredAccess,
    /// Share access granted to concurrent opens.
    pub share_access: ShareAccess,
    /// Create disposition.
    pub disposition: CreateDisposition,
    /// Sequential-access hint (FILE_SEQUENTIAL_ONLY).
    pub sequential: bool,
}

impl OpenOptions {
    /// Read profile: concurrent readers allowed, writers/deleters excluded.
    pub fn read() -> Self {
        Self {
            access: DesiredAccess::new(DesiredAccess::GENERIC_READ),
            share_access: ShareAccess::read_only(),
            disposition: CreateDisposition::Open,
            sequential: false,
        }
    }

    /// Write profile: create or truncate, sequential hint.
    pub fn write() -> Self {
        Self {
            access: DesiredAccess::new(DesiredAccess::GENERIC_WRITE),
            share_access: ShareAccess::all(),
            disposition: CreateDisposition::OverwriteIf,
            sequential: true,
        }
    }

    /// Append profile: open or create without truncation, sequential hint.
    pub fn append() -> Self {
        Self {
            access: DesiredAccess::new(DesiredAccess::GENERIC_WRITE),
            share_access: ShareAccess::all(),
            disposition: CreateDisposition::OpenIf,
            sequential: false,
        }
    }

    /// Rename profile: attributes/delete/synchronize on an existing file.
    pub fn rename() -> Self {
        Self {
            access: DesiredAccess::new(
                DesiredAccess::FILE_READ_ATTRIBUTES
                    | DesiredAccess::DELETE
                    | DesiredAccess::SYNCHRONIZE,
            ),
            share_access: ShareAccess::all(),
            disposition: CreateDisposition::Open,
            sequential: false,
        }
    }
}

/// Raw directory listing record as reported by the underlying client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name, no path component.
    pub file_name: String,
    /// End-of-file position (file size in bytes).
    pub end_of_file: u64,
    /// Last write time, epoch milliseconds.
    pub last_write_time: i64,
    /// Attribute bitmask.
    pub attributes: FileAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_bits() {
        let attrs = FileAttributes::new(FileAttributes::DIRECTORY | FileAttributes::HIDDEN);
        assert!(attrs.is_directory());
        assert!(attrs.has(FileAttributes::HIDDEN));
        assert!(!attrs.has(FileAttributes::READONLY));
    }

    #[test]
    fn test_attribute_values() {
        assert_eq!(FileAttributes::DIRECTORY, 0x10);
        assert_eq!(FileAttributes::READONLY, 0x1);
        assert_eq!(FileAttributes::HIDDEN, 0x2);
        assert_eq!(FileAttributes::ARCHIVE, 0x20);
        assert_eq!(FileAttributes::SYSTEM, 0x4);
    }

    #[test]
    fn test_read_profile_excludes_writers() {
        let opts = OpenOptions::read();
        assert!(opts.share_access.has(ShareAccess::READ));
        assert!(!opts.share_access.has(ShareAccess::WRITE));
        assert!(!opts.share_access.has(ShareAccess::DELETE));
        assert_eq!(opts.disposition, CreateDisposition::Open);
    }

    #[test]
    fn test_write_profile_truncates() {
        let opts = OpenOptions::write();
        assert_eq!(opts.disposition, CreateDisposition::OverwriteIf);
        assert!(opts.sequential);
    }

    #[test]
    fn test_append_profile_does_not_truncate() {
        let opts = OpenOptions::append();
        assert_eq!(opts.disposition, CreateDisposition::OpenIf);
    }

    #[test]
    fn test_rename_profile_access() {
        let opts = OpenOptions::rename();
        assert!(opts.access.has(DesiredAccess::DELETE));
        assert!(opts.access.has(DesiredAccess::SYNCHRONIZE));
        assert!(opts.access.has(DesiredAccess::FILE_READ_ATTRIBUTES));
        assert!(!opts.access.has(DesiredAccess::GENERIC_WRITE));
    }
}
