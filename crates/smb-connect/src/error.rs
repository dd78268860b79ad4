//! Error taxonomy for the connector and the underlying-client boundary.
//!
//! Two layers: [`TransportError`] is what the pluggable SMB client library
//! reports, [`SmbError`] is what connector operations surface to callers.
//! Every operation failure is wrapped exactly once with the operation target;
//! nothing is retried internally.

use thiserror::Error;

/// Connector-level result type.
pub type Result<T> = std::result::Result<T, SmbError>;

/// NT status codes the client layer cares about (subset of MS-ERREF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NtStatus {
    /// Success
    Success = 0x00000000,
    /// End of file
    EndOfFile = 0xC0000011,
    /// Access denied
    AccessDenied = 0xC0000022,
    /// No such file
    NoSuchFile = 0xC000000F,
    /// Object name not found
    ObjectNameNotFound = 0xC0000034,
    /// Object name collision (already exists)
    ObjectNameCollision = 0xC0000035,
    /// Object path not found
    ObjectPathNotFound = 0xC000003A,
    /// Sharing violation
    SharingViolation = 0xC0000043,
    /// Logon failure
    LogonFailure = 0xC000006D,
    /// Bad network name (share not found)
    BadNetworkName = 0xC00000CC,
    /// Path not covered by this server (DFS referral required)
    PathNotCovered = 0xC0000257,
    /// User session deleted
    UserSessionDeleted = 0xC0000203,
}

impl NtStatus {
    /// Check if this is a success status.
    pub fn is_success(&self) -> bool {
        (*self as u32) < 0x40000000
    }

    /// Check if this is an error status.
    pub fn is_error(&self) -> bool {
        (*self as u32) >= 0x80000000
    }

    /// Get the raw value.
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }
}

impl std::fmt::Display for NtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (0x{:08X})", self, *self as u32)
    }
}

/// Errors reported by the underlying SMB client library at the trait
/// boundary (transport connect, session setup, share and file calls).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection refused to {host}:{port}")]
    ConnectionRefused { host: String, port: u16 },

    #[error("not connected")]
    NotConnected,

    #[error("authentication rejected for {username}")]
    AuthRejected { username: String },

    #[error("server returned {0}")]
    Status(NtStatus),

    #[error("share not found: {0}")]
    ShareNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True when the failure is the server saying "name already exists".
    pub fn is_name_collision(&self) -> bool {
        matches!(self, TransportError::Status(NtStatus::ObjectNameCollision))
    }
}

/// Connector operation failures, one variant per failure class.
///
/// `Authentication` and `CrossShareRename` are configuration/policy defects
/// and carry no transport cause; the rest wrap the underlying fault together
/// with the target the operation was addressing.
#[derive(Debug, Error)]
pub enum SmbError {
    #[error("cannot connect to {host}:{port}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    #[error("missing credential: {0} must be configured")]
    Authentication(&'static str),

    #[error("DFS resolution failed for {path}")]
    DfsResolution {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot list directory: {path}")]
    List {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot retrieve file: {path}")]
    Retrieve {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot store file: {path}")]
    Store {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot delete file: {path}")]
    Delete {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot determine if file exists: {path}")]
    Exists {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot build directory: {path}")]
    Mkdir {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot rename {from} to {to}")]
    Rename {
        from: String,
        to: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot rename across shares: {from} and {to} resolve to different shares")]
    CrossShareRename { from: String, to: String },

    #[error("share is not connected")]
    NotConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntstatus_success() {
        assert!(NtStatus::Success.is_success());
        assert!(!NtStatus::Success.is_error());
    }

    #[test]
    fn test_ntstatus_error() {
        assert!(NtStatus::AccessDenied.is_error());
        assert!(NtStatus::PathNotCovered.is_error());
        assert!(!NtStatus::LogonFailure.is_success());
    }

    #[test]
    fn test_ntstatus_raw_value() {
        assert_eq!(NtStatus::PathNotCovered.as_u32(), 0xC0000257);
        assert_eq!(NtStatus::ObjectNameCollision.as_u32(), 0xC0000035);
    }

    #[test]
    fn test_ntstatus_display() {
        let s = NtStatus::BadNetworkName.to_string();
        assert!(s.contains("BadNetworkName"));
        assert!(s.contains("0xC00000CC"));
    }

    #[test]
    fn test_name_collision_detection() {
        assert!(TransportError::Status(NtStatus::ObjectNameCollision).is_name_collision());
        assert!(!TransportError::Status(NtStatus::AccessDenied).is_name_collision());
        assert!(!TransportError::NotConnected.is_name_collision());
    }

    #[test]
    fn test_error_carries_target_path() {
        let err = SmbError::Retrieve {
            path: "reports\\q3.csv".into(),
            source: TransportError::Status(NtStatus::ObjectNameNotFound),
        };
        let msg = err.to_string();
        assert!(msg.contains("reports\\q3.csv"));
    }

    #[test]
    fn test_cross_share_rename_message() {
        let err = SmbError::CrossShareRename {
            from: "docs\\a.txt".into(),
            to: "archive\\a.txt".into(),
        };
        assert!(err.to_string().contains("different shares"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err = SmbError::Connection {
            host: "fileserver".into(),
            port: 445,
            source: TransportError::ConnectionRefused {
                host: "fileserver".into(),
                port: 445,
            },
        };
        assert!(err.source().is_some());
    }
}
