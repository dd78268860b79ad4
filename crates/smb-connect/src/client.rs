//! Abstraction over the underlying SMB client library.
//!
//! The connector does not speak the SMB2 wire protocol itself. It drives a
//! wire-level client through these traits: a [`SmbTransport`] dials hosts, a
//! [`SmbConnection`] authenticates sessions, a [`SmbSession`] mounts shares
//! and answers DFS referral probes, and a [`DiskShare`] performs the actual
//! file calls. The in-memory backend in [`crate::memory`] implements the
//! same traits for tests and local development.

use std::sync::Arc;

use crate::error::{NtStatus, TransportError};
use crate::path::SmbPath;
use crate::types::{DirEntry, OpenOptions};

/// Boundary result type.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Credentials for session setup.
///
/// Username and password are mandatory at this layer; their absence is a
/// configuration error callers must catch before reaching the transport.
#[derive(Clone)]
pub struct AuthContext {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Authentication domain, if any.
    pub domain: Option<String>,
}

impl AuthContext {
    /// Create a new authentication context.
    pub fn new(username: impl Into<String>, password: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain,
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Factory for transport-level connections to SMB servers.
pub trait SmbTransport: Send + Sync + 'static {
    /// Establish a transport connection to `host:port`.
    fn connect(&self, host: &str, port: u16) -> TransportResult<Arc<dyn SmbConnection>>;
}

/// A transport-level link to one server endpoint.
///
/// A connection may carry multiple authenticated sessions; session setup on
/// a shared connection is not assumed concurrency-safe by the connector.
pub trait SmbConnection: Send + Sync {
    /// Authenticate a new session on this connection.
    fn authenticate(&self, auth: &AuthContext) -> TransportResult<Box<dyn SmbSession>>;

    /// Whether the transport link is still up.
    fn is_connected(&self) -> bool;

    /// Hostname this connection was established against.
    fn remote_hostname(&self) -> &str;
}

impl std::fmt::Debug for dyn SmbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmbConnection")
            .field("remote_hostname", &self.remote_hostname())
            .finish_non_exhaustive()
    }
}

/// An authenticated principal bound to one connection.
pub trait SmbSession: Send {
    /// Mount a share by name.
    fn connect_share(&self, share_name: &str) -> TransportResult<Box<dyn DiskShare>>;

    /// Run the library's DFS referral resolution for `path`.
    ///
    /// `probe_status` is the status hint that forces resolution to run
    /// (normally [`NtStatus::PathNotCovered`]). Returns the path the client
    /// should actually address: the input path when it is not part of a DFS
    /// namespace, a rewritten host/share/path when the server redirects.
    fn resolve_path(&self, path: &SmbPath, probe_status: NtStatus) -> TransportResult<SmbPath>;

    /// Hostname of the server this session is authenticated against.
    fn remote_hostname(&self) -> &str;

    /// Release the session.
    fn logoff(&mut self) -> TransportResult<()>;
}

impl std::fmt::Debug for dyn SmbSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmbSession")
            .field("remote_hostname", &self.remote_hostname())
            .finish_non_exhaustive()
    }
}

/// A mounted share handle.
pub trait DiskShare: Send {
    /// Name of the mounted share.
    fn share_name(&self) -> &str;

    /// Enumerate directory entries at `path` (share-relative), in server order.
    fn list(&self, path: &str) -> TransportResult<Vec<DirEntry>>;

    /// Open a file with the given options.
    fn open(&self, path: &str, options: &OpenOptions) -> TransportResult<Box<dyn RemoteFile>>;

    /// Whether a regular file exists at `path`.
    fn file_exists(&self, path: &str) -> TransportResult<bool>;

    /// Whether a folder exists at `path`.
    fn folder_exists(&self, path: &str) -> TransportResult<bool>;

    /// Create a single directory.
    fn mkdir(&self, path: &str) -> TransportResult<()>;

    /// Remove the file at `path`.
    fn remove(&self, path: &str) -> TransportResult<()>;

    /// Release the share handle. Idempotent.
    fn close(&mut self);
}

/// An open remote file handle.
pub trait RemoteFile: Send {
    /// Read up to `buf.len()` bytes from the current position.
    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize>;

    /// Write `buf` at the current position, advancing it.
    fn write(&mut self, buf: &[u8]) -> TransportResult<usize>;

    /// Write `buf` at an explicit offset, without moving the position.
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> TransportResult<usize>;

    /// Current end-of-file position (file size).
    fn end_of_file(&self) -> TransportResult<u64>;

    /// Rename this file to a new share-relative path.
    fn rename(&mut self, to: &str) -> TransportResult<()>;

    /// Close the remote handle. Idempotent.
    fn close(&mut self) -> TransportResult<()>;
}

impl std::fmt::Debug for dyn RemoteFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFile").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_debug_redacts_password() {
        let auth = AuthContext::new("svc-transfer", "hunter2", Some("CORP".into()));
        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("svc-transfer"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_auth_context_without_domain() {
        let auth = AuthContext::new("user", "pw", None);
        assert!(auth.domain.is_none());
    }
}
