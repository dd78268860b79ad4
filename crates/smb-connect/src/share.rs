//! The unit of work: one connected share performing one operation.
//!
//! An [`SmbShare`] lives for exactly one logical operation (or one recursive
//! listing): connect, perform, close. Sessions are created fresh on every
//! connect and never reused across operations; the transport connection
//! underneath comes from the shared [`ConnectionCache`] and is never owned
//! here.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::ConnectionCache;
use crate::client::{AuthContext, DiskShare, SmbSession};
use crate::config::{SmbConfig, DEFAULT_PORT};
use crate::dfs::{DfsResolver, DfsResolutionResult};
use crate::error::{Result, SmbError, TransportError};
use crate::file::SmbFile;
use crate::path::{strip_leading_separator, strip_share_name, to_backslashes, SmbPath, SEPARATOR};
use crate::types::OpenOptions;

/// Lifecycle of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareState {
    /// Created, no connect attempted yet.
    Unconnected,
    /// Connect in progress or failed partway; sessions may be held.
    Connecting,
    /// Mounted and ready for one operation.
    Connected,
    /// Terminal. Closing twice is a no-op.
    Closed,
}

struct Mounted {
    share: Box<dyn DiskShare>,
    path: String,
}

/// A share connected for one operation.
///
/// Exclusively owned by the calling verb; never shared across concurrent
/// operations. [`SmbShare::close`] runs on every exit path (the facade
/// guarantees it, and `Drop` backstops it).
pub struct SmbShare {
    config: Arc<SmbConfig>,
    cache: Arc<ConnectionCache>,
    resolver: DfsResolver,
    sessions: Vec<Box<dyn SmbSession>>,
    mounted: Option<Mounted>,
    state: ShareState,
}

impl SmbShare {
    /// Create an unconnected share.
    pub fn new(config: Arc<SmbConfig>, cache: Arc<ConnectionCache>) -> Self {
        Self {
            config,
            cache,
            resolver: DfsResolver::new(),
            sessions: Vec::new(),
            mounted: None,
            state: ShareState::Unconnected,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ShareState {
        self.state
    }

    /// The resolved share-relative path, once connected.
    pub fn path(&self) -> Option<&str> {
        self.mounted.as_ref().map(|m| m.path.as_str())
    }

    /// Connect for an operation on `target_path`.
    ///
    /// Normalizes the path, obtains a cached connection, authenticates a
    /// fresh session, and mounts the share — through DFS resolution when the
    /// endpoint has it enabled. After success the mounted handle and the
    /// stored path are directly usable; no further translation is needed.
    pub fn connect(&mut self, target_path: &str) -> Result<()> {
        self.state = ShareState::Connecting;
        let session = self.connect_session(&self.config.host, self.config.effective_port())?;
        self.sessions.push(session);
        let virtual_path = self.virtual_path(target_path);
        let resolution = self.mount(virtual_path)?;
        let path = strip_leading_separator(&resolution.path.path).to_string();
        debug!(share = %resolution.share.share_name(), %path, "share connected");
        self.mounted = Some(Mounted {
            share: resolution.share,
            path,
        });
        self.state = ShareState::Connected;
        Ok(())
    }

    /// Enumerate the entries at the connected path, in server order.
    ///
    /// The `.` and `..` pseudo-entries are filtered out; everything else,
    /// including names that merely start with dots, is retained.
    pub fn list_files(&self) -> Result<Vec<SmbFile>> {
        let (share, path) = self.mounted()?;
        let entries = share.list(path).map_err(|source| SmbError::List {
            path: path.to_string(),
            source,
        })?;
        Ok(entries
            .iter()
            .filter(|e| !SmbFile::is_pseudo_entry(&e.file_name))
            .map(SmbFile::from)
            .collect())
    }

    /// Stream the connected file's full content into `sink`.
    pub fn retrieve_file(&self, sink: &mut dyn Write) -> Result<()> {
        let (share, path) = self.mounted()?;
        let wrap = |source| SmbError::Retrieve {
            path: path.to_string(),
            source,
        };
        let mut file = share.open(path, &OpenOptions::read()).map_err(wrap)?;
        let mut buf = vec![0u8; self.config.buffer_size.max(1)];
        let outcome = loop {
            let n = match file.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(e),
            };
            if let Err(e) = sink.write_all(&buf[..n]) {
                break Err(TransportError::Io(e));
            }
        };
        let closed = file.close();
        outcome.map_err(wrap)?;
        closed.map_err(wrap)
    }

    /// Write all bytes from `source` to the connected path, creating or
    /// truncating as needed.
    pub fn store_file(&self, source: &mut dyn Read) -> Result<()> {
        let (share, path) = self.mounted()?;
        let wrap = |source| SmbError::Store {
            path: path.to_string(),
            source,
        };
        let mut file = share.open(path, &OpenOptions::write()).map_err(wrap)?;
        let mut buf = vec![0u8; self.config.buffer_size.max(1)];
        let outcome = loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(TransportError::Io(e)),
            };
            let mut written = 0;
            let mut fault = None;
            while written < n {
                match file.write(&buf[written..n]) {
                    Ok(w) => written += w,
                    Err(e) => {
                        fault = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = fault {
                break Err(e);
            }
        };
        let closed = file.close();
        outcome.map_err(wrap)?;
        closed.map_err(wrap)
    }

    /// Append all bytes from `source` after the current end of file.
    ///
    /// Writes go out at explicit, increasing offsets rather than through an
    /// implicit append mode, which some servers do not support. Concurrent
    /// appenders to the same path race on the end-of-file read; callers must
    /// serialize appends themselves.
    pub fn append_file(&self, source: &mut dyn Read) -> Result<()> {
        let (share, path) = self.mounted()?;
        let wrap = |source| SmbError::Store {
            path: path.to_string(),
            source,
        };
        let mut file = share.open(path, &OpenOptions::append()).map_err(wrap)?;
        let mut offset = match file.end_of_file() {
            Ok(n) => n,
            Err(e) => {
                let _ = file.close();
                return Err(wrap(e));
            }
        };
        let mut buf = vec![0u8; self.config.buffer_size.max(1)];
        let outcome = loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(TransportError::Io(e)),
            };
            let mut written = 0;
            let mut fault = None;
            while written < n {
                match file.write_at(offset, &buf[written..n]) {
                    Ok(w) => {
                        written += w;
                        offset += w as u64;
                    }
                    Err(e) => {
                        fault = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = fault {
                break Err(e);
            }
        };
        let closed = file.close();
        outcome.map_err(wrap)?;
        closed.map_err(wrap)
    }

    /// Delete the connected file if it exists. Deleting an absent file is
    /// success, not an error.
    pub fn delete_file(&self) -> Result<()> {
        let (share, path) = self.mounted()?;
        let wrap = |source| SmbError::Delete {
            path: path.to_string(),
            source,
        };
        if share.file_exists(path).map_err(wrap)? {
            share.remove(path).map_err(wrap)?;
        } else {
            debug!(%path, "delete of absent file is a no-op");
        }
        Ok(())
    }

    /// Whether a regular file exists at the connected path.
    ///
    /// I/O faults surface as errors; they are never coerced to `false`.
    pub fn file_exists(&self) -> Result<bool> {
        let (share, path) = self.mounted()?;
        share.file_exists(path).map_err(|source| SmbError::Exists {
            path: path.to_string(),
            source,
        })
    }

    /// Ensure every segment of the connected path exists as a folder,
    /// walking from the root segment downward.
    ///
    /// Check-then-create per segment is not atomic; a concurrent creator
    /// winning the race surfaces as a name collision, which counts as
    /// success.
    pub fn mkdirs(&self) -> Result<()> {
        let (share, path) = self.mounted()?;
        let wrap = |source| SmbError::Mkdir {
            path: path.to_string(),
            source,
        };
        let mut current = String::new();
        for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push(SEPARATOR);
            }
            current.push_str(segment);
            if share.folder_exists(&current).map_err(wrap)? {
                continue;
            }
            match share.mkdir(&current) {
                Ok(()) => {}
                Err(e) if e.is_name_collision() => {
                    debug!(path = %current, "segment created concurrently");
                }
                Err(e) => return Err(wrap(e)),
            }
        }
        Ok(())
    }

    /// Rename `from` to `to`, resolving both independently.
    ///
    /// SMB rename is a same-share filesystem operation: when the two targets
    /// resolve to different shares this fails fast instead of decomposing
    /// into copy + delete.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.state = ShareState::Connecting;
        let session = self.connect_session(&self.config.host, self.config.effective_port())?;
        self.sessions.push(session);

        let to_virtual = self.virtual_path(to);
        let resolved_to = if self.config.dfs {
            let session = self.sessions.first().ok_or(SmbError::NotConnected)?;
            self.resolver.resolve(session.as_ref(), &to_virtual)?
        } else {
            to_virtual
        };
        let from_virtual = self.virtual_path(from);
        let resolution = self.mount(from_virtual)?;
        let resolved_from = resolution.path.clone();
        self.mounted = Some(Mounted {
            path: strip_leading_separator(&resolution.path.path).to_string(),
            share: resolution.share,
        });
        self.state = ShareState::Connected;

        if !resolved_from.is_on_same_share(&resolved_to) {
            return Err(SmbError::CrossShareRename {
                from: resolved_from.unc(),
                to: resolved_to.unc(),
            });
        }

        let (share, path) = self.mounted()?;
        let to_path = strip_leading_separator(&resolved_to.path).to_string();
        let wrap = |source| SmbError::Rename {
            from: path.to_string(),
            to: to_path.clone(),
            source,
        };
        let mut file = share.open(path, &OpenOptions::rename()).map_err(&wrap)?;
        let outcome = file.rename(&to_path);
        let closed = file.close();
        outcome.map_err(&wrap)?;
        closed.map_err(&wrap)
    }

    /// Release the mounted share handle and this share's own sessions.
    ///
    /// Idempotent; a close before any connect is a no-op. Cached connections
    /// stay untouched — other operations may be using them.
    pub fn close(&mut self) {
        if self.state == ShareState::Closed {
            return;
        }
        if let Some(mut mounted) = self.mounted.take() {
            mounted.share.close();
        }
        for mut session in self.sessions.drain(..) {
            if let Err(error) = session.logoff() {
                warn!(%error, "session logoff failed");
            }
        }
        self.state = ShareState::Closed;
    }

    fn mounted(&self) -> Result<(&dyn DiskShare, &str)> {
        match (&self.mounted, self.state) {
            (Some(m), ShareState::Connected) => Ok((m.share.as_ref(), m.path.as_str())),
            _ => Err(SmbError::NotConnected),
        }
    }

    fn virtual_path(&self, target: &str) -> SmbPath {
        let actual = strip_share_name(
            &to_backslashes(target),
            &self.config.share,
            SEPARATOR,
        );
        SmbPath::new(
            self.config.host.as_str(),
            self.config.share.as_str(),
            actual,
        )
    }

    fn connect_session(&self, host: &str, port: u16) -> Result<Box<dyn SmbSession>> {
        let username = self
            .config
            .username
            .as_deref()
            .ok_or(SmbError::Authentication("username"))?;
        let password = self
            .config
            .password
            .as_deref()
            .ok_or(SmbError::Authentication("password"))?;
        let auth = AuthContext::new(username, password, self.config.domain.clone());
        let connection = self.cache.get(host, port)?;
        connection
            .authenticate(&auth)
            .map_err(|source| SmbError::Connection {
                host: host.to_string(),
                port,
                source,
            })
    }

    fn mount(&mut self, virtual_path: SmbPath) -> Result<DfsResolutionResult> {
        if !self.config.dfs {
            let session = self.sessions.last().ok_or(SmbError::NotConnected)?;
            let share = Self::mount_on(session.as_ref(), &virtual_path, self.config.effective_port())?;
            return Ok(DfsResolutionResult::new(share, virtual_path));
        }
        let session = self.sessions.last().ok_or(SmbError::NotConnected)?;
        let resolved = self.resolver.resolve(session.as_ref(), &virtual_path)?;
        if session.remote_hostname().eq_ignore_ascii_case(&resolved.host) {
            let share = Self::mount_on(session.as_ref(), &resolved, self.config.effective_port())?;
            Ok(DfsResolutionResult::new(share, resolved))
        } else {
            // the referral points elsewhere: a fresh session against the
            // resolved host, the original session is abandoned
            debug!(host = %resolved.host, "DFS redirect to different host");
            let redirected = self.connect_session(&resolved.host, DEFAULT_PORT)?;
            // owned before mounting, so close() logs it off even when the
            // mount on the redirected host fails
            self.sessions.push(redirected);
            let session = self.sessions.last().ok_or(SmbError::NotConnected)?;
            let share = Self::mount_on(session.as_ref(), &resolved, DEFAULT_PORT)?;
            Ok(DfsResolutionResult::new(share, resolved))
        }
    }

    fn mount_on(
        session: &dyn SmbSession,
        path: &SmbPath,
        port: u16,
    ) -> Result<Box<dyn DiskShare>> {
        session
            .connect_share(&path.share)
            .map_err(|source| SmbError::Connection {
                host: path.host.clone(),
                port,
                source,
            })
    }
}

impl Drop for SmbShare {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemHost, MemoryTransport};

    fn setup(dfs: bool) -> (MemoryTransport, Arc<MemHost>, Arc<SmbConfig>, Arc<ConnectionCache>) {
        let transport = MemoryTransport::new();
        let host = transport.add_host("fileserver");
        host.add_share("docs");
        let mut config = SmbConfig::new("fileserver", "docs").credentials("svc", "pw");
        config.dfs = dfs;
        let cache = Arc::new(ConnectionCache::new(Arc::new(transport.clone())));
        (transport, host, Arc::new(config), cache)
    }

    fn share(config: &Arc<SmbConfig>, cache: &Arc<ConnectionCache>) -> SmbShare {
        SmbShare::new(config.clone(), cache.clone())
    }

    #[test]
    fn test_connect_strips_share_name() {
        let (_t, _h, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.connect("docs/reports/q3.csv").unwrap();
        assert_eq!(s.path(), Some("reports\\q3.csv"));
        assert_eq!(s.state(), ShareState::Connected);
    }

    #[test]
    fn test_connect_without_credentials_fails_before_io() {
        let (_t, _h, _config, cache) = setup(false);
        let config = Arc::new(SmbConfig::new("fileserver", "docs"));
        let mut s = SmbShare::new(config, cache);
        let err = s.connect("docs/a").unwrap_err();
        assert!(matches!(err, SmbError::Authentication("username")));
    }

    #[test]
    fn test_missing_password_is_reported() {
        let (_t, _h, _config, cache) = setup(false);
        let mut config = SmbConfig::new("fileserver", "docs");
        config.username = Some("svc".into());
        let mut s = SmbShare::new(Arc::new(config), cache);
        let err = s.connect("docs/a").unwrap_err();
        assert!(matches!(err, SmbError::Authentication("password")));
    }

    #[test]
    fn test_list_filters_pseudo_entries() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "a.txt", b"x");
        host.put_file("docs", "..foo", b"y");
        let mut s = share(&config, &cache);
        s.connect("docs").unwrap();
        let names: Vec<String> = s
            .list_files()
            .unwrap()
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["..foo", "a.txt"]);
    }

    #[test]
    fn test_store_then_retrieve_round_trip() {
        let (_t, host, config, cache) = setup(false);
        let payload: Vec<u8> = (0..9000u32).map(|i| (i % 251) as u8).collect();

        let mut s = share(&config, &cache);
        s.connect("docs/data.bin").unwrap();
        s.store_file(&mut payload.as_slice()).unwrap();
        s.close();
        assert_eq!(host.file_content("docs", "data.bin").unwrap(), payload);

        let mut s = share(&config, &cache);
        s.connect("docs/data.bin").unwrap();
        let mut out = Vec::new();
        s.retrieve_file(&mut out).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_store_empty_file() {
        let (_t, host, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.connect("docs/empty").unwrap();
        s.store_file(&mut (&[] as &[u8])).unwrap();
        assert_eq!(host.file_content("docs", "empty").unwrap(), b"");
    }

    #[test]
    fn test_store_truncates_previous_content() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "a", b"old content that is long");
        let mut s = share(&config, &cache);
        s.connect("docs/a").unwrap();
        s.store_file(&mut &b"new"[..]).unwrap();
        assert_eq!(host.file_content("docs", "a").unwrap(), b"new");
    }

    #[test]
    fn test_append_writes_at_end_of_file() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "log.txt", b"start;");
        let mut s = share(&config, &cache);
        s.connect("docs/log.txt").unwrap();
        s.append_file(&mut &b"more"[..]).unwrap();
        assert_eq!(host.file_content("docs", "log.txt").unwrap(), b"start;more");
    }

    #[test]
    fn test_append_creates_missing_file() {
        let (_t, host, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.connect("docs/fresh.log").unwrap();
        s.append_file(&mut &b"first"[..]).unwrap();
        assert_eq!(host.file_content("docs", "fresh.log").unwrap(), b"first");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "gone.txt", b"x");
        let mut s = share(&config, &cache);
        s.connect("docs/gone.txt").unwrap();
        s.delete_file().unwrap();
        assert!(host.file_content("docs", "gone.txt").is_none());
        // second delete of the now-absent file is still success
        s.delete_file().unwrap();
    }

    #[test]
    fn test_file_exists() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "here", b"x");
        let mut s = share(&config, &cache);
        s.connect("docs/here").unwrap();
        assert!(s.file_exists().unwrap());

        let mut s = share(&config, &cache);
        s.connect("docs/not-here").unwrap();
        assert!(!s.file_exists().unwrap());
    }

    #[test]
    fn test_mkdirs_creates_missing_segments_in_order() {
        let (_t, host, config, cache) = setup(false);
        host.put_dir("docs", "a");
        let mut s = share(&config, &cache);
        s.connect("docs/a/b/c").unwrap();
        s.mkdirs().unwrap();
        assert_eq!(host.mkdir_calls("docs"), vec!["a\\b", "a\\b\\c"]);
    }

    #[test]
    fn test_mkdirs_is_noop_when_all_exist() {
        let (_t, host, config, cache) = setup(false);
        host.put_dir("docs", "a").put_dir("docs", "a\\b").put_dir("docs", "a\\b\\c");
        let mut s = share(&config, &cache);
        s.connect("docs/a/b/c").unwrap();
        s.mkdirs().unwrap();
        assert!(host.mkdir_calls("docs").is_empty());
    }

    #[test]
    fn test_rename_same_share() {
        let (_t, host, config, cache) = setup(false);
        host.put_file("docs", "old.txt", b"x");
        let mut s = share(&config, &cache);
        s.rename("docs/old.txt", "docs/new.txt").unwrap();
        assert!(host.file_content("docs", "old.txt").is_none());
        assert_eq!(host.file_content("docs", "new.txt").unwrap(), b"x");
    }

    #[test]
    fn test_rename_across_shares_fails_fast() {
        let transport = MemoryTransport::new();
        let ns = transport.add_host("nameserver");
        ns.add_dfs_link("public\\in", SmbPath::new("storage1", "in", ""))
            .add_dfs_link("public\\out", SmbPath::new("storage2", "out", ""));
        transport.add_host("storage1").add_share("in");
        transport.add_host("storage2").add_share("out");
        let config = Arc::new(
            SmbConfig::new("nameserver", "public")
                .credentials("svc", "pw")
                .with_dfs(),
        );
        let cache = Arc::new(ConnectionCache::new(Arc::new(transport)));

        let mut s = SmbShare::new(config, cache);
        let err = s.rename("public/in/a.txt", "public/out/a.txt").unwrap_err();
        assert!(matches!(err, SmbError::CrossShareRename { .. }));
        s.close();
        assert_eq!(s.state(), ShareState::Closed);
    }

    #[test]
    fn test_rename_through_dfs_on_same_share() {
        let transport = MemoryTransport::new();
        let ns = transport.add_host("nameserver");
        ns.add_dfs_link("public\\in", SmbPath::new("storage1", "in", ""));
        let storage = transport.add_host("storage1");
        storage.add_share("in");
        storage.put_file("in", "a.txt", b"payload");
        let config = Arc::new(
            SmbConfig::new("nameserver", "public")
                .credentials("svc", "pw")
                .with_dfs(),
        );
        let cache = Arc::new(ConnectionCache::new(Arc::new(transport)));

        let mut s = SmbShare::new(config, cache);
        s.rename("public/in/a.txt", "public/in/b.txt").unwrap();
        assert!(storage.file_content("in", "a.txt").is_none());
        assert_eq!(storage.file_content("in", "b.txt").unwrap(), b"payload");
    }

    #[test]
    fn test_dfs_disabled_issues_no_probe() {
        let (_t, host, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.connect("docs/x").unwrap();
        assert_eq!(host.probe_count(), 0);
    }

    #[test]
    fn test_dfs_enabled_without_redirect() {
        let (_t, host, config, cache) = setup(true);
        let mut s = share(&config, &cache);
        s.connect("docs/x").unwrap();
        assert_eq!(host.probe_count(), 1);
        assert_eq!(s.path(), Some("x"));
        assert_eq!(host.auth_count(), 1);
    }

    #[test]
    fn test_dfs_redirect_opens_session_on_target_host() {
        let transport = MemoryTransport::new();
        let ns = transport.add_host("nameserver");
        ns.add_dfs_link("public", SmbPath::new("storage1", "data", ""));
        let storage = transport.add_host("storage1");
        storage.add_share("data");
        let config = Arc::new(
            SmbConfig::new("nameserver", "public")
                .credentials("svc", "pw")
                .with_dfs(),
        );
        let cache = Arc::new(ConnectionCache::new(Arc::new(transport)));

        let mut s = SmbShare::new(config, cache);
        s.connect("public/in/report.csv").unwrap();
        assert_eq!(s.path(), Some("in\\report.csv"));
        assert_eq!(ns.auth_count(), 1);
        assert_eq!(storage.auth_count(), 1);
    }

    #[test]
    fn test_redirect_mount_failure_still_logs_off_sessions() {
        let transport = MemoryTransport::new();
        let ns = transport.add_host("nameserver");
        ns.add_dfs_link("public", SmbPath::new("storage1", "data", ""));
        // the referral target exists but does not carry the share
        let storage = transport.add_host("storage1");
        let config = Arc::new(
            SmbConfig::new("nameserver", "public")
                .credentials("svc", "pw")
                .with_dfs(),
        );
        let cache = Arc::new(ConnectionCache::new(Arc::new(transport)));

        let mut s = SmbShare::new(config, cache);
        let err = s.connect("public/in/report.csv").unwrap_err();
        assert!(matches!(err, SmbError::Connection { .. }));
        s.close();
        // both the nameserver session and the redirected session were
        // authenticated during the failed connect; both must be logged off
        assert_eq!(ns.auth_count() + storage.auth_count(), 2);
        assert_eq!(ns.logoff_count() + storage.logoff_count(), 2);
    }

    #[test]
    fn test_close_is_idempotent_and_safe_before_connect() {
        let (_t, _h, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.close();
        assert_eq!(s.state(), ShareState::Closed);
        s.close();

        let mut s = share(&config, &cache);
        s.connect("docs").unwrap();
        s.close();
        s.close();
        assert_eq!(s.state(), ShareState::Closed);
    }

    #[test]
    fn test_operation_after_close_fails() {
        let (_t, _h, config, cache) = setup(false);
        let mut s = share(&config, &cache);
        s.connect("docs").unwrap();
        s.close();
        assert!(matches!(s.list_files().unwrap_err(), SmbError::NotConnected));
    }

    #[test]
    fn test_failed_connect_still_closes_cleanly() {
        let (_t, _h, config, cache) = setup(false);
        let mut config = (*config).clone();
        config.share = "nonexistent".into();
        let mut s = SmbShare::new(Arc::new(config), cache);
        let err = s.connect("nonexistent/a").unwrap_err();
        assert!(matches!(err, SmbError::Connection { .. }));
        assert_eq!(s.state(), ShareState::Connecting);
        s.close();
        assert_eq!(s.state(), ShareState::Closed);
    }
}
