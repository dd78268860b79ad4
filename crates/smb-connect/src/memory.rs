//! In-memory backend implementing the client traits.
//!
//! Simulates a small SMB server landscape entirely in process: named hosts
//! carrying shares, user credentials, and DFS link tables. Connections can
//! be invalidated on demand to exercise the cache's replace-on-stale path.
//! Backs the test suite and local development; no wire protocol involved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::client::{
    AuthContext, DiskShare, RemoteFile, SmbConnection, SmbSession, SmbTransport, TransportResult,
};
use crate::error::{NtStatus, TransportError};
use crate::path::{strip_leading_separator, to_backslashes, SmbPath};
use crate::types::{CreateDisposition, DirEntry, FileAttributes, OpenOptions};

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn normalize(path: &str) -> String {
    strip_leading_separator(&to_backslashes(path))
        .trim_end_matches('\\')
        .to_string()
}

fn parent_of(path: &str) -> &str {
    match path.rfind('\\') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn rewrite(target: &SmbPath, rest: &str) -> SmbPath {
    let prefix = normalize(&target.path);
    let joined = match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => prefix,
        (false, false) => format!("{}\\{}", prefix, rest),
    };
    SmbPath::new(target.host.as_str(), target.share.as_str(), joined)
}

/// A simulated filesystem node on a share.
#[derive(Clone)]
enum MemNode {
    Directory { modified: i64 },
    File { data: Vec<u8>, modified: i64 },
}

/// Backing state of one share.
struct MemShareState {
    name: String,
    nodes: Mutex<HashMap<String, MemNode>>,
    mkdir_log: Mutex<Vec<String>>,
}

impl MemShareState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Mutex::new(HashMap::new()),
            mkdir_log: Mutex::new(Vec::new()),
        }
    }
}

/// A simulated server host.
pub struct MemHost {
    name: String,
    epoch: AtomicU64,
    users: DashMap<String, String>,
    shares: DashMap<String, Arc<MemShareState>>,
    dfs_links: DashMap<String, SmbPath>,
    fail_dfs: AtomicBool,
    auth_count: AtomicU64,
    probe_count: AtomicU64,
    logoff_count: AtomicU64,
}

impl MemHost {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            epoch: AtomicU64::new(0),
            users: DashMap::new(),
            shares: DashMap::new(),
            dfs_links: DashMap::new(),
            fail_dfs: AtomicBool::new(false),
            auth_count: AtomicU64::new(0),
            probe_count: AtomicU64::new(0),
            logoff_count: AtomicU64::new(0),
        }
    }

    /// Add a share to this host.
    pub fn add_share(&self, name: &str) -> &Self {
        self.shares
            .insert(name.to_string(), Arc::new(MemShareState::new(name)));
        self
    }

    /// Register a user; once any user exists, authentication is enforced.
    pub fn add_user(&self, username: &str, password: &str) -> &Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }

    /// Declare a DFS link.
    ///
    /// `link` is either a bare share name (the whole share redirects) or
    /// `share\segment` (only paths under that first segment redirect, with
    /// the segment consumed by the rewrite).
    pub fn add_dfs_link(&self, link: &str, target: SmbPath) -> &Self {
        self.dfs_links.insert(to_backslashes(link), target);
        self
    }

    /// Make every referral probe on this host fail.
    pub fn fail_dfs_resolution(&self) -> &Self {
        self.fail_dfs.store(true, Ordering::SeqCst);
        self
    }

    /// Seed a file on a share, creating it directly in the backing store.
    pub fn put_file(&self, share: &str, path: &str, data: &[u8]) -> &Self {
        if let Some(state) = self.shares.get(share) {
            state.nodes.lock().unwrap().insert(
                normalize(path),
                MemNode::File {
                    data: data.to_vec(),
                    modified: now_millis(),
                },
            );
        }
        self
    }

    /// Seed a directory on a share.
    pub fn put_dir(&self, share: &str, path: &str) -> &Self {
        if let Some(state) = self.shares.get(share) {
            state
                .nodes
                .lock()
                .unwrap()
                .insert(normalize(path), MemNode::Directory { modified: now_millis() });
        }
        self
    }

    /// Read a file straight from the backing store.
    pub fn file_content(&self, share: &str, path: &str) -> Option<Vec<u8>> {
        let state = self.shares.get(share)?;
        let nodes = state.nodes.lock().unwrap();
        match nodes.get(&normalize(path)) {
            Some(MemNode::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Paths passed to `mkdir` on a share, in call order.
    pub fn mkdir_calls(&self, share: &str) -> Vec<String> {
        self.shares
            .get(share)
            .map(|state| state.mkdir_log.lock().unwrap().clone())
            .unwrap_or_default()
    }

    /// Number of sessions authenticated against this host.
    pub fn auth_count(&self) -> u64 {
        self.auth_count.load(Ordering::SeqCst)
    }

    /// Number of DFS referral probes this host has answered.
    pub fn probe_count(&self) -> u64 {
        self.probe_count.load(Ordering::SeqCst)
    }

    /// Number of sessions logged off against this host.
    pub fn logoff_count(&self) -> u64 {
        self.logoff_count.load(Ordering::SeqCst)
    }
}

/// In-memory [`SmbTransport`] over a shared simulated network.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    hosts: Arc<DashMap<String, Arc<MemHost>>>,
}

impl MemoryTransport {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host, returning its handle for further configuration.
    pub fn add_host(&self, name: &str) -> Arc<MemHost> {
        let host = Arc::new(MemHost::new(name));
        self.hosts.insert(name.to_ascii_lowercase(), host.clone());
        host
    }

    /// Look up a host handle.
    pub fn host(&self, name: &str) -> Option<Arc<MemHost>> {
        self.hosts.get(&name.to_ascii_lowercase()).map(|h| h.clone())
    }

    /// Invalidate every connection issued to `host` so far; existing
    /// connections start reporting themselves disconnected.
    pub fn drop_connections(&self, host: &str) {
        if let Some(host) = self.host(host) {
            host.epoch.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl SmbTransport for MemoryTransport {
    fn connect(&self, host: &str, port: u16) -> TransportResult<Arc<dyn SmbConnection>> {
        let host = self
            .host(host)
            .ok_or_else(|| TransportError::ConnectionRefused {
                host: host.to_string(),
                port,
            })?;
        let epoch = host.epoch.load(Ordering::SeqCst);
        Ok(Arc::new(MemConnection { host, epoch }))
    }
}

struct MemConnection {
    host: Arc<MemHost>,
    epoch: u64,
}

impl SmbConnection for MemConnection {
    fn authenticate(&self, auth: &AuthContext) -> TransportResult<Box<dyn SmbSession>> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        if !self.host.users.is_empty() {
            let accepted = self
                .host
                .users
                .get(&auth.username)
                .map(|pw| *pw == auth.password)
                .unwrap_or(false);
            if !accepted {
                return Err(TransportError::AuthRejected {
                    username: auth.username.clone(),
                });
            }
        }
        self.host.auth_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemSession {
            host: self.host.clone(),
        }))
    }

    fn is_connected(&self) -> bool {
        self.host.epoch.load(Ordering::SeqCst) == self.epoch
    }

    fn remote_hostname(&self) -> &str {
        &self.host.name
    }
}

struct MemSession {
    host: Arc<MemHost>,
}

impl SmbSession for MemSession {
    fn connect_share(&self, share_name: &str) -> TransportResult<Box<dyn DiskShare>> {
        let state = self
            .host
            .shares
            .get(share_name)
            .map(|s| s.clone())
            .ok_or_else(|| TransportError::ShareNotFound(share_name.to_string()))?;
        Ok(Box::new(MemDiskShare {
            state,
            closed: false,
        }))
    }

    fn resolve_path(&self, path: &SmbPath, _probe_status: NtStatus) -> TransportResult<SmbPath> {
        self.host.probe_count.fetch_add(1, Ordering::SeqCst);
        if self.host.fail_dfs.load(Ordering::SeqCst) {
            return Err(TransportError::Status(NtStatus::ObjectPathNotFound));
        }
        let rest = normalize(&path.path);
        // segment link first, then a share-level link, then no coverage
        if let Some(first) = rest.split('\\').next().filter(|s| !s.is_empty()) {
            let key = format!("{}\\{}", path.share, first);
            if let Some(target) = self.host.dfs_links.get(&key) {
                let remainder = rest[first.len()..].trim_start_matches('\\');
                return Ok(rewrite(&target, remainder));
            }
        }
        match self.host.dfs_links.get(&path.share) {
            Some(target) => Ok(rewrite(&target, &rest)),
            None => Ok(path.clone()),
        }
    }

    fn remote_hostname(&self) -> &str {
        &self.host.name
    }

    fn logoff(&mut self) -> TransportResult<()> {
        self.host.logoff_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MemDiskShare {
    state: Arc<MemShareState>,
    closed: bool,
}

impl MemDiskShare {
    fn guard(&self) -> TransportResult<()> {
        if self.closed {
            return Err(TransportError::NotConnected);
        }
        Ok(())
    }
}

impl DiskShare for MemDiskShare {
    fn share_name(&self) -> &str {
        &self.state.name
    }

    fn list(&self, path: &str) -> TransportResult<Vec<DirEntry>> {
        self.guard()?;
        let dir = normalize(path);
        let nodes = self.state.nodes.lock().unwrap();
        if !dir.is_empty() {
            match nodes.get(&dir) {
                Some(MemNode::Directory { .. }) => {}
                _ => return Err(TransportError::Status(NtStatus::ObjectPathNotFound)),
            }
        }
        // real servers report the pseudo-entries first
        let dir_attrs = FileAttributes::new(FileAttributes::DIRECTORY);
        let mut entries = vec![
            DirEntry {
                file_name: ".".to_string(),
                end_of_file: 0,
                last_write_time: now_millis(),
                attributes: dir_attrs,
            },
            DirEntry {
                file_name: "..".to_string(),
                end_of_file: 0,
                last_write_time: now_millis(),
                attributes: dir_attrs,
            },
        ];
        let mut names: Vec<&String> = nodes
            .keys()
            .filter(|k| !k.is_empty() && parent_of(k) == dir)
            .collect();
        names.sort();
        for name in names {
            let entry_name = name.rsplit('\\').next().unwrap_or(name).to_string();
            match &nodes[name] {
                MemNode::Directory { modified } => entries.push(DirEntry {
                    file_name: entry_name,
                    end_of_file: 0,
                    last_write_time: *modified,
                    attributes: dir_attrs,
                }),
                MemNode::File { data, modified } => entries.push(DirEntry {
                    file_name: entry_name,
                    end_of_file: data.len() as u64,
                    last_write_time: *modified,
                    attributes: FileAttributes::new(FileAttributes::ARCHIVE),
                }),
            }
        }
        Ok(entries)
    }

    fn open(&self, path: &str, options: &OpenOptions) -> TransportResult<Box<dyn RemoteFile>> {
        self.guard()?;
        let key = normalize(path);
        let mut nodes = self.state.nodes.lock().unwrap();
        let exists = match nodes.get(&key) {
            Some(MemNode::File { .. }) => true,
            Some(MemNode::Directory { .. }) => {
                return Err(TransportError::Status(NtStatus::AccessDenied))
            }
            None => false,
        };
        let fresh = MemNode::File {
            data: Vec::new(),
            modified: now_millis(),
        };
        match options.disposition {
            CreateDisposition::Open => {
                if !exists {
                    return Err(TransportError::Status(NtStatus::ObjectNameNotFound));
                }
            }
            CreateDisposition::Create => {
                if exists {
                    return Err(TransportError::Status(NtStatus::ObjectNameCollision));
                }
                nodes.insert(key.clone(), fresh);
            }
            CreateDisposition::OpenIf => {
                if !exists {
                    nodes.insert(key.clone(), fresh);
                }
            }
            CreateDisposition::Overwrite => {
                if !exists {
                    return Err(TransportError::Status(NtStatus::ObjectNameNotFound));
                }
                nodes.insert(key.clone(), fresh);
            }
            CreateDisposition::OverwriteIf | CreateDisposition::Supersede => {
                nodes.insert(key.clone(), fresh);
            }
        }
        drop(nodes);
        Ok(Box::new(MemFile {
            state: self.state.clone(),
            path: key,
            pos: 0,
        }))
    }

    fn file_exists(&self, path: &str) -> TransportResult<bool> {
        self.guard()?;
        let nodes = self.state.nodes.lock().unwrap();
        Ok(matches!(nodes.get(&normalize(path)), Some(MemNode::File { .. })))
    }

    fn folder_exists(&self, path: &str) -> TransportResult<bool> {
        self.guard()?;
        let key = normalize(path);
        if key.is_empty() {
            return Ok(true);
        }
        let nodes = self.state.nodes.lock().unwrap();
        Ok(matches!(nodes.get(&key), Some(MemNode::Directory { .. })))
    }

    fn mkdir(&self, path: &str) -> TransportResult<()> {
        self.guard()?;
        let key = normalize(path);
        let mut nodes = self.state.nodes.lock().unwrap();
        if nodes.contains_key(&key) {
            return Err(TransportError::Status(NtStatus::ObjectNameCollision));
        }
        nodes.insert(key.clone(), MemNode::Directory { modified: now_millis() });
        drop(nodes);
        self.state.mkdir_log.lock().unwrap().push(key);
        Ok(())
    }

    fn remove(&self, path: &str) -> TransportResult<()> {
        self.guard()?;
        let key = normalize(path);
        let mut nodes = self.state.nodes.lock().unwrap();
        match nodes.get(&key) {
            Some(MemNode::File { .. }) => {
                nodes.remove(&key);
                Ok(())
            }
            Some(MemNode::Directory { .. }) => Err(TransportError::Status(NtStatus::AccessDenied)),
            None => Err(TransportError::Status(NtStatus::ObjectNameNotFound)),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

struct MemFile {
    state: Arc<MemShareState>,
    path: String,
    pos: u64,
}

impl MemFile {
    fn with_data<T>(
        &self,
        f: impl FnOnce(&mut Vec<u8>, &mut i64) -> TransportResult<T>,
    ) -> TransportResult<T> {
        let mut nodes = self.state.nodes.lock().unwrap();
        match nodes.get_mut(&self.path) {
            Some(MemNode::File { data, modified }) => f(data, modified),
            _ => Err(TransportError::Status(NtStatus::ObjectNameNotFound)),
        }
    }
}

impl RemoteFile for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        let pos = self.pos as usize;
        let n = self.with_data(|data, _| {
            if pos >= data.len() {
                return Ok(0);
            }
            let n = buf.len().min(data.len() - pos);
            buf[..n].copy_from_slice(&data[pos..pos + n]);
            Ok(n)
        })?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<usize> {
        let pos = self.pos;
        let n = self.write_at(pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> TransportResult<usize> {
        let offset = offset as usize;
        self.with_data(|data, modified| {
            if data.len() < offset {
                data.resize(offset, 0);
            }
            let end = offset + buf.len();
            if data.len() < end {
                data.resize(end, 0);
            }
            data[offset..end].copy_from_slice(buf);
            *modified = now_millis();
            Ok(buf.len())
        })
    }

    fn end_of_file(&self) -> TransportResult<u64> {
        self.with_data(|data, _| Ok(data.len() as u64))
    }

    fn rename(&mut self, to: &str) -> TransportResult<()> {
        let target = normalize(to);
        let mut nodes = self.state.nodes.lock().unwrap();
        if nodes.contains_key(&target) {
            return Err(TransportError::Status(NtStatus::ObjectNameCollision));
        }
        match nodes.remove(&self.path) {
            Some(node) => {
                nodes.insert(target.clone(), node);
                drop(nodes);
                self.path = target;
                Ok(())
            }
            None => Err(TransportError::Status(NtStatus::ObjectNameNotFound)),
        }
    }

    fn close(&mut self) -> TransportResult<()> {
        Ok(())
    }
}
