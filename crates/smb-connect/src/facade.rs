//! High-level verbs over a configured endpoint.
//!
//! Every verb is one unit of work: build a share, one connect, one
//! operation, close on all exit paths. Nothing is retried here; callers
//! decide what a failure means for them.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::debug;

use crate::cache::ConnectionCache;
use crate::client::SmbTransport;
use crate::config::SmbConfig;
use crate::error::Result;
use crate::file::SmbFile;
use crate::share::SmbShare;

/// Facade performing file operations against one SMB endpoint.
///
/// Cheap to clone conceptually but designed to be shared: the connection
/// cache inside is the process-wide structure all operations reuse.
pub struct SmbClient {
    config: Arc<SmbConfig>,
    cache: Arc<ConnectionCache>,
}

impl SmbClient {
    /// Create a client dialing through `transport` with the given endpoint
    /// configuration.
    pub fn new(transport: Arc<dyn SmbTransport>, config: SmbConfig) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(ConnectionCache::new(transport)),
        }
    }

    /// The endpoint configuration.
    pub fn config(&self) -> &SmbConfig {
        &self.config
    }

    /// List the directory at `path`.
    pub fn list_files(&self, path: &str) -> Result<Vec<SmbFile>> {
        debug!(path, "list");
        self.connected(path, |share| share.list_files())
    }

    /// Store the bytes read from `source` at `name`, creating or replacing
    /// the file.
    pub fn store_file(&self, name: &str, source: &mut dyn Read) -> Result<()> {
        debug!(name, "store");
        self.connected(name, |share| share.store_file(source))
    }

    /// Append the bytes read from `source` after the current content of
    /// `name`, creating the file when absent.
    pub fn append_file(&self, name: &str, source: &mut dyn Read) -> Result<()> {
        debug!(name, "append");
        self.connected(name, |share| share.append_file(source))
    }

    /// Stream the content of `name` into `sink`.
    pub fn retrieve_file(&self, name: &str, sink: &mut dyn Write) -> Result<()> {
        debug!(name, "retrieve");
        self.connected(name, |share| share.retrieve_file(sink))
    }

    /// Whether a regular file exists at `name`.
    pub fn file_exists(&self, name: &str) -> Result<bool> {
        debug!(name, "exists");
        self.connected(name, |share| share.file_exists())
    }

    /// Delete the file at `name`; deleting an absent file succeeds.
    pub fn delete_file(&self, name: &str) -> Result<()> {
        debug!(name, "delete");
        self.connected(name, |share| share.delete_file())
    }

    /// Ensure every segment of `directory` exists as a folder.
    pub fn mkdirs(&self, directory: &str) -> Result<()> {
        debug!(directory, "mkdirs");
        self.connected(directory, |share| share.mkdirs())
    }

    /// Rename `from` to `to`. Both paths resolve independently; targets on
    /// different shares are rejected.
    pub fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        debug!(from, to, "rename");
        let mut share = SmbShare::new(self.config.clone(), self.cache.clone());
        let result = share.rename(from, to);
        share.close();
        result
    }

    fn connected<T>(&self, target: &str, op: impl FnOnce(&SmbShare) -> Result<T>) -> Result<T> {
        let mut share = SmbShare::new(self.config.clone(), self.cache.clone());
        let result = share.connect(target).and_then(|_| op(&share));
        share.close();
        result
    }
}
