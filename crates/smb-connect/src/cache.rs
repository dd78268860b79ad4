//! Process-wide cache of transport connections, one per server endpoint.
//!
//! Shares reuse the cached connection for a `(host, port)` pair and never
//! own it: the cache is the only structure shared across concurrent
//! operations. Entries are replaced when the cached connection reports
//! itself disconnected. There is no eviction; the map holds one entry per
//! distinct endpoint ever contacted.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::client::{SmbConnection, SmbTransport};
use crate::error::{Result, SmbError};

/// Connection cache keyed by `host:port`.
pub struct ConnectionCache {
    transport: Arc<dyn SmbTransport>,
    connections: DashMap<String, Arc<dyn SmbConnection>>,
}

impl ConnectionCache {
    /// Create an empty cache dialing through `transport`.
    pub fn new(transport: Arc<dyn SmbTransport>) -> Self {
        Self {
            transport,
            connections: DashMap::new(),
        }
    }

    /// Get a live connection to `host:port`, establishing one if the cache
    /// holds no entry or the cached entry reports itself disconnected.
    ///
    /// Establishment runs under the entry lock, so concurrent callers for
    /// the same key serialize rather than racing to dial.
    pub fn get(&self, host: &str, port: u16) -> Result<Arc<dyn SmbConnection>> {
        let key = format!("{}:{}", host, port);
        match self.connections.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_connected() {
                    debug!(host, port, "reusing cached connection");
                    Ok(occupied.get().clone())
                } else {
                    debug!(host, port, "cached connection is dead, replacing");
                    let conn = self.dial(host, port)?;
                    occupied.insert(conn.clone());
                    Ok(conn)
                }
            }
            Entry::Vacant(vacant) => {
                debug!(host, port, "establishing new connection");
                let conn = self.dial(host, port)?;
                vacant.insert(conn.clone());
                Ok(conn)
            }
        }
    }

    fn dial(&self, host: &str, port: u16) -> Result<Arc<dyn SmbConnection>> {
        self.transport
            .connect(host, port)
            .map_err(|source| SmbError::Connection {
                host: host.to_string(),
                port,
                source,
            })
    }

    /// Number of cached endpoints.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the cache holds no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
