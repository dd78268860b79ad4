//! Endpoint configuration.

use serde::{Deserialize, Serialize};

/// The standard SMB TCP port, used when the endpoint leaves the port unset.
pub const DEFAULT_PORT: u16 = 445;

/// Default stream copy buffer size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Configuration bundle for one SMB endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmbConfig {
    /// Server hostname.
    pub host: String,
    /// TCP port; `None` selects [`DEFAULT_PORT`].
    pub port: Option<u16>,
    /// Share name.
    pub share: String,
    /// Account name. Mandatory before any operation runs.
    pub username: Option<String>,
    /// Account password. Mandatory before any operation runs.
    pub password: Option<String>,
    /// Authentication domain.
    pub domain: Option<String>,
    /// Whether DFS referral resolution is enabled for this endpoint.
    pub dfs: bool,
    /// Buffer size for streaming copies.
    pub buffer_size: usize,
}

impl SmbConfig {
    /// Create a configuration for `host`/`share` with defaults elsewhere.
    pub fn new(host: impl Into<String>, share: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            share: share.into(),
            username: None,
            password: None,
            domain: None,
            dfs: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set an explicit port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the authentication domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Enable DFS referral resolution.
    pub fn with_dfs(mut self) -> Self {
        self.dfs = true;
        self
    }

    /// Set the stream copy buffer size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// The effective port.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}
