#![warn(missing_docs)]

//! SMB2/CIFS connector: session and share management, DFS path resolution,
//! and high-level file verbs over a pluggable transport

pub mod cache;
pub mod client;
pub mod config;
pub mod dfs;
pub mod error;
pub mod facade;
pub mod file;
pub mod memory;
pub mod path;
pub mod share;
pub mod types;

pub use cache::ConnectionCache;
pub use config::{SmbConfig, DEFAULT_BUFFER_SIZE, DEFAULT_PORT};
pub use error::{NtStatus, Result, SmbError, TransportError};
pub use facade::SmbClient;
pub use file::SmbFile;
pub use path::SmbPath;
pub use share::{ShareState, SmbShare};
