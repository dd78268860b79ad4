//! DFS referral resolution.
//!
//! A path on a DFS namespace server may be covered by a referral pointing at
//! a different host/share. The resolver pushes a probe through the
//! underlying client's referral machinery and hands back the path the
//! operation should actually address. Resolution failures are not retried
//! here; the caller decides whether to retry the whole operation.

use tracing::debug;

use crate::client::{DiskShare, SmbSession};
use crate::error::{NtStatus, Result, SmbError};
use crate::path::SmbPath;

/// Resolves virtual SMB paths through the server's DFS referral table.
#[derive(Debug, Default)]
pub struct DfsResolver;

impl DfsResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve `path` through `session`.
    ///
    /// The probe carries [`NtStatus::PathNotCovered`], which forces the
    /// library's referral resolution to run even though no real operation
    /// has failed yet. Returns the same path when it is not part of a DFS
    /// namespace.
    pub fn resolve(&self, session: &dyn SmbSession, path: &SmbPath) -> Result<SmbPath> {
        let resolved = session
            .resolve_path(path, NtStatus::PathNotCovered)
            .map_err(|source| SmbError::DfsResolution {
                path: path.unc(),
                source,
            })?;
        if resolved != *path {
            debug!(from = %path, to = %resolved, "DFS referral rewrote path");
        }
        Ok(resolved)
    }
}

/// A mounted share handle paired with the resolved path to use on it.
///
/// Created once per connect, consumed immediately by the operation.
pub struct DfsResolutionResult {
    /// The mounted share (DFS-resolved or directly connected).
    pub share: Box<dyn DiskShare>,
    /// The path addressing the target on that share.
    pub path: SmbPath,
}

impl DfsResolutionResult {
    /// Pair a mounted share with its resolved path.
    pub fn new(share: Box<dyn DiskShare>, path: SmbPath) -> Self {
        Self { share, path }
    }
}
