//! SMB path representation and the pure path transforms.
//!
//! Servers speak backslash-separated paths relative to a share; callers hand
//! in forward-slash virtual paths that may still carry the share name as
//! their first segment. The functions here bridge the two. No I/O, no
//! failure modes: malformed input passes through unchanged.

use serde::{Deserialize, Serialize};

/// The server-side path separator.
pub const SEPARATOR: char = '\\';

/// Replace forward slashes with the server's path separator.
pub fn to_backslashes(path: &str) -> String {
    path.replace('/', "\\")
}

/// Remove a leading `share<separator>` prefix from `path`.
///
/// Exact equality with the share name yields the empty string. The match is
/// case-sensitive and anchored: a share name that is not a full leading path
/// segment is left alone.
pub fn strip_share_name(path: &str, share_name: &str, separator: char) -> String {
    if path == share_name {
        return String::new();
    }
    let mut prefix = String::with_capacity(share_name.len() + 1);
    prefix.push_str(share_name);
    prefix.push(separator);
    match path.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// Remove a single leading separator, if present.
pub fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix(SEPARATOR).unwrap_or(path)
}

/// A (host, share, path) triple addressing a file on an SMB server.
///
/// `path` is relative to the share, backslash-separated, and may be empty
/// for the share root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmbPath {
    /// Server hostname.
    pub host: String,
    /// Share name.
    pub share: String,
    /// Path relative to the share.
    pub path: String,
}

impl SmbPath {
    /// Create a new path triple.
    pub fn new(
        host: impl Into<String>,
        share: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            share: share.into(),
            path: path.into(),
        }
    }

    /// Render as a UNC path.
    pub fn unc(&self) -> String {
        if self.path.is_empty() {
            format!("\\\\{}\\{}", self.host, self.share)
        } else {
            format!("\\\\{}\\{}\\{}", self.host, self.share, self.path)
        }
    }

    /// Whether `other` addresses the same share on the same server.
    ///
    /// Hostnames compare case-insensitively, share names exactly.
    pub fn is_on_same_share(&self, other: &SmbPath) -> bool {
        self.host.eq_ignore_ascii_case(&other.host) && self.share == other.share
    }
}

impl std::fmt::Display for SmbPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.unc())
    }
}
