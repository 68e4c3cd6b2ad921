//! Error types for chartsync.

use thiserror::Error;

/// Errors surfaced by a remote store adapter.
///
/// The variants are structural, not message-sniffed: each adapter owns the
/// mapping from its transport's error shapes into this taxonomy, and the
/// classifier downstream never inspects message text.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The remote endpoint could not be reached (offline, DNS, timeout).
    #[error("remote unreachable: {0}")]
    Connectivity(String),

    /// The remote store rejected the caller's credentials.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other remote failure.
    #[error("remote error: {0}")]
    Other(String),
}

impl RemoteError {
    /// Create a connectivity-shaped error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Create a permission-denied-shaped error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Create an unclassified remote error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Error surfaced by a local store adapter.
///
/// Routine empty results are not errors; this covers real fetch failures
/// (corrupt data, I/O problems).
#[derive(Debug, Clone, Error)]
#[error("local store error: {0}")]
pub struct LocalError(pub String);

/// The classified outcome of a failed reconciliation pass.
///
/// The three-way split is the load-bearing design decision: the two
/// expected modes (signed out, offline) are normal operating conditions
/// and must never be surfaced to the user as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    /// The principal disappeared during the pass.
    #[error("principal signed out during sync")]
    AuthLost,

    /// The remote store could not be reached; retried on the next tick.
    #[error("remote unreachable")]
    Connectivity,

    /// An unexpected failure, surfaced via the status error field.
    #[error("{0}")]
    Unclassified(String),
}
