//! Failure classification.
//!
//! Maps a raw [`RemoteError`] into exactly one [`SyncFailure`] outcome.
//! Two of the three outcomes (signed out, offline) are expected operating
//! conditions; only `Unclassified` ever reaches the user as an error.

use chartsync_types::{RemoteError, SyncFailure};

/// Classify a remote store error into a pass outcome.
///
/// - Permission-denied-shaped errors mean the principal disappeared during
///   the call: the scheduler stops its timer and the status drops back to
///   unauthenticated.
/// - Connectivity-shaped errors mean the remote endpoint was unreachable:
///   the status goes offline with no user-visible error, and the pending
///   count is recomputed from local records alone.
/// - Everything else surfaces its message via the status error field.
pub fn classify(error: &RemoteError) -> SyncFailure {
    match error {
        RemoteError::PermissionDenied(_) => SyncFailure::AuthLost,
        RemoteError::Connectivity(_) => SyncFailure::Connectivity,
        RemoteError::Other(message) => SyncFailure::Unclassified(message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_auth_lost() {
        let err = RemoteError::permission_denied("missing or insufficient permissions");
        assert_eq!(classify(&err), SyncFailure::AuthLost);
    }

    #[test]
    fn connectivity_is_connectivity() {
        assert_eq!(
            classify(&RemoteError::connectivity("dns lookup failed")),
            SyncFailure::Connectivity
        );
        assert_eq!(
            classify(&RemoteError::connectivity("deadline exceeded")),
            SyncFailure::Connectivity
        );
    }

    #[test]
    fn anything_else_surfaces_its_message() {
        let err = RemoteError::other("quota exceeded");
        assert_eq!(
            classify(&err),
            SyncFailure::Unclassified("quota exceeded".into())
        );
    }
}
