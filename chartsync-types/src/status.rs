//! The shared sync status snapshot and its partial updates.

use serde::{Deserialize, Serialize};

/// Snapshot of the synchronizer's externally visible state.
///
/// A single instance is owned by the running service and mutated only
/// through [`StatusUpdate`] merges. Subscribers receive full snapshots,
/// never partial states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Whether a principal is currently signed in.
    pub authenticated: bool,
    /// Whether the last remote call reached the remote store.
    pub online: bool,
    /// Whether a reconciliation pass is currently running.
    pub syncing: bool,
    /// Completion time of the last successful pass, in milliseconds since
    /// the Unix epoch.
    pub last_sync_time: Option<u64>,
    /// Number of local records known to be waiting for push.
    pub pending_count: u64,
    /// Message of the last unclassified failure, if any.
    pub error: Option<String>,
}

/// A partial update to a [`SyncStatus`].
///
/// Only fields that were explicitly set are merged; everything else keeps
/// its prior value. Built with the `with_*`-style setters:
///
/// ```
/// use chartsync_types::{StatusUpdate, SyncStatus};
///
/// let mut status = SyncStatus::default();
/// StatusUpdate::new().authenticated(true).error(None).apply(&mut status);
/// assert!(status.authenticated);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    authenticated: Option<bool>,
    online: Option<bool>,
    syncing: Option<bool>,
    last_sync_time: Option<u64>,
    pending_count: Option<u64>,
    error: Option<Option<String>>,
}

impl StatusUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authenticated flag.
    pub fn authenticated(mut self, value: bool) -> Self {
        self.authenticated = Some(value);
        self
    }

    /// Set the online flag.
    pub fn online(mut self, value: bool) -> Self {
        self.online = Some(value);
        self
    }

    /// Set the syncing flag.
    pub fn syncing(mut self, value: bool) -> Self {
        self.syncing = Some(value);
        self
    }

    /// Set the last successful sync time (ms since the Unix epoch).
    pub fn last_sync_time(mut self, timestamp_ms: u64) -> Self {
        self.last_sync_time = Some(timestamp_ms);
        self
    }

    /// Set the pending record count.
    pub fn pending_count(mut self, count: u64) -> Self {
        self.pending_count = Some(count);
        self
    }

    /// Set or clear the error message.
    pub fn error(mut self, message: Option<String>) -> Self {
        self.error = Some(message);
        self
    }

    /// Merge this update into `status`.
    ///
    /// Invariant: `pending_count` is meaningful only while authenticated,
    /// so it is forced to 0 whenever this update clears `authenticated`.
    pub fn apply(&self, status: &mut SyncStatus) {
        if let Some(authenticated) = self.authenticated {
            status.authenticated = authenticated;
        }
        if let Some(online) = self.online {
            status.online = online;
        }
        if let Some(syncing) = self.syncing {
            status.syncing = syncing;
        }
        if let Some(timestamp) = self.last_sync_time {
            status.last_sync_time = Some(timestamp);
        }
        if let Some(count) = self.pending_count {
            status.pending_count = count;
        }
        if let Some(ref error) = self.error {
            status.error = error.clone();
        }
        if self.authenticated == Some(false) {
            status.pending_count = 0;
        }
    }
}
