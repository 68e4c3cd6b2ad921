//! The user-facing sync phase, derived from a status snapshot.
//!
//! Rather than tracking a separate state variable that could drift from
//! the status record, the phase is a pure projection of [`SyncStatus`]:
//! every status update the scheduler applies moves the machine along the
//! transitions below, and sign-out pre-empts from any phase.
//!
//! ```text
//! Unauthenticated --sign-in--> Idle --tick/force--> Syncing
//! Syncing --success--> Idle
//! Syncing --connectivity--> OfflinePending --tick--> Syncing
//! Syncing --auth lost--> Unauthenticated
//! Syncing --unclassified--> ErrorState --tick/force--> Syncing
//! any --sign-out--> Unauthenticated
//! ```

use chartsync_types::SyncStatus;

/// The five observable phases of the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No principal is signed in; the scheduler is stopped.
    Unauthenticated,
    /// Signed in and waiting for the next tick.
    Idle,
    /// A reconciliation pass is running.
    Syncing,
    /// Signed in but offline, with records waiting for push.
    OfflinePending,
    /// The last pass failed for an unexpected reason.
    ErrorState,
}

impl SyncPhase {
    /// Derive the phase from a status snapshot.
    pub fn of(status: &SyncStatus) -> Self {
        if !status.authenticated {
            Self::Unauthenticated
        } else if status.syncing {
            Self::Syncing
        } else if status.error.is_some() {
            Self::ErrorState
        } else if !status.online && status.pending_count > 0 {
            Self::OfflinePending
        } else {
            Self::Idle
        }
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::OfflinePending => "offline-pending",
            Self::ErrorState => "error",
        };
        write!(f, "{name}")
    }
}
