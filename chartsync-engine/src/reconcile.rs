//! The reconciliation pass.
//!
//! One pass diffs local records against remote existence, collection by
//! collection, and pushes the difference as a single atomic batch per
//! collection. Existence is recomputed from scratch every pass, so partial
//! progress needs no bookkeeping: whatever a failed pass left behind is
//! re-evaluated on the next tick.

use crate::store::{AuthSessionProvider, LocalStore, RemoteStore};
use chartsync_core::{classify, to_document};
use chartsync_types::{CollectionSpec, SyncFailure};
use tracing::debug;

/// What a successful pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Total records pushed across all collections.
    pub pushed: u64,
    /// Total existence lookups issued.
    pub looked_up: u64,
}

/// Run one reconciliation pass over `collections`, in order.
///
/// The principal is re-checked before every remote call, not just the
/// first, because sign-out can occur mid-loop; losing it aborts the whole
/// pass with [`SyncFailure::AuthLost`] and no further side effects.
/// Collections already committed before a failure are not rolled back.
pub async fn run_pass<L, R, A>(
    local: &L,
    remote: &R,
    auth: &A,
    collections: &[CollectionSpec],
) -> Result<PassSummary, SyncFailure>
where
    L: LocalStore + ?Sized,
    R: RemoteStore + ?Sized,
    A: AuthSessionProvider + ?Sized,
{
    if auth.current_principal().is_none() {
        return Err(SyncFailure::AuthLost);
    }

    let mut summary = PassSummary::default();

    for spec in collections {
        let records = local
            .fetch_all(&spec.local)
            .await
            .map_err(|e| SyncFailure::Unclassified(e.to_string()))?;
        debug!(
            collection = %spec.local,
            records = records.len(),
            "scanning collection"
        );

        let mut pending = Vec::new();
        for record in records {
            if auth.current_principal().is_none() {
                return Err(SyncFailure::AuthLost);
            }
            summary.looked_up += 1;
            match remote.exists(&spec.remote, &record.id).await {
                Ok(true) => {}
                Ok(false) => pending.push(record),
                Err(error) => return Err(classify(&error)),
            }
        }

        if pending.is_empty() {
            continue;
        }
        if auth.current_principal().is_none() {
            return Err(SyncFailure::AuthLost);
        }
        let documents = pending
            .iter()
            .map(|record| (record.id.clone(), to_document(record)))
            .collect::<Vec<_>>();
        debug!(
            collection = %spec.remote,
            pending = documents.len(),
            "committing batch"
        );
        remote
            .commit_batch(&spec.remote, documents)
            .await
            .map_err(|error| classify(&error))?;
        summary.pushed += pending.len() as u64;
    }

    Ok(summary)
}

/// Count local records across `collections` without any remote calls.
///
/// Used after a connectivity failure so the status can still report
/// "N items waiting" while offline. Fetch failures count as zero for
/// that collection.
pub async fn count_local<L>(local: &L, collections: &[CollectionSpec]) -> u64
where
    L: LocalStore + ?Sized,
{
    let mut count = 0;
    for spec in collections {
        if let Ok(records) = local.fetch_all(&spec.local).await {
            count += records.len() as u64;
        }
    }
    count
}
