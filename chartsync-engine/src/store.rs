//! Store and auth trait seams.
//!
//! The engine consumes its collaborators through these narrow traits so
//! independent service instances can be constructed per test against
//! in-memory mocks (see [`crate::MockRemoteStore`] and friends), and so
//! production adapters own the mapping from their transport's error
//! shapes into the typed [`RemoteError`] taxonomy.

use async_trait::async_trait;
use chartsync_types::{Document, LocalError, Principal, RemoteError, SyncableRecord};
use tokio::sync::watch;

/// The embedded local record store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Fetch a snapshot of every record in `collection`.
    ///
    /// An empty collection is `Ok(vec![])`, never an error.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<SyncableRecord>, LocalError>;
}

/// The remote cloud document store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Point existence-lookup by record id.
    async fn exists(&self, collection: &str, id: &str) -> Result<bool, RemoteError>;

    /// Atomically commit a batch of documents to one collection.
    ///
    /// All-or-nothing: on error, none of the documents were written.
    async fn commit_batch(
        &self,
        collection: &str,
        documents: Vec<(String, Document)>,
    ) -> Result<(), RemoteError>;
}

/// The authentication/session provider.
pub trait AuthSessionProvider: Send + Sync {
    /// Synchronous check of the currently signed-in principal.
    fn current_principal(&self) -> Option<Principal>;

    /// Subscribe to sign-in/sign-out transitions.
    ///
    /// The receiver always holds the latest principal; the engine's
    /// watcher task observes every change.
    fn watch(&self) -> watch::Receiver<Option<Principal>>;
}
