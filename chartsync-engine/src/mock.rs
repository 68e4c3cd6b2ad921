//! In-memory mocks for testing.
//!
//! Allow seeding store contents, forcing failures, and capturing the
//! calls the engine makes. Clones share state, so a test can keep a
//! handle while the service owns another.

use crate::store::{AuthSessionProvider, LocalStore, RemoteStore};
use async_trait::async_trait;
use chartsync_types::{Document, LocalError, Principal, RemoteError, SyncableRecord};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// In-memory local store.
#[derive(Clone, Default)]
pub struct MockLocalStore {
    inner: Arc<Mutex<MockLocalInner>>,
}

#[derive(Default)]
struct MockLocalInner {
    collections: HashMap<String, Vec<SyncableRecord>>,
    fail_all: Option<String>,
    fetch_calls: u64,
}

impl MockLocalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a collection.
    pub fn insert(&self, collection: &str, record: SyncableRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Replace a collection's contents.
    pub fn set_records(&self, collection: &str, records: Vec<SyncableRecord>) {
        let mut inner = self.inner.lock().unwrap();
        inner.collections.insert(collection.to_string(), records);
    }

    /// Cause every `fetch_all` to fail with the given message.
    pub fn fail_all(&self, message: &str) {
        self.inner.lock().unwrap().fail_all = Some(message.to_string());
    }

    /// Number of `fetch_all` calls made so far.
    pub fn fetch_calls(&self) -> u64 {
        self.inner.lock().unwrap().fetch_calls
    }
}

#[async_trait]
impl LocalStore for MockLocalStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<SyncableRecord>, LocalError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_calls += 1;
        if let Some(message) = inner.fail_all.clone() {
            return Err(LocalError(message));
        }
        Ok(inner.collections.get(collection).cloned().unwrap_or_default())
    }
}

/// In-memory remote store.
///
/// Supports seeding existing documents, forcing typed failures, holding
/// calls open (for in-flight tests), and a per-lookup callback (for
/// sign-out-mid-pass tests).
#[derive(Clone)]
pub struct MockRemoteStore {
    inner: Arc<Mutex<MockRemoteInner>>,
    hold_tx: Arc<watch::Sender<bool>>,
}

#[derive(Default)]
struct MockRemoteInner {
    existing: HashMap<String, HashSet<String>>,
    batches: Vec<(String, Vec<(String, Document)>)>,
    exists_calls: Vec<(String, String)>,
    fail_next: Option<RemoteError>,
    fail_all: Option<RemoteError>,
    on_exists: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        let (hold_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(MockRemoteInner::default())),
            hold_tx: Arc::new(hold_tx),
        }
    }
}

impl MockRemoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a document as already existing remotely.
    pub fn insert_existing(&self, collection: &str, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .existing
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string());
    }

    /// All committed batches, in commit order.
    pub fn batches(&self) -> Vec<(String, Vec<(String, Document)>)> {
        self.inner.lock().unwrap().batches.clone()
    }

    /// All existence lookups made so far, as (collection, id).
    pub fn exists_calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().exists_calls.clone()
    }

    /// Cause the next call (lookup or commit) to fail.
    pub fn fail_next(&self, error: RemoteError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Cause every call to fail.
    pub fn fail_all(&self, error: RemoteError) {
        self.inner.lock().unwrap().fail_all = Some(error);
    }

    /// Stop failing calls.
    pub fn heal(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_all = None;
        inner.fail_next = None;
    }

    /// Invoke `callback` at the start of every existence lookup.
    pub fn on_exists<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().unwrap().on_exists = Some(Arc::new(callback));
    }

    /// While held, `exists` calls block until released.
    pub fn set_hold(&self, hold: bool) {
        self.hold_tx.send_replace(hold);
    }

    async fn wait_for_release(&self) {
        let mut rx = self.hold_tx.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    fn take_failure(inner: &mut MockRemoteInner) -> Option<RemoteError> {
        inner.fail_next.take().or_else(|| inner.fail_all.clone())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        self.wait_for_release().await;
        let callback = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .exists_calls
                .push((collection.to_string(), id.to_string()));
            if let Some(error) = Self::take_failure(&mut inner) {
                return Err(error);
            }
            inner.on_exists.clone()
        };
        if let Some(callback) = callback {
            callback();
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .existing
            .get(collection)
            .is_some_and(|ids| ids.contains(id)))
    }

    async fn commit_batch(
        &self,
        collection: &str,
        documents: Vec<(String, Document)>,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = Self::take_failure(&mut inner) {
            return Err(error);
        }
        let ids: Vec<String> = documents.iter().map(|(id, _)| id.clone()).collect();
        inner.batches.push((collection.to_string(), documents));
        inner
            .existing
            .entry(collection.to_string())
            .or_default()
            .extend(ids);
        Ok(())
    }
}

/// In-memory auth provider driven by explicit sign-in/sign-out calls.
#[derive(Clone)]
pub struct MockAuthProvider {
    tx: Arc<watch::Sender<Option<Principal>>>,
}

impl MockAuthProvider {
    /// Create a provider with nobody signed in.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Create a provider with `uid` already signed in.
    pub fn signed_in(uid: &str) -> Self {
        let provider = Self::new();
        provider.sign_in(uid);
        provider
    }

    /// Sign a principal in.
    pub fn sign_in(&self, uid: &str) {
        self.tx.send_replace(Some(Principal::new(uid)));
    }

    /// Sign the current principal out.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSessionProvider for MockAuthProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }
}
