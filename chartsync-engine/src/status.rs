//! The shared status machine.
//!
//! One [`StatusMachine`] instance per running service holds the single
//! [`SyncStatus`] record. It is the only writer: the scheduler and auth
//! handlers apply [`StatusUpdate`] merges through it, and subscribers
//! (typically a UI layer) receive full snapshots.

use chartsync_types::{StatusUpdate, SyncStatus};
use std::sync::{Arc, Mutex};

type Listener = Box<dyn Fn(&SyncStatus) + Send + Sync>;

struct StatusInner {
    status: SyncStatus,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Holds the shared [`SyncStatus`] and its subscribers.
///
/// Updates are serialized under a single mutex, so no subscriber ever
/// observes a partially merged state and notifications for two updates
/// never interleave. Listeners run with the update lock held and must not
/// call back into the machine.
#[derive(Clone)]
pub struct StatusMachine {
    inner: Arc<Mutex<StatusInner>>,
}

impl StatusMachine {
    /// Create a machine holding the all-default status.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusInner {
                status: SyncStatus::default(),
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Return an immutable copy of the current status.
    pub fn snapshot(&self) -> SyncStatus {
        self.inner.lock().unwrap().status.clone()
    }

    /// Register a listener.
    ///
    /// The listener is immediately invoked once with the current status —
    /// no subscriber ever waits for the first event — and then on every
    /// subsequent update, in registration order.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncStatus) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        listener(&inner.status);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Merge `update` into the status and notify all listeners with the
    /// full new snapshot. Returns the snapshot.
    pub fn update(&self, update: StatusUpdate) -> SyncStatus {
        let mut inner = self.inner.lock().unwrap();
        update.apply(&mut inner.status);
        let snapshot = inner.status.clone();
        for (_, listener) in &inner.listeners {
            listener(&snapshot);
        }
        snapshot
    }
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered listener.
pub struct Subscription {
    id: u64,
    inner: Arc<Mutex<StatusInner>>,
}

impl Subscription {
    /// Deregister the listener. Later updates no longer reach it.
    pub fn unsubscribe(self) {
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.retain(|(id, _)| *id != self.id);
    }
}
