//! The auth-gated sync service.
//!
//! [`SyncService`] owns the periodic timer, the in-flight guard, and the
//! shared [`StatusMachine`]. The timer runs only while a principal is
//! signed in; every tick (and every [`SyncService::force_sync`]) runs at
//! most one reconciliation pass and applies its classified outcome to the
//! status.

use crate::reconcile::{self, PassSummary};
use crate::status::{StatusMachine, Subscription};
use crate::store::{AuthSessionProvider, LocalStore, RemoteStore};
use chartsync_types::{CollectionSpec, Principal, StatusUpdate, SyncFailure, SyncStatus};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default interval between reconciliation passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(45);

/// Configuration for [`SyncService`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Collections the reconciler covers, in pass order.
    pub collections: Vec<CollectionSpec>,
    /// Interval between periodic passes.
    pub sync_interval: Duration,
}

impl SyncConfig {
    /// Create a configuration with the default interval.
    pub fn new(collections: Vec<CollectionSpec>) -> Self {
        Self {
            collections,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }

    /// Set the interval between periodic passes.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }
}

struct ServiceInner<L, R, A> {
    config: SyncConfig,
    local: Arc<L>,
    remote: Arc<R>,
    auth: Arc<A>,
    status: StatusMachine,
    /// At-most-one pass in flight, shared by timer ticks and force_sync.
    in_flight: tokio::sync::Mutex<()>,
    timer: Mutex<Option<JoinHandle<()>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

/// The sync service: scheduler, status owner, and public API surface.
///
/// Cheap to clone; clones share the same service instance.
pub struct SyncService<L, R, A> {
    inner: Arc<ServiceInner<L, R, A>>,
}

impl<L, R, A> Clone for SyncService<L, R, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, R, A> SyncService<L, R, A>
where
    L: LocalStore + 'static,
    R: RemoteStore + 'static,
    A: AuthSessionProvider + 'static,
{
    /// Create a service. Nothing runs until [`SyncService::start`].
    pub fn new(config: SyncConfig, local: L, remote: R, auth: A) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                local: Arc::new(local),
                remote: Arc::new(remote),
                auth: Arc::new(auth),
                status: StatusMachine::new(),
                in_flight: tokio::sync::Mutex::new(()),
                timer: Mutex::new(None),
                watcher: Mutex::new(None),
            }),
        }
    }

    /// Apply the current auth state and begin watching for transitions.
    pub fn start(&self) {
        self.handle_auth(self.inner.auth.current_principal());

        let mut rx = self.inner.auth.watch();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let principal = rx.borrow_and_update().clone();
                this.handle_auth(principal);
            }
        });
        if let Some(old) = self.inner.watcher.lock().unwrap().replace(handle) {
            old.abort();
        }
    }

    /// Idempotent shutdown: stops the timer and the auth watcher.
    pub fn stop(&self) {
        self.stop_timer();
        if let Some(watcher) = self.inner.watcher.lock().unwrap().take() {
            watcher.abort();
        }
    }

    /// Re-evaluate the auth state on demand, without waiting for the
    /// provider's own event latency (e.g. immediately after an explicit
    /// login completes).
    pub fn notify_auth_changed(&self) {
        self.handle_auth(self.inner.auth.current_principal());
    }

    /// Return an immutable copy of the current status.
    pub fn status(&self) -> SyncStatus {
        self.inner.status.snapshot()
    }

    /// Register a status listener; it is immediately replayed the current
    /// status, then invoked on every update.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncStatus) + Send + Sync + 'static,
    {
        self.inner.status.subscribe(listener)
    }

    /// Run one reconciliation pass now.
    ///
    /// If a pass is already in flight this is a no-op returning `Ok(())`.
    /// Otherwise the caller awaits the pass and receives its classified
    /// outcome directly, in addition to the status update subscribers see.
    pub async fn force_sync(&self) -> Result<(), SyncFailure> {
        self.run_guarded().await
    }

    fn handle_auth(&self, principal: Option<Principal>) {
        match principal {
            Some(principal) => {
                info!(principal = %principal, "signed in; starting sync scheduler");
                self.inner
                    .status
                    .update(StatusUpdate::new().authenticated(true).error(None));
                self.start_timer();
            }
            None => {
                info!("signed out; stopping sync scheduler");
                self.stop_timer();
                self.inner.status.update(
                    StatusUpdate::new()
                        .authenticated(false)
                        .online(false)
                        .pending_count(0)
                        .error(None),
                );
            }
        }
    }

    /// Arm the periodic timer, stopping any existing one first so a
    /// duplicate sign-in event (e.g. token refresh) never produces two
    /// timers. The first tick fires immediately.
    fn start_timer(&self) {
        self.stop_timer();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(this.inner.config.sync_interval);
            loop {
                timer.tick().await;
                let _ = this.run_guarded().await;
            }
        });
        *self.inner.timer.lock().unwrap() = Some(handle);
    }

    fn stop_timer(&self) {
        if let Some(timer) = self.inner.timer.lock().unwrap().take() {
            timer.abort();
        }
    }

    async fn run_guarded(&self) -> Result<(), SyncFailure> {
        // Guard release is by drop, so it happens on every path.
        let _guard = match self.inner.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("reconciliation already in flight; skipping");
                return Ok(());
            }
        };

        self.inner.status.update(StatusUpdate::new().syncing(true));
        let outcome = reconcile::run_pass(
            &*self.inner.local,
            &*self.inner.remote,
            &*self.inner.auth,
            &self.inner.config.collections,
        )
        .await;
        self.apply_outcome(&outcome).await;
        outcome.map(|_| ())
    }

    async fn apply_outcome(&self, outcome: &Result<PassSummary, SyncFailure>) {
        match outcome {
            Ok(summary) => {
                info!(pushed = summary.pushed, "reconciliation pass complete");
                self.inner.status.update(
                    StatusUpdate::new()
                        .syncing(false)
                        .online(true)
                        .pending_count(0)
                        .error(None)
                        .last_sync_time(now_ms()),
                );
            }
            Err(SyncFailure::AuthLost) => {
                info!("principal lost during pass; scheduler stopping");
                self.stop_timer();
                self.inner.status.update(
                    StatusUpdate::new()
                        .syncing(false)
                        .authenticated(false)
                        .online(false)
                        .pending_count(0)
                        .error(None),
                );
            }
            Err(SyncFailure::Connectivity) => {
                // Offline is a normal operating condition, not an error;
                // recount pending from local records so the UI can still
                // report how many items are waiting.
                let pending =
                    reconcile::count_local(&*self.inner.local, &self.inner.config.collections)
                        .await;
                info!(pending, "remote unreachable; retrying on next tick");
                self.inner.status.update(
                    StatusUpdate::new()
                        .syncing(false)
                        .online(false)
                        .error(None)
                        .pending_count(pending),
                );
            }
            Err(SyncFailure::Unclassified(message)) => {
                warn!(error = %message, "reconciliation pass failed");
                self.inner.status.update(
                    StatusUpdate::new()
                        .syncing(false)
                        .error(Some(message.clone())),
                );
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAuthProvider, MockLocalStore, MockRemoteStore};
    use chartsync_core::SyncPhase;
    use chartsync_types::{RemoteError, SyncableRecord};
    use serde_json::json;

    struct Fixture {
        service: SyncService<MockLocalStore, MockRemoteStore, MockAuthProvider>,
        local: MockLocalStore,
        remote: MockRemoteStore,
        auth: MockAuthProvider,
    }

    fn fixture() -> Fixture {
        let local = MockLocalStore::new();
        let remote = MockRemoteStore::new();
        let auth = MockAuthProvider::new();
        let config = SyncConfig::new(vec![
            CollectionSpec::same("patients"),
            CollectionSpec::same("treatments"),
        ]);
        let service = SyncService::new(config, local.clone(), remote.clone(), auth.clone());
        Fixture {
            service,
            local,
            remote,
            auth,
        }
    }

    fn seed_clinic(local: &MockLocalStore) {
        local.insert(
            "patients",
            SyncableRecord::new("p1").with_field("name", json!("Ada")),
        );
        local.insert(
            "patients",
            SyncableRecord::new("p2").with_field("name", json!("Grace")),
        );
        local.insert(
            "treatments",
            SyncableRecord::new("t1").with_field("kind", json!("cleaning")),
        );
    }

    /// Let spawned tasks (timer ticks, watcher) run.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    /// Sign in and set the status flag without arming the timer, so
    /// force_sync-driven tests stay free of background ticks.
    fn sign_in_quietly(f: &Fixture) {
        f.auth.sign_in("u1");
        f.service
            .inner
            .status
            .update(StatusUpdate::new().authenticated(true));
    }

    #[tokio::test]
    async fn force_sync_pushes_and_updates_status() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);

        f.service.force_sync().await.unwrap();

        let status = f.service.status();
        assert!(status.online);
        assert!(!status.syncing);
        assert_eq!(status.pending_count, 0);
        assert_eq!(status.error, None);
        assert!(status.last_sync_time.is_some());

        // 2 patients lookups, 1 treatments lookup, one batch each.
        assert_eq!(f.remote.exists_calls().len(), 3);
        assert_eq!(f.remote.batches().len(), 2);
    }

    #[tokio::test]
    async fn force_sync_while_signed_out_is_auth_lost() {
        let f = fixture();
        seed_clinic(&f.local);

        let outcome = f.service.force_sync().await;
        assert_eq!(outcome, Err(SyncFailure::AuthLost));
        assert!(f.remote.batches().is_empty());
    }

    #[tokio::test]
    async fn connectivity_failure_goes_offline_with_local_pending_count() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);
        f.remote.fail_all(RemoteError::connectivity("no route to host"));

        let outcome = f.service.force_sync().await;
        assert_eq!(outcome, Err(SyncFailure::Connectivity));

        let status = f.service.status();
        assert!(!status.online);
        assert_eq!(status.error, None);
        // All three local records counted without further remote calls.
        assert_eq!(status.pending_count, 3);
        assert_eq!(SyncPhase::of(&status), SyncPhase::OfflinePending);
    }

    #[tokio::test]
    async fn unclassified_failure_surfaces_message_and_keeps_online_flag() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);

        // One good pass first so online is true.
        f.service.force_sync().await.unwrap();
        f.local
            .insert("patients", SyncableRecord::new("p3"));
        f.remote.fail_all(RemoteError::other("index backfill in progress"));

        let outcome = f.service.force_sync().await;
        assert!(matches!(outcome, Err(SyncFailure::Unclassified(_))));

        let status = f.service.status();
        assert_eq!(
            status.error.as_deref(),
            Some("remote error: index backfill in progress")
        );
        assert!(status.online, "online keeps its prior value");
        assert_eq!(SyncPhase::of(&status), SyncPhase::ErrorState);

        // The next successful pass clears the error.
        f.remote.heal();
        f.service.force_sync().await.unwrap();
        assert_eq!(f.service.status().error, None);
    }

    #[tokio::test]
    async fn force_sync_during_a_pass_is_a_no_op() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);
        f.remote.set_hold(true);

        let service = f.service.clone();
        let first = tokio::spawn(async move { service.force_sync().await });
        settle().await;

        // Second caller returns immediately without a second pass.
        f.service.force_sync().await.unwrap();
        f.remote.set_hold(false);
        first.await.unwrap().unwrap();

        // Exactly one pass's worth of remote traffic.
        assert_eq!(f.remote.exists_calls().len(), 3);
        assert_eq!(f.remote.batches().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_starts_timer_and_first_tick_is_immediate() {
        let f = fixture();
        seed_clinic(&f.local);
        f.service.start();

        f.auth.sign_in("u1");
        settle().await;

        assert_eq!(f.remote.batches().len(), 2);
        assert!(f.service.status().authenticated);

        f.service.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_at_the_configured_interval() {
        let f = fixture();
        f.auth.sign_in("u1");
        f.service.start();
        settle().await;

        let after_first = f.local.fetch_calls();
        assert!(after_first > 0, "immediate tick ran a pass");

        tokio::time::sleep(DEFAULT_SYNC_INTERVAL).await;
        settle().await;

        // Exactly one more pass (two collections fetched per pass).
        assert_eq!(f.local.fetch_calls(), after_first + 2);

        f.service.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_sign_in_keeps_a_single_timer() {
        let f = fixture();
        f.service.start();

        f.auth.sign_in("u1");
        settle().await;
        // Token refresh fires the auth event again.
        f.auth.sign_in("u1");
        settle().await;

        let after_restarts = f.local.fetch_calls();
        tokio::time::sleep(DEFAULT_SYNC_INTERVAL).await;
        settle().await;

        // One interval, one pass: two fetches, not four.
        assert_eq!(f.local.fetch_calls(), after_restarts + 2);

        f.service.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_stops_the_timer_and_resets_status() {
        let f = fixture();
        seed_clinic(&f.local);
        f.service.start();
        f.auth.sign_in("u1");
        settle().await;

        f.auth.sign_out();
        settle().await;

        let status = f.service.status();
        assert!(!status.authenticated);
        assert!(!status.online);
        assert_eq!(status.pending_count, 0);
        assert_eq!(status.error, None);
        assert_eq!(SyncPhase::of(&status), SyncPhase::Unauthenticated);

        let calls_at_sign_out = f.local.fetch_calls();
        tokio::time::sleep(DEFAULT_SYNC_INTERVAL * 3).await;
        settle().await;
        assert_eq!(f.local.fetch_calls(), calls_at_sign_out, "no further ticks");

        f.service.stop();
    }

    #[tokio::test]
    async fn auth_lost_mid_pass_ends_unauthenticated_not_error() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);

        let auth_handle = f.auth.clone();
        let remote_handle = f.remote.clone();
        f.remote.on_exists(move || {
            // Sign out after the second existence check.
            if remote_handle.exists_calls().len() == 2 {
                auth_handle.sign_out();
            }
        });

        let outcome = f.service.force_sync().await;
        assert_eq!(outcome, Err(SyncFailure::AuthLost));
        assert!(f.remote.batches().is_empty());

        let status = f.service.status();
        assert_eq!(SyncPhase::of(&status), SyncPhase::Unauthenticated);
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn subscribers_see_syncing_transitions() {
        let f = fixture();
        seed_clinic(&f.local);
        sign_in_quietly(&f);

        let phases = Arc::new(Mutex::new(Vec::new()));
        let phases2 = Arc::clone(&phases);
        let _sub = f.service.subscribe(move |status| {
            phases2.lock().unwrap().push(SyncPhase::of(status));
        });

        f.service.force_sync().await.unwrap();

        let phases = phases.lock().unwrap();
        assert!(phases.contains(&SyncPhase::Syncing));
        assert_eq!(*phases.last().unwrap(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn notify_auth_changed_picks_up_a_fresh_login() {
        let f = fixture();
        f.auth.sign_in("u1");

        // No watcher running; an explicit nudge applies the auth state.
        f.service.notify_auth_changed();
        assert!(f.service.status().authenticated);

        f.service.stop();
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let f = fixture();
        f.service.start();
        f.service.stop();
        f.service.stop();
    }
}
