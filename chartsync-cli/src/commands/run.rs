//! Keep syncing periodically until interrupted.

use anyhow::{Context, Result};
use chartsync_core::SyncPhase;
use std::path::Path;
use std::time::Duration;

use crate::session::{load_collections, SessionConfig};
use crate::stores::{FileAuthProvider, JsonLocalStore, JsonRemoteStore};
use chartsync_engine::{SyncConfig, SyncService};

/// Run the run command.
pub async fn run(data_dir: &Path, offline: bool, interval_secs: u64) -> Result<()> {
    let session = SessionConfig::load(data_dir).await?;
    let collections = load_collections(data_dir).await?;

    let config = SyncConfig::new(collections)
        .with_sync_interval(Duration::from_secs(interval_secs.max(1)));
    let service = SyncService::new(
        config,
        JsonLocalStore::new(data_dir),
        JsonRemoteStore::new(data_dir, offline),
        FileAuthProvider::new(session.map(|s| s.uid)),
    );

    let subscription = service.subscribe(|status| {
        tracing::info!(
            phase = %SyncPhase::of(status),
            pending = status.pending_count,
            "status changed"
        );
    });

    service.start();
    println!("Syncing every {interval_secs}s; press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    service.stop();
    subscription.unsubscribe();
    println!("Stopped.");

    Ok(())
}
