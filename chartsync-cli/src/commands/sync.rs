//! Run one reconciliation pass.

use anyhow::Result;
use chartsync_types::SyncFailure;
use std::path::Path;

use super::build_service;

/// Run the sync command.
///
/// One-shot: runs a single pass without arming the periodic scheduler.
pub async fn run(data_dir: &Path, offline: bool) -> Result<()> {
    let service = build_service(data_dir, offline).await?;

    let outcome = service.force_sync().await;
    let status = service.status();

    match outcome {
        Ok(()) => {
            println!("Sync complete; all local records are remote.");
            if let Some(timestamp) = status.last_sync_time {
                println!("  Finished at: {timestamp} (ms since epoch)");
            }
            Ok(())
        }
        Err(SyncFailure::AuthLost) => {
            println!("Not signed in. Run 'chartsync login --user <uid>' first.");
            Ok(())
        }
        Err(SyncFailure::Connectivity) => {
            // Expected condition, not an error: report and exit cleanly.
            println!(
                "Remote unreachable; {} records waiting for the next sync.",
                status.pending_count
            );
            Ok(())
        }
        Err(SyncFailure::Unclassified(message)) => {
            anyhow::bail!("Sync failed: {message}");
        }
    }
}
