//! Show the current sync status.

use anyhow::Result;
use chartsync_engine::{LocalStore, RemoteStore};
use chartsync_types::RemoteError;
use std::path::Path;

use crate::session::{load_collections, SessionConfig};
use crate::stores::{JsonLocalStore, JsonRemoteStore};

/// Run the status command.
pub async fn run(data_dir: &Path, offline: bool) -> Result<()> {
    println!("=== chartsync status ===");
    println!();

    match SessionConfig::load(data_dir).await? {
        Some(session) => {
            println!("Session:");
            println!("  User: {}", session.uid);
        }
        None => {
            println!("Session: SIGNED OUT");
            println!();
            println!("Run 'chartsync login --user <uid>' to sign in.");
            return Ok(());
        }
    }

    println!();
    println!("Collections:");

    let collections = load_collections(data_dir).await?;
    let local = JsonLocalStore::new(data_dir);
    let remote = JsonRemoteStore::new(data_dir, offline);

    let mut total_local = 0u64;
    let mut total_pending = 0u64;
    let mut reachable = true;

    for spec in &collections {
        let records = local.fetch_all(&spec.local).await?;
        total_local += records.len() as u64;

        let mut pending = 0u64;
        for record in &records {
            match remote.exists(&spec.remote, &record.id).await {
                Ok(true) => {}
                Ok(false) => pending += 1,
                Err(RemoteError::Connectivity(_)) => {
                    reachable = false;
                    pending = records.len() as u64;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        total_pending += pending;
        println!(
            "  {:<16} {} local, {} pending",
            spec.local,
            records.len(),
            pending
        );
    }

    println!();
    if reachable {
        println!("Remote: reachable ({total_pending} of {total_local} records pending)");
    } else {
        println!("Remote: OFFLINE ({total_local} records waiting)");
    }

    Ok(())
}
