//! CLI command implementations.

pub mod login;
pub mod logout;
pub mod run;
pub mod status;
pub mod sync;

use crate::session::{load_collections, SessionConfig};
use crate::stores::{FileAuthProvider, JsonLocalStore, JsonRemoteStore};
use anyhow::Result;
use chartsync_engine::{SyncConfig, SyncService};
use std::path::Path;

/// The concrete service the CLI drives.
pub type CliService = SyncService<JsonLocalStore, JsonRemoteStore, FileAuthProvider>;

/// Build a service against the file-backed stores and session.
pub async fn build_service(data_dir: &Path, offline: bool) -> Result<CliService> {
    let session = SessionConfig::load(data_dir).await?;
    let collections = load_collections(data_dir).await?;

    let local = JsonLocalStore::new(data_dir);
    let remote = JsonRemoteStore::new(data_dir, offline);
    let auth = FileAuthProvider::new(session.map(|s| s.uid));

    Ok(SyncService::new(
        SyncConfig::new(collections),
        local,
        remote,
        auth,
    ))
}
