//! File-backed demo stores and the session-file auth provider.
//!
//! Local records are plain JSON arrays under `<data-dir>/local/`, one
//! file per collection; the demo remote store is a single
//! `<data-dir>/remote.json` mapping collection → id → document. These
//! stand in for the embedded datastore and the cloud document store so
//! the engine can be driven end to end from the command line.

use async_trait::async_trait;
use chartsync_engine::{AuthSessionProvider, LocalStore, RemoteStore};
use chartsync_types::{Document, LocalError, Principal, RemoteError, SyncableRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Local store reading `local/<collection>.json` files.
pub struct JsonLocalStore {
    root: PathBuf,
}

impl JsonLocalStore {
    /// Create a store rooted at the data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl LocalStore for JsonLocalStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<SyncableRecord>, LocalError> {
        let path = self.root.join("local").join(format!("{collection}.json"));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| LocalError(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(LocalError(format!("{}: {e}", path.display()))),
        }
    }
}

type RemoteState = BTreeMap<String, BTreeMap<String, Document>>;

/// Demo remote store backed by `remote.json`.
///
/// With `offline` set, every call fails as connectivity-shaped, which is
/// how a real transport adapter would surface an unreachable endpoint.
pub struct JsonRemoteStore {
    path: PathBuf,
    offline: bool,
}

impl JsonRemoteStore {
    /// Create a store whose state lives in `<data-dir>/remote.json`.
    pub fn new(data_dir: &Path, offline: bool) -> Self {
        Self {
            path: data_dir.join("remote.json"),
            offline,
        }
    }

    async fn load(&self) -> Result<RemoteState, RemoteError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| RemoteError::other(format!("corrupt remote state: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoteState::new()),
            Err(e) => Err(RemoteError::other(e.to_string())),
        }
    }

    async fn store(&self, state: &RemoteState) -> Result<(), RemoteError> {
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| RemoteError::other(e.to_string()))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| RemoteError::other(e.to_string()))
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline {
            Err(RemoteError::connectivity("offline mode"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for JsonRemoteStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        self.check_online()?;
        let state = self.load().await?;
        Ok(state
            .get(collection)
            .is_some_and(|documents| documents.contains_key(id)))
    }

    async fn commit_batch(
        &self,
        collection: &str,
        documents: Vec<(String, Document)>,
    ) -> Result<(), RemoteError> {
        self.check_online()?;
        let mut state = self.load().await?;
        let target = state.entry(collection.to_string()).or_default();
        for (id, document) in documents {
            target.insert(id, document);
        }
        self.store(&state).await
    }
}

/// Auth provider backed by the session file, read once at construction.
///
/// A long-running `run` command sees sign-out only through its own
/// process; use `chartsync logout` and restart, or Ctrl-C.
pub struct FileAuthProvider {
    tx: Arc<watch::Sender<Option<Principal>>>,
}

impl FileAuthProvider {
    /// Create a provider from the current session file state.
    pub fn new(session_uid: Option<String>) -> Self {
        let principal = session_uid.map(Principal::new);
        let (tx, _) = watch::channel(principal);
        Self { tx: Arc::new(tx) }
    }
}

impl AuthSessionProvider for FileAuthProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_local_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let local = JsonLocalStore::new(dir.path());
        assert!(local.fetch_all("patients").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_store_reads_record_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let local_dir = dir.path().join("local");
        tokio::fs::create_dir_all(&local_dir).await.unwrap();
        tokio::fs::write(
            local_dir.join("patients.json"),
            r#"[{"id": "p1", "fields": {"name": "Ada"}}]"#,
        )
        .await
        .unwrap();

        let local = JsonLocalStore::new(dir.path());
        let records = local.fetch_all("patients").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "p1");
    }

    #[tokio::test]
    async fn remote_store_round_trips_batches() {
        let dir = tempfile::tempdir().unwrap();
        let remote = JsonRemoteStore::new(dir.path(), false);

        assert!(!remote.exists("patients", "p1").await.unwrap());

        let mut document = Document::new();
        document.insert("name".into(), json!("Ada"));
        remote
            .commit_batch("patients", vec![("p1".into(), document)])
            .await
            .unwrap();

        assert!(remote.exists("patients", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn offline_remote_fails_as_connectivity() {
        let dir = tempfile::tempdir().unwrap();
        let remote = JsonRemoteStore::new(dir.path(), true);

        let err = remote.exists("patients", "p1").await.unwrap_err();
        assert!(matches!(err, RemoteError::Connectivity(_)));
    }

    #[test]
    fn file_auth_provider_reports_session() {
        let signed_out = FileAuthProvider::new(None);
        assert!(signed_out.current_principal().is_none());

        let signed_in = FileAuthProvider::new(Some("dr-crusher".into()));
        assert_eq!(
            signed_in.current_principal().map(|p| p.uid),
            Some("dr-crusher".to_string())
        );
    }
}
