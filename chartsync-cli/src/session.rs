//! Session and collection configuration stored in the data directory.

use anyhow::{Context, Result};
use chartsync_types::CollectionSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The signed-in session stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User identifier of the signed-in principal.
    pub uid: String,
    /// When the session was created, seconds since the Unix epoch.
    pub signed_in_at: u64,
}

impl SessionConfig {
    /// Create a session for `uid`.
    pub fn new(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            signed_in_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Load the session, if one exists.
    pub async fn load(data_dir: &Path) -> Result<Option<Self>> {
        let path = data_dir.join("session.json");
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let session = serde_json::from_str(&contents).context("Invalid session file")?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read session file"),
        }
    }

    /// Save the session.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("session.json");
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save session file")?;
        Ok(())
    }

    /// Remove the session. Not an error if none exists.
    pub async fn remove(data_dir: &Path) -> Result<()> {
        let path = data_dir.join("session.json");
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}

/// Collections the reconciler covers.
///
/// Defaults to the clinic set; a `collections.json` file in the data
/// directory overrides it.
pub async fn load_collections(data_dir: &Path) -> Result<Vec<CollectionSpec>> {
    let path = data_dir.join("collections.json");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => serde_json::from_str(&contents).context("Invalid collections file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![
            CollectionSpec::same("patients"),
            CollectionSpec::same("treatments"),
            CollectionSpec::same("clinical_forms"),
        ]),
        Err(e) => Err(e).context("Failed to read collections file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SessionConfig::load(dir.path()).await.unwrap().is_none());

        SessionConfig::new("dr-crusher").save(dir.path()).await.unwrap();
        let loaded = SessionConfig::load(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded.uid, "dr-crusher");

        SessionConfig::remove(dir.path()).await.unwrap();
        assert!(SessionConfig::load(dir.path()).await.unwrap().is_none());
        // Removing twice is fine.
        SessionConfig::remove(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn default_collections_cover_the_clinic_set() {
        let dir = tempfile::tempdir().unwrap();
        let collections = load_collections(dir.path()).await.unwrap();
        let names: Vec<&str> = collections.iter().map(|c| c.local.as_str()).collect();
        assert_eq!(names, vec!["patients", "treatments", "clinical_forms"]);
    }

    #[tokio::test]
    async fn collections_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("collections.json"),
            r#"[{"local": "notes", "remote": "cloud_notes"}]"#,
        )
        .await
        .unwrap();

        let collections = load_collections(dir.path()).await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].local, "notes");
        assert_eq!(collections[0].remote, "cloud_notes");
    }
}
