//! Sign a principal in.

use anyhow::Result;
use std::path::Path;

use crate::session::SessionConfig;

/// Run the login command.
pub async fn run(data_dir: &Path, user: &str) -> Result<()> {
    let session = SessionConfig::new(user);
    session.save(data_dir).await?;

    println!("Signed in as {}", session.uid);
    println!("Run 'chartsync sync' to push pending records.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_creates_session() {
        let dir = tempdir().unwrap();
        run(dir.path(), "dr-crusher").await.unwrap();

        let session = SessionConfig::load(dir.path()).await.unwrap().unwrap();
        assert_eq!(session.uid, "dr-crusher");
    }

    #[tokio::test]
    async fn login_replaces_existing_session() {
        let dir = tempdir().unwrap();
        run(dir.path(), "first").await.unwrap();
        run(dir.path(), "second").await.unwrap();

        let session = SessionConfig::load(dir.path()).await.unwrap().unwrap();
        assert_eq!(session.uid, "second");
    }
}
