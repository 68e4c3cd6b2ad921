//! Sign the current principal out.

use anyhow::Result;
use std::path::Path;

use crate::session::SessionConfig;

/// Run the logout command.
pub async fn run(data_dir: &Path) -> Result<()> {
    SessionConfig::remove(data_dir).await?;
    println!("Signed out.");
    Ok(())
}
