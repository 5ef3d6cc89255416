//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the directory holding the data file exists; warn when the static
/// images directory is missing.
pub async fn ensure_env(images_dir: &str, data_file: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(images_dir).await.is_err() {
        warn!(%images_dir, "images directory not found; /images requests will 404");
    }
    if let Some(data_dir) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_data_dir() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("ensure_env_{}", uuid::Uuid::new_v4()));
        let data_file = root.join("data").join("productos.json");
        let images = root.join("missing-images");

        ensure_env(images.to_str().unwrap(), data_file.to_str().unwrap()).await?;
        assert!(tokio::fs::metadata(root.join("data")).await?.is_dir());
        // the data file itself is left for the store to bootstrap
        assert!(tokio::fs::metadata(&data_file).await.is_err());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn ensure_env_accepts_bare_file_name() -> anyhow::Result<()> {
        ensure_env("definitely-not-here", "productos.json").await
    }
}
