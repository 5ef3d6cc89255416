//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the data directory exists; warn when the images directory is missing.
pub async fn ensure_env(images_dir: &str, data_file: &str) -> anyhow::Result<()> {
    common::env::ensure_env(images_dir, data_file).await
}
