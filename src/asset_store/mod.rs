mod local;

pub use local::LocalStore;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for downloaded asset bodies.
/// Paths are the derived destinations recorded in the manifest, so every
/// worker writes to its own path.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write the full body, creating parent directories and replacing any
    /// existing file.
    async fn put(&self, path: &Path, data: Bytes) -> Result<(), AssetStoreError>;
    async fn exists(&self, path: &Path) -> Result<bool, AssetStoreError>;
}
