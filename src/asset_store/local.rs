use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use super::{AssetStore, AssetStoreError};

/// Writes assets straight to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetStore for LocalStore {
    async fn put(&self, path: &Path, data: Bytes) -> Result<(), AssetStoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &data).await?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool, AssetStoreError> {
        Ok(tokio::fs::try_exists(path).await?)
    }
}
