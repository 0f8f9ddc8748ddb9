//! Shared test helpers for unit tests.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::asset_store::{AssetStore, AssetStoreError};
use crate::config::{ApiConfig, Config, DownloadConfig};

/// Config rooted at `data_dir`, scraping `endpoints` under `base_url` with one worker.
pub fn test_config(data_dir: &Path, base_url: &str, endpoints: &[&str]) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            request_timeout: Duration::from_secs(5),
        },
        download: DownloadConfig {
            workers: 1,
            ..Default::default()
        },
        data_dir: data_dir.to_path_buf(),
    }
}

/// Asset store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl AssetStore for FailingStore {
    async fn put(&self, _path: &Path, _data: Bytes) -> Result<(), AssetStoreError> {
        Err(AssetStoreError::Io(std::io::Error::other("disk full")))
    }

    async fn exists(&self, _path: &Path) -> Result<bool, AssetStoreError> {
        Ok(false)
    }
}
