#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use api_scraper::asset_store::{AssetStore, AssetStoreError};
use api_scraper::config::{ApiConfig, Config, DownloadConfig};
use async_trait::async_trait;
use bytes::Bytes;

/// Stand-in for a JPEG body: SOI marker, some payload, EOI marker.
pub const FIXTURE_PHOTO: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

pub fn test_config(data_dir: &Path, base_url: &str, endpoints: &[&str], workers: usize) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            request_timeout: Duration::from_secs(5),
        },
        download: DownloadConfig {
            workers,
            ..Default::default()
        },
        data_dir: data_dir.to_path_buf(),
    }
}

pub fn sample_user() -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "name": "Leanne Graham",
        "username": "Bret",
        "email": "Sincere@april.biz",
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": {
                "lat": "-37.3159",
                "lng": "81.1496"
            }
        },
        "phone": "1-770-736-8031 x56442",
        "website": "hildegard.org",
        "company": {
            "name": "Romaguera-Crona",
            "catchPhrase": "Multi-layered client-server neural-net",
            "bs": "harness real-time e-markets"
        }
    })
}

/// Asset store whose writes panic inside the worker task.
pub struct PanickingStore;

#[async_trait]
impl AssetStore for PanickingStore {
    async fn put(&self, path: &Path, _data: Bytes) -> Result<(), AssetStoreError> {
        panic!("store exploded writing {}", path.display());
    }

    async fn exists(&self, _path: &Path) -> Result<bool, AssetStoreError> {
        Ok(false)
    }
}
