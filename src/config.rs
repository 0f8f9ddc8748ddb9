use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub download: DownloadConfig,
    /// Root directory holding one table per endpoint plus the asset directory
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint suffix is appended to. Always ends with `/`.
    pub base_url: String,
    pub endpoints: Vec<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Name of the endpoint table that lists the photos to fetch
    pub manifest: String,
    /// Number of concurrent download workers
    pub workers: usize,
    /// Maximum number of manifest rows fetched per run (None = all)
    pub limit: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com/".to_string(),
            endpoints: vec!["users".to_string(), "photos".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            manifest: "photos".to_string(),
            workers: 4,
            limit: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = std::env::var("API_URL").map_err(|_| {
            ConfigError::ValidationError("API_URL must be set".to_string())
        })?;

        let endpoints: Vec<String> = std::env::var("API_ENDPOINTS")
            .map(|e| {
                e.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| ApiConfig::default().endpoints);

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let workers = match std::env::var("WORKERS") {
            Ok(s) => s.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("WORKERS must be a positive integer, got {s}"))
            })?,
            Err(_) => DownloadConfig::default().workers,
        };

        let limit = parse_limit(std::env::var("DOWNLOAD_LIMIT").ok().as_deref())?;

        let manifest = std::env::var("PHOTOS_ENDPOINT").unwrap_or_else(|_| "photos".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let config = Config {
            api: ApiConfig {
                base_url: normalize_base_url(&base_url),
                endpoints,
                request_timeout,
            },
            download: DownloadConfig {
                manifest,
                workers,
                limit,
            },
            data_dir: PathBuf::from(data_dir),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("API_URL is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "API_URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if self.download.workers == 0 {
            return Err(ConfigError::ValidationError(
                "WORKERS must be at least 1".to_string(),
            ));
        }

        if self.download.manifest.is_empty() {
            return Err(ConfigError::ValidationError(
                "PHOTOS_ENDPOINT cannot be empty".to_string(),
            ));
        }

        if self.api.endpoints.is_empty() {
            tracing::warn!("API_ENDPOINTS is empty, only the download phase will run");
        } else if !self.api.endpoints.contains(&self.download.manifest) {
            tracing::warn!(
                manifest = %self.download.manifest,
                "Photo manifest is not among the scraped endpoints, an existing table will be used if present"
            );
        }

        Ok(())
    }

    /// Absolute URLs of every configured endpoint, in configuration order.
    pub fn endpoint_urls(&self) -> Vec<String> {
        self.api
            .endpoints
            .iter()
            .map(|suffix| format!("{}{}", self.api.base_url, suffix.trim_start_matches('/')))
            .collect()
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        table_path(&self.data_dir, name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.table_path(&self.download.manifest)
    }

    /// Directory downloaded assets are written under.
    pub fn asset_root(&self) -> PathBuf {
        self.data_dir.join(&self.download.manifest)
    }
}

pub fn table_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{name}.csv"))
}

/// Unset or blank means no cap; anything else must be a non-negative integer.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| {
            ConfigError::ValidationError(format!(
                "DOWNLOAD_LIMIT must be a non-negative integer, got {s}"
            ))
        }),
    }
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
