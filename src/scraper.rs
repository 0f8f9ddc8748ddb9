use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use crate::asset_store::{AssetStore, LocalStore};
use crate::config::Config;
use crate::downloader::{plan_downloads, BatchDownloader, BatchSummary};
use crate::error::ScraperError;
use crate::records;
use crate::storage::AssetTable;

/// Result of one full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tables written by the scrape phase, in endpoint order
    pub tables: Vec<PathBuf>,
    /// None when there was no manifest to download from
    pub downloads: Option<BatchSummary>,
}

/// Scrapes every configured endpoint, then downloads the photos listed in
/// the manifest table.
pub struct Scraper {
    config: Config,
    client: Client,
    store: Arc<dyn AssetStore>,
    cancel: CancellationToken,
}

impl Scraper {
    pub fn new(config: Config) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.api.request_timeout)
            .build()?;
        Ok(Self::with_parts(
            config,
            client,
            Arc::new(LocalStore::new()),
            CancellationToken::new(),
        ))
    }

    pub fn with_parts(
        config: Config,
        client: Client,
        store: Arc<dyn AssetStore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            client,
            store,
            cancel,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that stops the run. Cancelling during downloads still persists
    /// the manifest.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<RunReport, ScraperError> {
        let span = tracing::info_span!(
            "run",
            endpoints = self.config.api.endpoints.len(),
            workers = self.config.download.workers
        );

        async {
            let tables = self.scrape_all().await?;
            let downloads = self.download_photos().await?;
            Ok::<_, ScraperError>(RunReport { tables, downloads })
        }
        .instrument(span)
        .await
    }

    /// Scrape endpoints one after another. The first failure aborts.
    pub async fn scrape_all(&self) -> Result<Vec<PathBuf>, ScraperError> {
        let mut written = Vec::new();
        for endpoint in self.config.endpoint_urls() {
            if self.cancel.is_cancelled() {
                return Err(ScraperError::Cancelled);
            }
            let path =
                records::scrape_endpoint(&self.client, &endpoint, &self.config.data_dir).await?;
            written.push(path);
        }
        Ok(written)
    }

    pub async fn download_photos(&self) -> Result<Option<BatchSummary>, ScraperError> {
        let downloader = BatchDownloader::new(
            self.client.clone(),
            Arc::clone(&self.store),
            self.config.download.workers,
        )
        .with_cancellation(self.cancel.clone());

        download_manifest(
            &self.config.manifest_path(),
            &self.config.asset_root(),
            &downloader,
            self.config.download.limit,
        )
        .await
    }
}

/// Load the manifest at `manifest_path`, record a destination for every row,
/// download up to `limit` rows and write the manifest back.
///
/// Returns `Ok(None)` without touching the filesystem when the manifest does
/// not exist. Once the batch starts, the manifest is saved on every exit
/// path, including when this future is dropped mid-batch.
pub async fn download_manifest(
    manifest_path: &Path,
    asset_root: &Path,
    downloader: &BatchDownloader,
    limit: Option<usize>,
) -> Result<Option<BatchSummary>, ScraperError> {
    let mut table = match AssetTable::load(manifest_path) {
        Ok(table) => table,
        Err(ScraperError::NotFound(path)) => {
            info!(path = %path.display(), "No photo manifest, skipping downloads");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let jobs = plan_downloads(&table, asset_root)?;
    for job in &jobs {
        table.set_file_path(job.index, job.destination.to_string_lossy());
    }

    let total = jobs.len();
    let scheduled: Vec<_> = jobs.into_iter().take(limit.unwrap_or(usize::MAX)).collect();
    let skipped = total - scheduled.len();
    if skipped > 0 {
        info!(skipped, limit = ?limit, "Download limit reached, remaining rows keep their path only");
    }

    let guard = SaveOnExit::new(&table, manifest_path);
    let reports = downloader.download_all(scheduled).await;
    guard.finish()?;

    let mut summary = BatchSummary::from_reports(&reports);
    summary.skipped = skipped;
    info!(
        path = %manifest_path.display(),
        saved = summary.saved,
        failed = summary.failed,
        cancelled = summary.cancelled,
        skipped = summary.skipped,
        "Photo manifest saved"
    );
    Ok(Some(summary))
}

/// Persists the manifest when dropped unless `finish` already did.
struct SaveOnExit<'a> {
    table: &'a AssetTable,
    path: &'a Path,
    saved: bool,
}

impl<'a> SaveOnExit<'a> {
    fn new(table: &'a AssetTable, path: &'a Path) -> Self {
        Self {
            table,
            path,
            saved: false,
        }
    }

    fn finish(mut self) -> Result<(), ScraperError> {
        self.saved = true;
        self.table.save(self.path)
    }
}

impl Drop for SaveOnExit<'_> {
    fn drop(&mut self) {
        if self.saved {
            return;
        }
        match self.table.save(self.path) {
            Ok(()) => info!(path = %self.path.display(), "Photo manifest saved after interrupted batch"),
            Err(e) => error!(path = %self.path.display(), error = %e, "Failed to save photo manifest"),
        }
    }
}
