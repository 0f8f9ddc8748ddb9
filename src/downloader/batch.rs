use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

use crate::asset_store::AssetStore;

use super::{DownloadJob, DownloadOutcome, DownloadReport};

/// Fetches a batch of assets with at most `workers` requests in flight.
///
/// Every job gets exactly one GET. Failures are logged and reported per job,
/// never returned as an error, so a batch always runs to completion.
#[derive(Clone)]
pub struct BatchDownloader {
    client: Client,
    store: Arc<dyn AssetStore>,
    workers: usize,
    cancel: CancellationToken,
}

impl BatchDownloader {
    pub fn new(client: Client, store: Arc<dyn AssetStore>, workers: usize) -> Self {
        Self {
            client,
            store,
            workers: workers.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Share a cancellation token with the caller. Jobs that have not written
    /// their body yet stop when it fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job and wait for all of them. Reports come back in job order.
    pub async fn download_all(&self, jobs: Vec<DownloadJob>) -> Vec<DownloadReport> {
        info!(jobs = jobs.len(), workers = self.workers, "Starting batch download");

        let mut reports: Vec<DownloadReport> = stream::iter(jobs)
            .map(|job| {
                let client = self.client.clone();
                let store = Arc::clone(&self.store);
                let cancel = self.cancel.clone();
                let span = tracing::info_span!("asset", index = job.index, url = %job.url);

                async move {
                    let handle = tokio::spawn(
                        download_one(client, store, cancel, job.clone()).instrument(span),
                    );
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(url = %job.url, error = %e, "Download worker failed");
                            DownloadOutcome::Crashed(e.to_string())
                        }
                    };
                    DownloadReport { job, outcome }
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        reports.sort_by_key(|r| r.job.index);
        reports
    }
}

async fn download_one(
    client: Client,
    store: Arc<dyn AssetStore>,
    cancel: CancellationToken,
    job: DownloadJob,
) -> DownloadOutcome {
    if cancel.is_cancelled() {
        return DownloadOutcome::Cancelled;
    }

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return DownloadOutcome::Cancelled,
        response = client.get(&job.url).send() => response,
    };

    let response = match response {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Asset request failed");
            return DownloadOutcome::Transport(e.to_string());
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "Asset request returned non-success status");
        return DownloadOutcome::HttpStatus(status.as_u16());
    }

    let body = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "Failed to read asset body");
            return DownloadOutcome::Transport(e.to_string());
        }
    };

    if cancel.is_cancelled() {
        return DownloadOutcome::Cancelled;
    }

    let bytes = body.len() as u64;
    match store.put(&job.destination, body).await {
        Ok(()) => {
            info!(path = %job.destination.display(), bytes, "Saved asset");
            DownloadOutcome::Saved { bytes }
        }
        Err(e) => {
            error!(path = %job.destination.display(), error = %e, "Failed to write asset");
            DownloadOutcome::Write(e.to_string())
        }
    }
}
