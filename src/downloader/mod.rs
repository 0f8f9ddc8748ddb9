//! Photo download pipeline.
//!
//! Destinations are a pure function of the asset URL, so the `file_path`
//! column a run records is the same whatever order the workers finish in.
//! A path is recorded even when its download failed: consumers must check
//! that the file exists before trusting it.

mod batch;

pub use batch::BatchDownloader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::asset_store::{AssetStore, AssetStoreError};
use crate::error::ScraperError;
use crate::storage::AssetTable;

pub const ASSET_EXTENSION: &str = "jpg";

/// Greedy prefix up to the last `/` that is followed by a lowercase
/// alphanumeric run; the run is the asset identifier.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*/([0-9a-z]+)").expect("identifier pattern is valid"));

/// Identifier segment of an asset URL, e.g. `92c952` for
/// `https://via.placeholder.com/600/92c952`.
pub fn identifier_segment(url: &str) -> Option<&str> {
    IDENTIFIER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `<asset_root>/<identifier>.jpg`
pub fn derive_destination(url: &str, asset_root: &Path) -> Result<PathBuf, ScraperError> {
    let segment =
        identifier_segment(url).ok_or_else(|| ScraperError::PathDerivation(url.to_string()))?;
    Ok(asset_root.join(format!("{segment}.{ASSET_EXTENSION}")))
}

/// One manifest row scheduled for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Row index in the manifest
    pub index: usize,
    pub url: String,
    pub destination: PathBuf,
}

/// Derive a destination for every manifest row, in row order.
///
/// A single underivable URL rejects the whole batch: nothing has been
/// requested yet and the manifest is left as it was, so the caller can fix
/// the row and rerun instead of persisting a table with a hole in it.
pub fn plan_downloads(
    table: &AssetTable,
    asset_root: &Path,
) -> Result<Vec<DownloadJob>, ScraperError> {
    let jobs = table
        .entries()
        .enumerate()
        .map(|(index, entry)| {
            Ok(DownloadJob {
                index,
                url: entry.url.to_string(),
                destination: derive_destination(entry.url, asset_root)?,
            })
        })
        .collect::<Result<Vec<_>, ScraperError>>()?;

    let collisions = count_collisions(&jobs);
    if collisions > 0 {
        tracing::warn!(
            collisions,
            "Several manifest rows share a destination, the last download to finish wins"
        );
    }

    Ok(jobs)
}

fn count_collisions(jobs: &[DownloadJob]) -> usize {
    let mut seen: HashMap<&Path, usize> = HashMap::new();
    for job in jobs {
        *seen.entry(job.destination.as_path()).or_default() += 1;
    }
    seen.values().map(|n| n - 1).sum()
}

/// Manifest rows whose recorded `file_path` has no file behind it, either
/// because the download failed or because the row was never fetched.
pub async fn missing_assets(
    table: &AssetTable,
    store: &dyn AssetStore,
) -> Result<Vec<usize>, AssetStoreError> {
    let mut missing = Vec::new();
    for (index, entry) in table.entries().enumerate() {
        let present = match entry.file_path {
            Some(path) => store.exists(Path::new(path)).await?,
            None => false,
        };
        if !present {
            missing.push(index);
        }
    }
    Ok(missing)
}

/// What happened to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { bytes: u64 },
    HttpStatus(u16),
    Transport(String),
    Write(String),
    Cancelled,
    /// The worker task died before reporting
    Crashed(String),
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub job: DownloadJob,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Rows that were given a path but not scheduled because of the download limit
    pub skipped: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[DownloadReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Default::default()
        };
        for report in reports {
            match report.outcome {
                DownloadOutcome::Saved { .. } => summary.saved += 1,
                DownloadOutcome::Cancelled => summary.cancelled += 1,
                _ => summary.failed += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_placeholder_url() {
        assert_eq!(
            identifier_segment("https://via.placeholder.com/600/92c952"),
            Some("92c952")
        );
        assert_eq!(
            identifier_segment("https://via.placeholder.com/photos/testphoto3"),
            Some("testphoto3")
        );
    }

    #[test]
    fn test_identifier_stops_at_first_disallowed_char() {
        assert_eq!(
            identifier_segment("https://cdn.test/img/abc123.png?size=2"),
            Some("abc123")
        );
        assert_eq!(identifier_segment("https://cdn.test/a/b-c"), Some("b"));
    }

    #[test]
    fn test_identifier_falls_back_to_earlier_segment() {
        // Uppercase is outside the class, so the last usable slash is earlier.
        assert_eq!(identifier_segment("https://cdn.test/img/ABC"), Some("img"));
    }

    #[test]
    fn test_identifier_missing() {
        assert_eq!(identifier_segment("https://CDN.TEST/"), None);
        assert_eq!(identifier_segment("no-slashes-here"), None);
    }

    #[test]
    fn test_derive_destination_is_deterministic() {
        let root = Path::new("data/photos");
        let url = "https://via.placeholder.com/600/771796";

        let first = derive_destination(url, root).unwrap();
        let second = derive_destination(url, root).unwrap();
        assert_eq!(first, PathBuf::from("data/photos/771796.jpg"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_destination_error() {
        let result = derive_destination("https://HOST/", Path::new("photos"));
        assert!(matches!(result, Err(ScraperError::PathDerivation(url)) if url == "https://HOST/"));
    }

    #[test]
    fn test_plan_keeps_row_order() {
        let table = AssetTable::from_urls(["https://x/600/b2", "https://x/600/a1"]);
        let jobs = plan_downloads(&table, Path::new("photos")).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].index, 0);
        assert_eq!(jobs[0].destination, PathBuf::from("photos/b2.jpg"));
        assert_eq!(jobs[1].index, 1);
        assert_eq!(jobs[1].destination, PathBuf::from("photos/a1.jpg"));
    }

    #[test]
    fn test_plan_rejects_whole_batch_on_bad_url() {
        let table = AssetTable::from_urls(["https://x/600/ok1", "https://X/", "https://x/600/ok2"]);
        let result = plan_downloads(&table, Path::new("photos"));
        assert!(matches!(result, Err(ScraperError::PathDerivation(_))));
    }

    #[test]
    fn test_duplicate_urls_are_accepted() {
        let table = AssetTable::from_urls(["https://x/600/dup", "https://x/600/dup"]);
        let jobs = plan_downloads(&table, Path::new("photos")).unwrap();

        assert_eq!(jobs[0].destination, jobs[1].destination);
        assert_eq!(count_collisions(&jobs), 1);
    }

    #[test]
    fn test_summary_counts() {
        let job = DownloadJob {
            index: 0,
            url: "https://x/1".to_string(),
            destination: PathBuf::from("photos/1.jpg"),
        };
        let reports: Vec<DownloadReport> = [
            DownloadOutcome::Saved { bytes: 10 },
            DownloadOutcome::HttpStatus(404),
            DownloadOutcome::Transport("refused".to_string()),
            DownloadOutcome::Cancelled,
        ]
        .into_iter()
        .map(|outcome| DownloadReport {
            job: job.clone(),
            outcome,
        })
        .collect();

        let summary = BatchSummary::from_reports(&reports);
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                saved: 1,
                failed: 2,
                cancelled: 1,
                skipped: 0,
            }
        );
    }
}
