//! api-scraper - Scrapes JSON API endpoints into CSV tables and downloads photos
//!
//! A run has two phases:
//! - Every configured endpoint is fetched in turn, its JSON body flattened into
//!   dotted-key columns and written as `<data_dir>/<endpoint>.csv`
//! - The photo manifest table is read back, each row gets a deterministic
//!   local path, the photos are fetched by a bounded worker pool and the
//!   manifest is rewritten with a `file_path` column
//!
//! Download failures never abort a run. Their rows still carry the attempted
//! path, so readers of the manifest must check that the file exists.

pub mod asset_store;
pub mod config;
pub mod downloader;
pub mod error;
pub mod records;
pub mod scraper;
pub mod storage;
#[cfg(test)]
pub mod testutil;

pub use config::Config;
pub use error::ScraperError;
pub use scraper::{RunReport, Scraper};
