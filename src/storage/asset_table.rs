use std::path::Path;

use crate::error::ScraperError;

use super::atomic_writer::AtomicCsvWriter;

pub const URL_COLUMN: &str = "url";
pub const FILE_PATH_COLUMN: &str = "file_path";

/// One manifest row as seen by the downloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry<'a> {
    pub url: &'a str,
    pub file_path: Option<&'a str>,
}

/// The photo manifest: every column of the source table, kept verbatim and in
/// order, plus a `file_path` column appended on load when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    url_idx: usize,
    file_path_idx: usize,
}

impl AssetTable {
    /// Build a manifest from bare URLs.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec![URL_COLUMN.to_string(), FILE_PATH_COLUMN.to_string()],
            rows: urls
                .into_iter()
                .map(|u| vec![u.into(), String::new()])
                .collect(),
            url_idx: 0,
            file_path_idx: 1,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ScraperError> {
        if !path.exists() {
            return Err(ScraperError::NotFound(path.to_path_buf()));
        }

        let format_err = |reason: String| ScraperError::Format {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(io) => ScraperError::Io(io),
                other => format_err(format!("{other:?}")),
            })?;

        let mut columns: Vec<String> = reader
            .headers()
            .map_err(|e| format_err(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let url_idx = columns
            .iter()
            .position(|c| c == URL_COLUMN)
            .ok_or_else(|| format_err(format!("missing required `{URL_COLUMN}` column")))?;

        let existing_path_idx = columns.iter().position(|c| c == FILE_PATH_COLUMN);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| format_err(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if existing_path_idx.is_none() {
                row.push(String::new());
            }
            rows.push(row);
        }

        let file_path_idx = match existing_path_idx {
            Some(idx) => idx,
            None => {
                columns.push(FILE_PATH_COLUMN.to_string());
                columns.len() - 1
            }
        };

        Ok(Self {
            columns,
            rows,
            url_idx,
            file_path_idx,
        })
    }

    /// Overwrite `path` with the full table. A crash mid-write leaves the
    /// previous file in place.
    pub fn save(&self, path: &Path) -> Result<(), ScraperError> {
        let mut writer = AtomicCsvWriter::new(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.finish()?;
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entry(&self, idx: usize) -> Option<AssetEntry<'_>> {
        self.rows.get(idx).map(|row| self.entry_of(row))
    }

    pub fn entries(&self) -> impl Iterator<Item = AssetEntry<'_>> + '_ {
        self.rows.iter().map(|row| self.entry_of(row))
    }

    /// Value of an arbitrary column for one row.
    pub fn value(&self, idx: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(idx).map(|row| row[col].as_str())
    }

    pub fn set_file_path(&mut self, idx: usize, file_path: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(idx) {
            row[self.file_path_idx] = file_path.into();
        }
    }

    fn entry_of<'a>(&self, row: &'a [String]) -> AssetEntry<'a> {
        let file_path = row[self.file_path_idx].as_str();
        AssetEntry {
            url: row[self.url_idx].as_str(),
            file_path: (!file_path.is_empty()).then_some(file_path),
        }
    }
}
