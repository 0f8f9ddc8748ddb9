//! Crash-safe CSV output.
//!
//! Rows go to a temporary file next to the destination, which replaces the
//! destination by rename on `finish()`. Dropping the writer unfinished removes
//! the temporary file and leaves the destination untouched.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::Writer;
use tempfile::NamedTempFile;

use crate::error::ScraperError;

pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
}

impl AtomicCsvWriter {
    /// Create a writer targeting `final_path`, creating its parent directory
    /// if needed. The temporary file lives in the same directory so the final
    /// rename never crosses filesystems.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent_dir)?;

        let temp_file = NamedTempFile::new_in(&parent_dir)?;
        let writer = Writer::from_writer(BufWriter::new(temp_file));

        Ok(Self { writer, final_path })
    }

    pub fn write_record<I, T>(&mut self, record: I) -> Result<(), ScraperError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(record)?;
        Ok(())
    }

    /// Flush everything and atomically replace the destination.
    pub fn finish(self) -> Result<PathBuf, ScraperError> {
        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| ScraperError::Io(std::io::Error::other(e.error().to_string())))?;

        let named_temp = buf_writer
            .into_inner()
            .map_err(|e| ScraperError::Io(std::io::Error::other(e.error().to_string())))?;

        named_temp
            .persist(&self.final_path)
            .map_err(|e| ScraperError::Io(e.error))?;

        Ok(self.final_path)
    }
}
