mod asset_table;
mod atomic_writer;

pub use asset_table::{AssetEntry, AssetTable, FILE_PATH_COLUMN, URL_COLUMN};
pub use atomic_writer::AtomicCsvWriter;
