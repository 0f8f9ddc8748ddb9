//! Endpoint scraping: one GET per endpoint, flattened into a CSV table.

mod fetcher;
mod flatten;
mod table;

pub use fetcher::{fetch, scrape_endpoint, table_name_for};
pub use flatten::{cell_text, flatten_record, KEY_SEPARATOR};
pub use table::RecordTable;
