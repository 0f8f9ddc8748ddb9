use std::path::{Path, PathBuf};

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::table_path;
use crate::error::ScraperError;

use super::table::RecordTable;

/// Table name for an endpoint: the last non-empty segment of its URL path.
pub fn table_name_for(endpoint: &str) -> Result<String, ScraperError> {
    let url = Url::parse(endpoint).map_err(|_| ScraperError::InvalidEndpoint(endpoint.to_string()))?;
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| ScraperError::InvalidEndpoint(endpoint.to_string()))
}

/// GET one endpoint and flatten its JSON body into a table.
pub async fn fetch(client: &Client, endpoint: &str) -> Result<RecordTable, ScraperError> {
    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(|source| ScraperError::Connection {
            url: endpoint.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::Upstream {
            url: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ScraperError::InvalidBody {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

    RecordTable::from_json(body).map_err(|reason| ScraperError::InvalidBody {
        url: endpoint.to_string(),
        reason,
    })
}

/// Fetch one endpoint and write it as `<data_dir>/<name>.csv`.
/// Returns the path written.
pub async fn scrape_endpoint(
    client: &Client,
    endpoint: &str,
    data_dir: &Path,
) -> Result<PathBuf, ScraperError> {
    info!(endpoint, "Scraping endpoint");

    let name = table_name_for(endpoint)?;
    let table = fetch(client, endpoint).await?;
    let path = table_path(data_dir, &name);

    debug!(
        endpoint,
        rows = table.len(),
        columns = table.columns().len(),
        "Flattened response"
    );

    table.write_csv(&path)?;
    info!(endpoint, path = %path.display(), rows = table.len(), "Wrote table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_is_last_segment() {
        assert_eq!(
            table_name_for("https://jsonplaceholder.typicode.com/users").unwrap(),
            "users"
        );
        assert_eq!(
            table_name_for("http://127.0.0.1:8080/api/v1/photos/").unwrap(),
            "photos"
        );
        assert_eq!(
            table_name_for("https://api.test/comments?postId=1").unwrap(),
            "comments"
        );
    }

    #[test]
    fn test_table_name_rejects_bare_host() {
        assert!(matches!(
            table_name_for("https://api.test/"),
            Err(ScraperError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            table_name_for("not a url"),
            Err(ScraperError::InvalidEndpoint(_))
        ));
    }
}
