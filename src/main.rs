use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_scraper::{
    asset_store::LocalStore, config::Config, downloader::missing_assets, storage::AssetTable,
    Scraper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "api-scraper starting");

    let config = Config::load()?;
    info!(
        base_url = %config.api.base_url,
        endpoints = config.api.endpoints.len(),
        workers = config.download.workers,
        "Loaded configuration"
    );

    let manifest_path = config.manifest_path();
    let scraper = Scraper::new(config)?;

    let cancel = scraper.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let report = scraper.run().await?;

    if let Some(summary) = report.downloads {
        info!(
            tables = report.tables.len(),
            saved = summary.saved,
            failed = summary.failed,
            cancelled = summary.cancelled,
            skipped = summary.skipped,
            "Downloads finished"
        );

        let table = AssetTable::load(&manifest_path)?;
        let missing = missing_assets(&table, &LocalStore::new()).await?;
        if !missing.is_empty() {
            warn!(
                rows = missing.len(),
                path = %manifest_path.display(),
                "Manifest references files that are not on disk"
            );
        }
    } else {
        info!(tables = report.tables.len(), "No photos to download");
    }

    info!("Done");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, cancelling downloads");
}
