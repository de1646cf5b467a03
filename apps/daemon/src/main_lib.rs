use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use quotesync_connect::HttpQuoteApiClient;
use quotesync_core::quotes::{
    export_quotes_to_file, import_quotes_from_file, FileKeyValueStore, LocalStore,
};
use quotesync_core::sync::{
    start_sync_scheduler, LoggingProgressReporter, RemoteClient, SyncConfig, SyncOrchestrator,
};

use crate::cli::Commands;
use crate::config::Config;

pub struct AppState {
    pub store: Arc<LocalStore>,
    pub orchestrator: Arc<SyncOrchestrator<LoggingProgressReporter>>,
    pub sync_interval: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("QS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Quote store path in use: {}", config.store_path.display());
    let backend = Arc::new(FileKeyValueStore::new(config.store_path.clone()));
    let store = Arc::new(LocalStore::open(backend));

    let api = HttpQuoteApiClient::with_timeout(
        &config.api_url,
        config.user_id,
        config.request_timeout,
    )
    .context("Failed to build quote API client")?;
    tracing::info!("Remote quote endpoint: {}", api.endpoint());

    let orchestrator = Arc::new(SyncOrchestrator::with_reporter(
        store.clone(),
        RemoteClient::new(Arc::new(api)),
        Arc::new(LoggingProgressReporter),
    ));

    Ok(Arc::new(AppState {
        store,
        orchestrator,
        sync_interval: config.sync_interval,
    }))
}

/// Interval for `run`: the command-line override when given, clamped to one
/// second like `QS_SYNC_INTERVAL_SECS`.
fn run_interval(override_secs: Option<u64>, configured: Duration) -> Duration {
    override_secs
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or(configured)
}

pub async fn run_command(state: Arc<AppState>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run { interval_secs } => {
            let interval = run_interval(interval_secs, state.sync_interval);
            let handle = start_sync_scheduler(
                state.orchestrator.clone(),
                SyncConfig {
                    interval,
                    initial_delay: Duration::ZERO,
                },
            );
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down quote sync scheduler");
            handle.abort();
        }
        Commands::Sync => {
            let report = state.orchestrator.run_cycle().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Add { text, category } => {
            let quote = state.store.add(&text, &category)?;
            tracing::info!("Added quote \"{}\" ({})", quote.text, quote.category);
        }
        Commands::List { category } => {
            for quote in state.store.by_category(&category) {
                let id = quote
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("[{}] \"{}\" ({})", id, quote.text, quote.category);
            }
        }
        Commands::Categories => {
            for category in state.store.categories() {
                println!("{}", category);
            }
        }
        Commands::Import { path } => {
            let summary = import_quotes_from_file(&state.store, &path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            tracing::info!(
                "Imported {} quotes from {} ({} skipped)",
                summary.imported,
                path.display(),
                summary.skipped
            );
        }
        Commands::Export { path } => {
            let count = export_quotes_to_file(&state.store, &path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            tracing::info!("Exported {} quotes to {}", count, path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_interval_override_is_clamped_to_one_second() {
        let configured = Duration::from_secs(60);
        assert_eq!(run_interval(Some(0), configured), Duration::from_secs(1));
        assert_eq!(run_interval(Some(5), configured), Duration::from_secs(5));
        assert_eq!(run_interval(None, configured), configured);
    }
}
