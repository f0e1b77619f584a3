//! Trendcast Server - headless forecasting engine
//!
//! Keeps the recommendations board warm by refreshing it on an interval.
//! Metrics are pushed via structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! MODE=yahoo REFRESH_INTERVAL=900 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)
//! - `REFRESH_INTERVAL` - Interval in seconds between board refreshes (default: 900)

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;
use trendcast::application::ForecastingEngine;
use trendcast::config::Config;
use trendcast::infrastructure::observability::MetricsReporter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Trendcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Mode={:?}, Store={:?}, Watchlist={:?}",
        config.provider.mode,
        config.persistence.artifact_store,
        config.forecast.watchlist
    );

    let engine = Arc::new(ForecastingEngine::build(&config).await?);

    if config.observability.enabled {
        let interval = config.observability.interval_seconds;
        let reporter = MetricsReporter::new(
            engine.trainer().clone(),
            engine.metrics().clone(),
            interval,
        );
        tokio::spawn(async move {
            reporter.run().await;
        });
        info!("Metrics reporter started (interval: {}s)", interval);
    } else {
        info!("Metrics reporting disabled.");
    }

    let refresh = Duration::from_secs(config.observability.refresh_interval_seconds.max(1));
    let board_engine = engine.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh);
        loop {
            ticker.tick().await;
            let board = board_engine.recommendations_board().await;
            if board.is_empty() {
                warn!("Board: No actionable recommendations this cycle");
            }
            for forecast in &board {
                info!(
                    "Board: {} {} {:+.2}% ({})",
                    forecast.symbol,
                    forecast.recommendation,
                    forecast.trend_change_percent,
                    forecast.confidence
                );
            }
        }
    });

    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    Ok(())
}
