//! Push-based metrics reporter for Trendcast
//!
//! Periodically outputs a snapshot as structured JSON to stdout.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::application::forecasting::trainer::Trainer;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub models: ModelSnapshot,
    pub activity: ActivitySnapshot,
}

#[derive(Serialize)]
pub struct ModelSnapshot {
    pub stored_count: usize,
    pub stored_symbols: Vec<String>,
    pub training: Vec<String>,
}

#[derive(Serialize)]
pub struct ActivitySnapshot {
    pub forecasts_succeeded: u64,
    pub trainings_succeeded: u64,
}

/// Push-based metrics reporter
///
/// No HTTP server, no incoming connections - only outbound data.
pub struct MetricsReporter {
    trainer: Arc<Trainer>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(trainer: Arc<Trainer>, metrics: Metrics, interval_seconds: u64) -> Self {
        Self {
            trainer,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.collect_snapshot().await {
                Ok(snapshot) => match serde_json::to_string(&snapshot) {
                    Ok(json) => {
                        // Prefix lets log shippers filter snapshots
                        println!("METRICS_JSON:{}", json);
                        info!(
                            "Models: {} stored | {} training | Uptime: {}s",
                            snapshot.models.stored_count,
                            snapshot.models.training.len(),
                            snapshot.uptime_seconds
                        );
                    }
                    Err(e) => warn!("Failed to serialize metrics: {}", e),
                },
                Err(e) => warn!("Failed to collect metrics: {}", e),
            }
        }
    }

    /// Collect current metrics snapshot
    pub async fn collect_snapshot(&self) -> anyhow::Result<MetricsSnapshot> {
        let uptime = self.start_time.elapsed().as_secs();
        let stored_symbols = self.trainer.stored_symbols().await?;

        self.metrics.uptime_seconds.set(uptime as f64);

        Ok(MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            models: ModelSnapshot {
                stored_count: stored_symbols.len(),
                stored_symbols,
                training: self.trainer.in_flight(),
            },
            activity: ActivitySnapshot {
                forecasts_succeeded: self
                    .metrics
                    .forecasts_total
                    .with_label_values(&["success"])
                    .get() as u64,
                trainings_succeeded: self
                    .metrics
                    .training_runs_total
                    .with_label_values(&["success"])
                    .get() as u64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::forecasting::settings::ForecastSettings;
    use crate::domain::ml::artifact::tests::sample_artifact;
    use crate::domain::repositories::ModelArtifactStore;
    use crate::infrastructure::mock::MockPriceHistoryProvider;
    use crate::infrastructure::persistence::InMemoryArtifactStore;

    #[tokio::test]
    async fn test_metrics_snapshot_collection() {
        let store = Arc::new(InMemoryArtifactStore::new());
        store.save(&sample_artifact("AAPL", 60)).await.unwrap();
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_forecasts("success");

        let trainer = Arc::new(
            Trainer::new(
                Arc::new(MockPriceHistoryProvider::default()),
                store,
                ForecastSettings::default(),
                metrics.clone(),
            )
            .unwrap(),
        );
        let reporter = MetricsReporter::new(trainer, metrics, 60);

        let snapshot = reporter
            .collect_snapshot()
            .await
            .expect("Failed to collect snapshot");

        assert_eq!(snapshot.models.stored_symbols, vec!["AAPL"]);
        assert!(snapshot.models.training.is_empty());
        assert_eq!(snapshot.activity.forecasts_succeeded, 1);
        assert!(!snapshot.timestamp.is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            timestamp: "2026-01-10T10:00:00Z".to_string(),
            uptime_seconds: 3600,
            version: "0.4.2".to_string(),
            models: ModelSnapshot {
                stored_count: 1,
                stored_symbols: vec!["NVDA".to_string()],
                training: vec!["TSLA".to_string()],
            },
            activity: ActivitySnapshot {
                forecasts_succeeded: 12,
                trainings_succeeded: 2,
            },
        };

        let json = serde_json::to_string(&snapshot).expect("Failed to serialize");
        assert!(json.contains("NVDA"));
        assert!(json.contains("\"training\":[\"TSLA\"]"));
    }
}
