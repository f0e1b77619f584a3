//! Prometheus metrics definitions for Trendcast
//!
//! All metrics use the `trendcast_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
    core::{AtomicF64, GenericGauge, GenericGaugeVec},
};
use std::sync::Arc;

/// Prometheus metrics for the forecasting engine
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Forecast requests by outcome (`success` or an error kind)
    pub forecasts_total: CounterVec,
    /// Training runs by outcome (`success` or an error kind)
    pub training_runs_total: CounterVec,
    /// Wall-clock duration of completed training runs
    pub training_duration_seconds: Histogram,
    /// Last forecast trend change per symbol, in percent
    pub trend_change_percent: GenericGaugeVec<AtomicF64>,
    /// Price history fetch latency
    pub provider_latency_seconds: HistogramVec,
    /// Price history fetches by provider and outcome
    pub provider_requests_total: CounterVec,
    /// Training runs currently in flight
    pub trainings_in_flight: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let forecasts_total = CounterVec::new(
            Opts::new("trendcast_forecasts_total", "Forecast requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(forecasts_total.clone()))?;

        let training_runs_total = CounterVec::new(
            Opts::new("trendcast_training_runs_total", "Training runs by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(training_runs_total.clone()))?;

        let training_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "trendcast_training_duration_seconds",
                "Duration of completed training runs in seconds",
            )
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        registry.register(Box::new(training_duration_seconds.clone()))?;

        let trend_change_percent = GaugeVec::new(
            Opts::new(
                "trendcast_trend_change_percent",
                "Last forecast trend change per symbol in percent",
            ),
            &["symbol"],
        )?;
        registry.register(Box::new(trend_change_percent.clone()))?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "trendcast_provider_latency_seconds",
                "Price history fetch latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["provider", "period"],
        )?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;

        let provider_requests_total = CounterVec::new(
            Opts::new(
                "trendcast_provider_requests_total",
                "Price history fetches by provider and outcome",
            ),
            &["provider", "outcome"],
        )?;
        registry.register(Box::new(provider_requests_total.clone()))?;

        let trainings_in_flight = Gauge::with_opts(Opts::new(
            "trendcast_trainings_in_flight",
            "Training runs currently in flight",
        ))?;
        registry.register(Box::new(trainings_in_flight.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "trendcast_uptime_seconds",
            "Process uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            forecasts_total,
            training_runs_total,
            training_duration_seconds,
            trend_change_percent,
            provider_latency_seconds,
            provider_requests_total,
            trainings_in_flight,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_forecasts(&self, outcome: &str) {
        self.forecasts_total.with_label_values(&[outcome]).inc();
    }

    pub fn inc_training_runs(&self, outcome: &str) {
        self.training_runs_total.with_label_values(&[outcome]).inc();
    }

    pub fn set_trend_change(&self, symbol: &str, percent: f64) {
        self.trend_change_percent
            .with_label_values(&[symbol])
            .set(percent);
    }

    /// Observe a price history fetch
    pub fn observe_provider_fetch(&self, provider: &str, period: &str, outcome: &str, latency: f64) {
        self.provider_latency_seconds
            .with_label_values(&[provider, period])
            .observe(latency);
        self.provider_requests_total
            .with_label_values(&[provider, outcome])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_forecasts("success");
        assert!(metrics.render().contains("trendcast_"));
    }

    #[test]
    fn test_trend_change_per_symbol() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.set_trend_change("AAPL", 4.5);
        metrics.set_trend_change("MSFT", -2.0);
        let output = metrics.render();
        assert!(output.contains("trendcast_trend_change_percent"));
        assert!(output.contains("AAPL"));
        assert!(output.contains("MSFT"));
    }

    #[test]
    fn test_counter_totals() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_training_runs("success");
        metrics.inc_training_runs("insufficient_data");
        metrics.inc_training_runs("success");

        let successes = metrics
            .training_runs_total
            .with_label_values(&["success"])
            .get();
        assert_eq!(successes, 2.0);
        assert!(metrics.render().contains("trendcast_training_runs_total"));
    }

    #[test]
    fn test_provider_fetch_observed() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.observe_provider_fetch("mock", "2y", "ok", 0.01);
        let output = metrics.render();
        assert!(output.contains("trendcast_provider_latency_seconds"));
        assert!(output.contains("trendcast_provider_requests_total"));
    }
}
