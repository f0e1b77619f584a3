#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use trendcast::application::ForecastingEngine;
use trendcast::application::forecasting::ForecastSettings;
use trendcast::domain::forecasting::{ForecastResult, ModelState};
use trendcast::domain::ml::TrainingParams;
use trendcast::domain::repositories::ModelArtifactStore;
use trendcast::infrastructure::observability::Metrics;
use trendcast::infrastructure::{InMemoryArtifactStore, MockPriceHistoryProvider};

/// Default engine settings with a network small enough to train in tests
pub fn fast_settings() -> ForecastSettings {
    ForecastSettings {
        training: TrainingParams {
            max_epochs: 3,
            patience: 2,
            batch_size: 32,
            learning_rate: 0.01,
            hidden_units: 4,
            seed: 5,
        },
        ..ForecastSettings::default()
    }
}

pub fn mock_provider() -> MockPriceHistoryProvider {
    MockPriceHistoryProvider::new(7)
        .with_unavailable(["ZZZZZNOTREAL"])
        .with_failing(["DOWN"])
        .with_bar_limit("TINY", 40)
        .with_bar_limit("SHORT", 100)
}

pub fn engine_with(
    provider: MockPriceHistoryProvider,
    store: Arc<dyn ModelArtifactStore>,
    settings: ForecastSettings,
) -> ForecastingEngine {
    ForecastingEngine::with_components(
        Arc::new(provider),
        store,
        settings,
        Metrics::new().expect("metrics"),
    )
    .expect("engine")
}

pub fn engine() -> ForecastingEngine {
    engine_with(
        mock_provider(),
        Arc::new(InMemoryArtifactStore::new()),
        fast_settings(),
    )
}

pub async fn wait_until_ready(engine: &ForecastingEngine, symbol: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    while engine.model_state(symbol).await != ModelState::Ready {
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} never became ready",
            symbol
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub fn successes(counter: &prometheus::CounterVec) -> f64 {
    counter.with_label_values(&["success"]).get()
}

/// Long enough that a background run is still in flight on the next call
pub fn slow_settings() -> ForecastSettings {
    let mut settings = fast_settings();
    settings.training.max_epochs = 20;
    settings.training.patience = 20;
    settings.training.hidden_units = 8;
    settings
}

/// Artifacts pass through JSON, so compare prices with a tolerance
pub fn assert_same_forecast(a: &ForecastResult, b: &ForecastResult) {
    assert_eq!(a.symbol, b.symbol);
    assert_eq!(a.prediction_days, b.prediction_days);
    assert_eq!(a.recommendation, b.recommendation);
    assert!((a.current_price - b.current_price).abs() < 1e-9);
    for (x, y) in a.predicted_prices.iter().zip(&b.predicted_prices) {
        assert!((x - y).abs() < 1e-6, "{} vs {}", x, y);
    }
}
