mod common;

use common::{assert_same_forecast, engine, engine_with, fast_settings, successes};
use std::sync::Arc;
use trendcast::domain::errors::ForecastError;
use trendcast::domain::forecasting::ModelState;
use trendcast::domain::forecasting::recommendation::derive_recommendation;
use trendcast::domain::repositories::ModelArtifactStore;
use trendcast::infrastructure::{InMemoryArtifactStore, MockPriceHistoryProvider};

#[tokio::test]
async fn test_first_request_trains_then_serves() {
    let engine = engine();
    assert_eq!(engine.model_state("AAPL").await, ModelState::NoArtifact);

    let forecast = engine.predict_trend("AAPL", 5).await.expect("forecast");

    assert_eq!(forecast.symbol, "AAPL");
    assert_eq!(forecast.prediction_days, 5);
    assert_eq!(forecast.predicted_prices.len(), 5);
    assert_eq!(forecast.predicted_price, forecast.predicted_prices[4]);
    assert!(forecast.current_price > 0.0);
    assert!(forecast.predicted_prices.iter().all(|p| p.is_finite()));

    let expected =
        (forecast.predicted_price - forecast.current_price) / forecast.current_price * 100.0;
    assert!((forecast.trend_change_percent - expected).abs() < 1e-9);
    assert_eq!(
        forecast.recommendation,
        derive_recommendation(forecast.trend_change_percent)
    );
    assert_eq!(engine.model_state("AAPL").await, ModelState::Ready);
}

#[tokio::test]
async fn test_second_request_reuses_artifact() {
    let engine = engine();

    engine.predict_trend("MSFT", 3).await.expect("first");
    engine.predict_trend("MSFT", 10).await.expect("second");

    assert_eq!(successes(&engine.metrics().training_runs_total), 1.0);
    assert_eq!(successes(&engine.metrics().forecasts_total), 2.0);
}

#[tokio::test]
async fn test_same_artifact_gives_same_forecast() {
    let engine = engine();

    let first = engine.predict_trend("NVDA", 7).await.expect("first");
    let second = engine.predict_trend("NVDA", 7).await.expect("second");

    assert_same_forecast(&first, &second);
}

#[tokio::test]
async fn test_longer_horizon_extends_shorter_one() {
    let engine = engine();

    let short = engine.predict_trend("META", 3).await.expect("short");
    let long = engine.predict_trend("META", 30).await.expect("long");

    assert_eq!(long.predicted_prices.len(), 30);
    for (a, b) in short.predicted_prices.iter().zip(&long.predicted_prices) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_forty_bars_yield_no_forecast() {
    let engine = engine();

    assert!(engine.predict_trend("TINY", 5).await.is_none());
    assert!(matches!(
        engine.try_predict_trend("TINY", 5).await,
        Err(ForecastError::InsufficientData { .. })
    ));
    assert_eq!(engine.model_state("TINY").await, ModelState::NoArtifact);
}

#[tokio::test]
async fn test_enough_bars_but_too_few_sequences() {
    // 100 bars pass the raw-bar check but leave 51 feature rows for L = 60
    let engine = engine();

    assert!(matches!(
        engine.try_predict_trend("SHORT", 5).await,
        Err(ForecastError::InsufficientData { .. })
    ));
}

#[tokio::test]
async fn test_stored_artifact_with_short_recent_history() {
    let store: Arc<dyn ModelArtifactStore> = Arc::new(InMemoryArtifactStore::new());

    let trained = engine_with(MockPriceHistoryProvider::new(7), store.clone(), fast_settings());
    trained.train_and_wait("AAPL").await.expect("train");

    // 100 recent bars leave fewer feature rows than one serving window
    let serving = engine_with(
        MockPriceHistoryProvider::new(7).with_bar_limit("AAPL", 100),
        store,
        fast_settings(),
    );
    assert_eq!(serving.model_state("AAPL").await, ModelState::Ready);

    assert!(matches!(
        serving.try_predict_trend("AAPL", 5).await,
        Err(ForecastError::InsufficientHistory { required: 60, .. })
    ));
    assert!(serving.predict_trend("AAPL", 5).await.is_none());
    assert_eq!(successes(&serving.metrics().training_runs_total), 0.0);
}

#[tokio::test]
async fn test_unknown_and_failing_symbols() {
    let engine = engine();

    assert!(matches!(
        engine.try_predict_trend("ZZZZZNOTREAL", 5).await,
        Err(ForecastError::ProviderUnavailable { .. })
    ));
    assert!(matches!(
        engine.try_predict_trend("DOWN", 5).await,
        Err(ForecastError::ProviderUnavailable { .. })
    ));
    assert!(engine.predict_trend("DOWN", 5).await.is_none());
    assert_eq!(engine.model_state("DOWN").await, ModelState::NoArtifact);
}

#[tokio::test]
async fn test_zero_days_rejected() {
    let engine = engine();
    assert!(matches!(
        engine.try_predict_trend("AAPL", 0).await,
        Err(ForecastError::InvalidRequest { .. })
    ));
}
