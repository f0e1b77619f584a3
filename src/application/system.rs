use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::application::bootstrap::{PersistenceBootstrap, ServicesBootstrap};
use crate::application::forecasting::batch::BatchCoordinator;
use crate::application::forecasting::feature_pipeline::FeaturePipeline;
use crate::application::forecasting::forecaster::Forecaster;
use crate::application::forecasting::history::fetch_bars;
use crate::application::forecasting::settings::ForecastSettings;
use crate::application::forecasting::trainer::Trainer;
use crate::config::Config;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{
    FeatureRow, ForecastResult, ModelState, PredictionOutcome, TrainStatus,
};
use crate::domain::market::HistoryPeriod;
use crate::domain::ml::ModelArtifact;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::repositories::ModelArtifactStore;
use crate::infrastructure::factory::ServiceFactory;
use crate::infrastructure::observability::Metrics;

/// Entry point of the forecasting engine.
///
/// Every operation takes already-normalized symbols and day counts; see
/// `application::forecasting::request` for the caller-side helpers.
pub struct ForecastingEngine {
    provider: Arc<dyn PriceHistoryProvider>,
    trainer: Arc<Trainer>,
    forecaster: Arc<Forecaster>,
    batch: BatchCoordinator,
    pipeline: FeaturePipeline,
    metrics: Metrics,
}

impl ForecastingEngine {
    pub async fn build(config: &Config) -> Result<Self> {
        info!(
            "Building Trendcast engine (Mode: {:?}, Store: {:?})...",
            config.provider.mode, config.persistence.artifact_store
        );

        let provider = ServiceFactory::create_provider(&config.provider)?;
        let persistence = PersistenceBootstrap::init(&config.persistence).await?;
        let metrics = Metrics::new()?;

        Self::with_components(
            provider,
            persistence.artifact_store,
            config.settings(),
            metrics,
        )
    }

    pub fn with_components(
        provider: Arc<dyn PriceHistoryProvider>,
        store: Arc<dyn ModelArtifactStore>,
        settings: ForecastSettings,
        metrics: Metrics,
    ) -> Result<Self> {
        let services =
            ServicesBootstrap::init(provider.clone(), store, settings, metrics.clone())?;

        Ok(Self {
            provider,
            trainer: services.trainer,
            forecaster: services.forecaster,
            batch: services.batch,
            pipeline: FeaturePipeline::new()?,
            metrics,
        })
    }

    pub fn settings(&self) -> &ForecastSettings {
        self.trainer.settings()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn trainer(&self) -> &Arc<Trainer> {
        &self.trainer
    }

    /// Blocks through training when no artifact exists yet
    pub async fn predict_trend(&self, symbol: &str, days: usize) -> Option<ForecastResult> {
        self.forecaster.predict_trend(symbol, days).await
    }

    pub async fn try_predict_trend(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        self.forecaster.try_predict_trend(symbol, days).await
    }

    pub async fn try_predict_trend_nonblocking(
        &self,
        symbol: &str,
        days: usize,
    ) -> PredictionOutcome {
        self.forecaster
            .try_predict_trend_nonblocking(symbol, days)
            .await
    }

    pub async fn get_multiple_predictions(
        &self,
        symbols: &[String],
        days: usize,
    ) -> HashMap<String, ForecastResult> {
        self.batch.get_multiple_predictions(symbols, days).await
    }

    pub fn train_model(&self, symbol: &str) -> TrainStatus {
        self.forecaster.train_model(symbol)
    }

    /// Retrains in the caller's task and returns the stored artifact
    pub async fn train_and_wait(&self, symbol: &str) -> Result<ModelArtifact, ForecastError> {
        self.trainer.train(symbol).await
    }

    pub async fn model_state(&self, symbol: &str) -> ModelState {
        self.forecaster.model_state(symbol).await
    }

    pub async fn top_recommendations(
        &self,
        symbols: &[String],
        days: usize,
        limit: usize,
    ) -> Vec<ForecastResult> {
        self.batch.top_recommendations(symbols, days, limit).await
    }

    /// Top recommendations over the configured watchlist
    pub async fn recommendations_board(&self) -> Vec<ForecastResult> {
        let settings = self.settings();
        self.top_recommendations(
            &settings.watchlist,
            settings.default_prediction_days,
            settings.recommendation_limit,
        )
        .await
    }

    /// Feature rows for `symbol` over `period`, without touching any model
    pub async fn feature_rows(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<FeatureRow>, ForecastError> {
        let bars = fetch_bars(self.provider.as_ref(), &self.metrics, symbol, period).await?;
        Ok(self.pipeline.compute(&bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvReader;

    #[tokio::test]
    async fn test_build_from_config() {
        let config = Config::from_reader(&EnvReader::from_pairs(&[
            ("MODE", "mock"),
            ("ARTIFACT_STORE", "memory"),
        ]))
        .unwrap();
        let engine = ForecastingEngine::build(&config).await.unwrap();

        assert_eq!(engine.settings().sequence_length, 60);
        assert_eq!(engine.model_state("AAPL").await, ModelState::NoArtifact);

        let rows = engine
            .feature_rows("AAPL", HistoryPeriod::SixMonths)
            .await
            .unwrap();
        assert_eq!(rows.len(), 126 - 50 + 1);
    }
}
