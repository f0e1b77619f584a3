use super::feature_pipeline::FeaturePipeline;
use super::history::fetch_bars;
use super::trainer::{ReadyLookup, Trainer};
use super::windower::serving_window;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::feature_row::to_matrix;
use crate::domain::forecasting::{
    CLOSE_INDEX, ForecastResult, ModelState, PredictionOutcome, TrainStatus,
};
use crate::domain::ml::{ModelArtifact, SequenceModel};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::observability::Metrics;
use ndarray::{Array2, s};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Serves multi-day trend forecasts per symbol.
///
/// `predict_trend` trains on first use and blocks until done;
/// `try_predict_trend_nonblocking` starts training in the background instead.
pub struct Forecaster {
    provider: Arc<dyn PriceHistoryProvider>,
    trainer: Arc<Trainer>,
    pipeline: FeaturePipeline,
    metrics: Metrics,
}

impl Forecaster {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        trainer: Arc<Trainer>,
        metrics: Metrics,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            provider,
            trainer,
            pipeline: FeaturePipeline::new()?,
            metrics,
        })
    }

    pub fn trainer(&self) -> &Arc<Trainer> {
        &self.trainer
    }

    /// Complete forecast or `None`; the cause is logged
    pub async fn predict_trend(&self, symbol: &str, days: usize) -> Option<ForecastResult> {
        match self.try_predict_trend(symbol, days).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Forecaster: No forecast for {}: {}", symbol, e);
                None
            }
        }
    }

    pub async fn try_predict_trend(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        let result = match validate_days(days) {
            Ok(()) => match self.trainer.ensure_artifact(symbol).await {
                Ok(artifact) => self.forecast_with(symbol, &artifact, days).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.record(symbol, &result);
        result
    }

    /// Never waits on a training run
    pub async fn try_predict_trend_nonblocking(
        &self,
        symbol: &str,
        days: usize,
    ) -> PredictionOutcome {
        if let Err(e) = validate_days(days) {
            warn!("Forecaster: Rejected request for {}: {}", symbol, e);
            return PredictionOutcome::Unavailable;
        }
        if self.trainer.is_training(symbol) {
            return PredictionOutcome::TrainingInProgress;
        }

        match self.trainer.try_load_ready(symbol).await {
            Ok(ReadyLookup::Busy) => PredictionOutcome::TrainingInProgress,
            Ok(ReadyLookup::Ready(artifact)) => {
                let result = self.forecast_with(symbol, &artifact, days).await;
                self.record(symbol, &result);
                match result {
                    Ok(forecast) => PredictionOutcome::Ready(forecast),
                    Err(e) => {
                        warn!("Forecaster: No forecast for {}: {}", symbol, e);
                        PredictionOutcome::Unavailable
                    }
                }
            }
            Ok(ReadyLookup::Missing) => match self.train_model(symbol) {
                TrainStatus::Started => PredictionOutcome::TrainingStarted,
                TrainStatus::AlreadyTraining => PredictionOutcome::TrainingInProgress,
            },
            Err(e) => {
                warn!("Forecaster: Artifact unavailable for {}: {}", symbol, e);
                PredictionOutcome::Unavailable
            }
        }
    }

    /// Fire-and-forget retrain
    pub fn train_model(&self, symbol: &str) -> TrainStatus {
        let status = self.trainer.train_in_background(symbol);
        info!("Forecaster: Train request for {}: {:?}", symbol, status);
        status
    }

    pub async fn model_state(&self, symbol: &str) -> ModelState {
        self.trainer.model_state(symbol).await
    }

    async fn forecast_with(
        &self,
        symbol: &str,
        artifact: &ModelArtifact,
        days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        let settings = self.trainer.settings();
        let bars = fetch_bars(
            self.provider.as_ref(),
            &self.metrics,
            symbol,
            settings.serving_period,
        )
        .await?;

        let rows = self.pipeline.compute(&bars);
        let length = artifact.sequence_length;
        let Some(last) = rows.last() else {
            return Err(ForecastError::InsufficientHistory {
                symbol: symbol.to_string(),
                available: 0,
                required: length,
            });
        };
        let current_price = last.close;

        let scaled = artifact.normalizer.transform(to_matrix(&rows).view())?;
        let window = serving_window(symbol, scaled.view(), length)?;

        let scaled_predictions = autoregressive_forecast(&artifact.model, window, days)?;
        let predicted_prices = artifact
            .normalizer
            .inverse_transform_column(CLOSE_INDEX, &scaled_predictions)?;

        debug!(
            "Forecaster: {} day {} close {:.2} -> {:.2}",
            symbol,
            days,
            current_price,
            predicted_prices.last().copied().unwrap_or(f64::NAN)
        );
        ForecastResult::from_predictions(symbol, current_price, predicted_prices)
    }

    fn record(&self, symbol: &str, result: &Result<ForecastResult, ForecastError>) {
        match result {
            Ok(forecast) => {
                self.metrics.inc_forecasts("success");
                self.metrics
                    .set_trend_change(symbol, forecast.trend_change_percent);
            }
            Err(e) => self.metrics.inc_forecasts(e.kind()),
        }
    }
}

fn validate_days(days: usize) -> Result<(), ForecastError> {
    if days == 0 {
        return Err(ForecastError::InvalidRequest {
            reason: "prediction days must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Rolls the model forward `days` steps from a scaled window.
///
/// Each step appends a copy of the newest row with its close replaced by the
/// prediction and drops the oldest row. The other columns stay frozen at
/// their last observed values. Returns the scaled close predictions.
pub fn autoregressive_forecast(
    model: &dyn SequenceModel,
    window: Array2<f64>,
    days: usize,
) -> Result<Vec<f64>, ForecastError> {
    let rows = window.nrows();
    if rows == 0 {
        return Err(ForecastError::InvalidRequest {
            reason: "empty forecast window".to_string(),
        });
    }

    let mut window = window;
    let mut predictions = Vec::with_capacity(days);

    for _ in 0..days {
        let next = model
            .predict(window.view())
            .map_err(|e| ForecastError::Prediction {
                reason: e.to_string(),
            })?;

        let mut feedback = window.row(rows - 1).to_owned();
        feedback[CLOSE_INDEX] = next;

        let mut shifted = Array2::zeros(window.dim());
        shifted
            .slice_mut(s![..rows - 1, ..])
            .assign(&window.slice(s![1.., ..]));
        shifted.row_mut(rows - 1).assign(&feedback);
        window = shifted;

        predictions.push(next);
    }

    Ok(predictions)
}
