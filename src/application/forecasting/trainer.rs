use super::feature_pipeline::FeaturePipeline;
use super::history::fetch_bars;
use super::settings::ForecastSettings;
use super::symbol_locks::SymbolLocks;
use super::training_registry::{TrainingRegistry, TrainingSlot};
use super::windower::{sequence_count, split_train_validation, training_sequences};
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::feature_row::to_matrix;
use crate::domain::forecasting::{FeatureRow, ModelState, TrainStatus};
use crate::domain::ml::{MinMaxNormalizer, MlpRegressor, ModelArtifact};
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::repositories::ModelArtifactStore;
use crate::infrastructure::observability::Metrics;
use ndarray::s;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Result of a non-waiting artifact lookup
#[derive(Debug)]
pub enum ReadyLookup {
    Ready(ModelArtifact),
    Missing,
    /// Another load, train or save holds the symbol
    Busy,
}

/// Builds, validates and persists model artifacts.
///
/// Every load, train and save for a symbol runs under that symbol's lock,
/// so at most one training run per symbol proceeds at a time.
pub struct Trainer {
    provider: Arc<dyn PriceHistoryProvider>,
    store: Arc<dyn ModelArtifactStore>,
    pipeline: FeaturePipeline,
    settings: ForecastSettings,
    locks: SymbolLocks,
    registry: TrainingRegistry,
    metrics: Metrics,
}

impl Trainer {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        store: Arc<dyn ModelArtifactStore>,
        settings: ForecastSettings,
        metrics: Metrics,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            provider,
            store,
            pipeline: FeaturePipeline::new()?,
            settings,
            locks: SymbolLocks::new(),
            registry: TrainingRegistry::new(),
            metrics,
        })
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Trains and stores a fresh artifact, waiting for any run already in flight.
    pub async fn train(&self, symbol: &str) -> Result<ModelArtifact, ForecastError> {
        let slot = self.registry.enter(symbol);
        self.train_reserved(symbol, slot).await
    }

    /// Starts a background run unless one is already in flight for `symbol`.
    ///
    /// Failures are logged; the previous artifact, if any, stays in place.
    pub fn train_in_background(self: &Arc<Self>, symbol: &str) -> TrainStatus {
        let Some(slot) = self.registry.try_begin(symbol) else {
            info!("Trainer: {} already training, request ignored", symbol);
            return TrainStatus::AlreadyTraining;
        };

        let trainer = Arc::clone(self);
        let symbol = symbol.to_string();
        tokio::spawn(async move {
            match trainer.train_reserved(&symbol, slot).await {
                Ok(artifact) => info!(
                    "Trainer: Background training for {} finished (run {})",
                    symbol, artifact.run_id
                ),
                Err(e) => error!("Trainer: Background training for {} failed: {}", symbol, e),
            }
        });

        TrainStatus::Started
    }

    /// Returns the stored artifact, training one first if none is usable.
    ///
    /// A corrupt or incompatible artifact counts as absent.
    pub async fn ensure_artifact(&self, symbol: &str) -> Result<ModelArtifact, ForecastError> {
        let _guard = self.locks.acquire(symbol).await;
        if let Some(artifact) = self.load_usable(symbol).await? {
            return Ok(artifact);
        }

        info!("Trainer: No usable artifact for {}, training before serving", symbol);
        let _slot = self.registry.enter(symbol);
        self.train_locked(symbol).await
    }

    /// Stored usable artifact without ever training
    pub async fn load_ready(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError> {
        let _guard = self.locks.acquire(symbol).await;
        self.load_usable(symbol).await
    }

    /// Like `load_ready`, but reports `Busy` instead of waiting on the symbol lock
    pub async fn try_load_ready(&self, symbol: &str) -> Result<ReadyLookup, ForecastError> {
        let Some(_guard) = self.locks.try_acquire(symbol) else {
            return Ok(ReadyLookup::Busy);
        };
        Ok(match self.load_usable(symbol).await? {
            Some(artifact) => ReadyLookup::Ready(artifact),
            None => ReadyLookup::Missing,
        })
    }

    pub async fn model_state(&self, symbol: &str) -> ModelState {
        if self.registry.is_training(symbol) {
            return ModelState::Training;
        }
        match self.store.load(symbol).await {
            Ok(Some(artifact)) if artifact.validate(self.settings.sequence_length).is_ok() => {
                ModelState::Ready
            }
            Ok(_) => ModelState::NoArtifact,
            Err(e) => {
                warn!("Trainer: Cannot read artifact state for {}: {}", symbol, e);
                ModelState::NoArtifact
            }
        }
    }

    pub fn is_training(&self, symbol: &str) -> bool {
        self.registry.is_training(symbol)
    }

    pub fn in_flight(&self) -> Vec<String> {
        self.registry.in_flight()
    }

    pub async fn stored_symbols(&self) -> Result<Vec<String>, ForecastError> {
        self.store.symbols().await
    }

    async fn train_reserved(
        &self,
        symbol: &str,
        _slot: TrainingSlot,
    ) -> Result<ModelArtifact, ForecastError> {
        let _guard = self.locks.acquire(symbol).await;
        self.train_locked(symbol).await
    }

    async fn load_usable(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError> {
        match self.store.load(symbol).await {
            Ok(Some(artifact)) => match artifact.validate(self.settings.sequence_length) {
                Ok(()) => Ok(Some(artifact)),
                Err(e) => {
                    warn!("Trainer: Discarding stored artifact: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e @ ForecastError::ArtifactCorrupt { .. }) => {
                warn!("Trainer: Discarding stored artifact: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Caller holds the symbol lock
    async fn train_locked(&self, symbol: &str) -> Result<ModelArtifact, ForecastError> {
        info!("Trainer: Training model for {}", symbol);
        self.metrics.trainings_in_flight.inc();
        let started = Instant::now();

        let result = self.fit_and_save(symbol).await;

        self.metrics.trainings_in_flight.dec();
        match &result {
            Ok(artifact) => {
                let elapsed = started.elapsed().as_secs_f64();
                self.metrics.inc_training_runs("success");
                self.metrics.training_duration_seconds.observe(elapsed);
                info!(
                    "Trainer: {} trained in {:.1}s (run {}, {} epochs, best loss {:.6}, {} train / {} validation)",
                    symbol,
                    elapsed,
                    artifact.run_id,
                    artifact.report.epochs_run,
                    artifact.report.best_validation_loss,
                    artifact.report.train_samples,
                    artifact.report.validation_samples
                );
            }
            Err(e) => {
                self.metrics.inc_training_runs(e.kind());
                warn!("Trainer: Training failed for {}: {}", symbol, e);
            }
        }
        result
    }

    async fn fit_and_save(&self, symbol: &str) -> Result<ModelArtifact, ForecastError> {
        let bars = fetch_bars(
            self.provider.as_ref(),
            &self.metrics,
            symbol,
            self.settings.training_period,
        )
        .await?;

        if bars.len() < self.settings.min_training_bars {
            return Err(ForecastError::InsufficientData {
                symbol: symbol.to_string(),
                reason: format!(
                    "{} bars over {}, need {}",
                    bars.len(),
                    self.settings.training_period,
                    self.settings.min_training_bars
                ),
            });
        }

        let rows = self.pipeline.compute(&bars);
        let settings = self.settings.clone();
        let owned_symbol = symbol.to_string();

        let artifact =
            tokio::task::spawn_blocking(move || fit_artifact(&owned_symbol, &rows, &settings))
                .await
                .map_err(|e| ForecastError::Training {
                    symbol: symbol.to_string(),
                    reason: format!("training task aborted: {}", e),
                })??;

        self.store.save(&artifact).await?;
        Ok(artifact)
    }
}

/// Fits normalizer and model on a symbol's feature rows.
///
/// The normalizer sees only the rows covered by training sequences; the
/// chronologically last share of sequences is held out for early stopping.
pub fn fit_artifact(
    symbol: &str,
    rows: &[FeatureRow],
    settings: &ForecastSettings,
) -> Result<ModelArtifact, ForecastError> {
    let length = settings.sequence_length;
    let total = sequence_count(rows.len(), length);
    let train_count = ((total as f64) * settings.train_split.clamp(0.0, 1.0)) as usize;

    if total == 0 || train_count == 0 {
        return Err(ForecastError::InsufficientData {
            symbol: symbol.to_string(),
            reason: format!(
                "{} feature rows yield {} training sequences of length {}",
                rows.len(),
                train_count,
                length
            ),
        });
    }

    let matrix = to_matrix(rows);
    let mut normalizer = MinMaxNormalizer::new();
    normalizer.fit(matrix.slice(s![..train_count + length, ..]))?;
    let scaled = normalizer.transform(matrix.view())?;

    let sequences = training_sequences(scaled.view(), length);
    let (train, validation) = split_train_validation(sequences, settings.train_split);

    let (model, report) = MlpRegressor::fit(&train, &validation, &settings.training).map_err(
        |e| ForecastError::Training {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        },
    )?;

    Ok(ModelArtifact::new(symbol, length, model, normalizer, report))
}
