use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::forecasting::batch::BatchCoordinator;
use crate::application::forecasting::forecaster::Forecaster;
use crate::application::forecasting::settings::ForecastSettings;
use crate::application::forecasting::trainer::Trainer;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::repositories::ModelArtifactStore;
use crate::infrastructure::observability::Metrics;

pub struct ServicesHandle {
    pub trainer: Arc<Trainer>,
    pub forecaster: Arc<Forecaster>,
    pub batch: BatchCoordinator,
}

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    /// Wires trainer, forecaster and batch coordinator over one provider and store
    pub fn init(
        provider: Arc<dyn PriceHistoryProvider>,
        store: Arc<dyn ModelArtifactStore>,
        settings: ForecastSettings,
        metrics: Metrics,
    ) -> Result<ServicesHandle> {
        let trainer = Arc::new(
            Trainer::new(provider.clone(), store, settings, metrics.clone())
                .context("Failed to create trainer")?,
        );
        let forecaster = Arc::new(
            Forecaster::new(provider, trainer.clone(), metrics)
                .context("Failed to create forecaster")?,
        );
        let batch = BatchCoordinator::new(forecaster.clone());

        Ok(ServicesHandle {
            trainer,
            forecaster,
            batch,
        })
    }
}
