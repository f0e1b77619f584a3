//! Forecasting engine configuration parsed from environment variables.

use super::env_reader::EnvReader;
use crate::application::forecasting::settings::{DEFAULT_WATCHLIST, ForecastSettings};
use crate::domain::market::HistoryPeriod;
use crate::domain::ml::TrainingParams;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ForecastEnvConfig {
    pub sequence_length: usize,
    pub default_prediction_days: usize,
    pub max_prediction_days: usize,
    pub min_training_bars: usize,
    pub training_period: HistoryPeriod,
    pub serving_period: HistoryPeriod,
    pub max_epochs: usize,
    pub early_stopping_patience: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub hidden_units: usize,
    pub train_split: f64,
    pub model_seed: u64,
    pub max_batch_symbols: usize,
    pub watchlist: Vec<String>,
}

impl ForecastEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        let defaults = ForecastSettings::default();

        let training_period: HistoryPeriod = env
            .string("TRAINING_PERIOD", defaults.training_period.as_range_str())
            .parse()
            .context("Invalid TRAINING_PERIOD")?;
        let serving_period: HistoryPeriod = env
            .string("SERVING_PERIOD", defaults.serving_period.as_range_str())
            .parse()
            .context("Invalid SERVING_PERIOD")?;

        let config = Self {
            sequence_length: env.parse("SEQUENCE_LENGTH", defaults.sequence_length)?,
            default_prediction_days: env
                .parse("DEFAULT_PREDICTION_DAYS", defaults.default_prediction_days)?,
            max_prediction_days: env.parse("MAX_PREDICTION_DAYS", defaults.max_prediction_days)?,
            min_training_bars: env.parse("MIN_TRAINING_BARS", defaults.min_training_bars)?,
            training_period,
            serving_period,
            max_epochs: env.parse("MAX_EPOCHS", defaults.training.max_epochs)?,
            early_stopping_patience: env
                .parse("EARLY_STOPPING_PATIENCE", defaults.training.patience)?,
            batch_size: env.parse("BATCH_SIZE", defaults.training.batch_size)?,
            learning_rate: env.parse("LEARNING_RATE", defaults.training.learning_rate)?,
            hidden_units: env.parse("HIDDEN_UNITS", defaults.training.hidden_units)?,
            train_split: env.parse("TRAIN_SPLIT", defaults.train_split)?,
            model_seed: env.parse("MODEL_SEED", defaults.training.seed)?,
            max_batch_symbols: env.parse("MAX_BATCH_SYMBOLS", defaults.max_batch_symbols)?,
            watchlist: env.list("WATCHLIST", DEFAULT_WATCHLIST),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            anyhow::bail!("SEQUENCE_LENGTH must be at least 1");
        }
        if self.max_prediction_days == 0 {
            anyhow::bail!("MAX_PREDICTION_DAYS must be at least 1");
        }
        if !(1..=self.max_prediction_days).contains(&self.default_prediction_days) {
            anyhow::bail!(
                "DEFAULT_PREDICTION_DAYS ({}) must be within 1..={}",
                self.default_prediction_days,
                self.max_prediction_days
            );
        }
        if !(self.train_split > 0.0 && self.train_split <= 1.0) {
            anyhow::bail!("TRAIN_SPLIT must be in (0, 1], got {}", self.train_split);
        }
        if self.batch_size == 0 || self.hidden_units == 0 {
            anyhow::bail!("BATCH_SIZE and HIDDEN_UNITS must be at least 1");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            anyhow::bail!("LEARNING_RATE must be positive, got {}", self.learning_rate);
        }
        Ok(())
    }

    pub fn settings(&self) -> ForecastSettings {
        ForecastSettings {
            sequence_length: self.sequence_length,
            default_prediction_days: self.default_prediction_days,
            max_prediction_days: self.max_prediction_days,
            min_training_bars: self.min_training_bars,
            training_period: self.training_period,
            serving_period: self.serving_period,
            train_split: self.train_split,
            training: TrainingParams {
                max_epochs: self.max_epochs,
                patience: self.early_stopping_patience,
                batch_size: self.batch_size,
                learning_rate: self.learning_rate,
                hidden_units: self.hidden_units,
                seed: self.model_seed,
            },
            max_batch_symbols: self.max_batch_symbols,
            watchlist: self.watchlist.clone(),
            ..ForecastSettings::default()
        }
    }
}
