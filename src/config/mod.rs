//! Configuration module for Trendcast.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Forecasting, Provider, Persistence, and Observability.

mod env_reader;
mod forecast_config;
mod observability_config;
mod persistence_config;
mod provider_config;

pub use env_reader::EnvReader;
pub use forecast_config::ForecastEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use persistence_config::{ArtifactStoreKind, PersistenceEnvConfig};
pub use provider_config::{Mode, ProviderEnvConfig};

use crate::application::forecasting::settings::ForecastSettings;
use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub forecast: ForecastEnvConfig,
    pub provider: ProviderEnvConfig,
    pub persistence: PersistenceEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        Ok(Self {
            forecast: ForecastEnvConfig::from_reader(env)
                .context("Failed to load forecast config")?,
            provider: ProviderEnvConfig::from_reader(env)
                .context("Failed to load provider config")?,
            persistence: PersistenceEnvConfig::from_reader(env)
                .context("Failed to load persistence config")?,
            observability: ObservabilityEnvConfig::from_reader(env)
                .context("Failed to load observability config")?,
        })
    }

    pub fn settings(&self) -> ForecastSettings {
        self.forecast.settings()
    }
}
