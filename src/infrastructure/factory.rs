use crate::config::{Mode, ProviderEnvConfig};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::mock::MockPriceHistoryProvider;
use crate::infrastructure::yahoo::YahooPriceHistoryProvider;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_provider(config: &ProviderEnvConfig) -> Result<Arc<dyn PriceHistoryProvider>> {
        match config.mode {
            Mode::Mock => {
                info!("Using mock price history (seed {})", config.mock_seed);
                Ok(Arc::new(MockPriceHistoryProvider::new(config.mock_seed)))
            }
            Mode::Yahoo => {
                let provider = YahooPriceHistoryProvider::new(
                    config.yahoo_base_url.clone(),
                    Duration::from_secs(config.cache_ttl_seconds),
                )
                .context("Failed to create Yahoo price history provider")?;
                Ok(Arc::new(provider))
            }
        }
    }
}
