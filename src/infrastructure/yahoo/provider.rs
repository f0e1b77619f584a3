use super::chart::ChartResponse;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::core::circuit_breaker::{
    CircuitBreaker, CircuitBreakerError, CircuitConfig,
};
use crate::infrastructure::core::http_client_factory::{
    DEFAULT_USER_AGENT, HttpClientFactory, build_url,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

struct CachedBars {
    fetched_at: Instant,
    bars: Vec<PriceBar>,
}

/// Daily bars from the public Yahoo Finance chart endpoint.
///
/// Responses are cached per (symbol, period) for `cache_ttl`; a zero TTL disables caching.
pub struct YahooPriceHistoryProvider {
    client: ClientWithMiddleware,
    base_url: String,
    circuit_breaker: CircuitBreaker,
    cache: RwLock<HashMap<(String, HistoryPeriod), CachedBars>>,
    cache_ttl: Duration,
}

impl YahooPriceHistoryProvider {
    pub fn new(base_url: impl Into<String>, cache_ttl: Duration) -> Result<Self> {
        let base_url = base_url.into();
        info!("YahooPriceHistoryProvider: Using {}", base_url);

        Ok(Self {
            client: HttpClientFactory::create_client(DEFAULT_USER_AGENT, 3)?,
            base_url,
            circuit_breaker: CircuitBreaker::new("YahooChart", CircuitConfig::default()),
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
        })
    }

    async fn cached(&self, symbol: &str, period: HistoryPeriod) -> Option<Vec<PriceBar>> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        let cache = self.cache.read().await;
        let entry = cache.get(&(symbol.to_string(), period))?;
        (entry.fetched_at.elapsed() < self.cache_ttl).then(|| entry.bars.clone())
    }

    async fn store(&self, symbol: &str, period: HistoryPeriod, bars: &[PriceBar]) {
        if self.cache_ttl.is_zero() {
            return;
        }
        let mut cache = self.cache.write().await;
        cache.retain(|_, entry| entry.fetched_at.elapsed() < self.cache_ttl);
        cache.insert(
            (symbol.to_string(), period),
            CachedBars {
                fetched_at: Instant::now(),
                bars: bars.to_vec(),
            },
        );
    }

    async fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PriceBar>> {
        let url = build_url(
            &self.base_url,
            &format!("v8/finance/chart/{}", symbol),
            &[
                ("range", period.as_range_str()),
                ("interval", "1d"),
                ("includePrePost", "false"),
            ],
        )?;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .with_context(|| format!("Chart request failed for {}", symbol))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("YahooPriceHistoryProvider: {} not found", symbol);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(anyhow!("Chart request for {} returned {}", symbol, status));
        }

        let body: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("Malformed chart response for {}", symbol))?;

        if let Some(error) = &body.chart.error {
            warn!(
                "YahooPriceHistoryProvider: {} returned {}: {}",
                symbol,
                error.code,
                error.description.as_deref().unwrap_or("")
            );
        }
        Ok(body.into_bars())
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceHistoryProvider {
    async fn get_bars(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PriceBar>> {
        if let Some(bars) = self.cached(symbol, period).await {
            debug!("YahooPriceHistoryProvider: Cache hit for {} {}", symbol, period);
            return Ok(bars);
        }

        let bars = self
            .circuit_breaker
            .call(self.fetch(symbol, period))
            .await
            .map_err(|e| match e {
                CircuitBreakerError::Open { name, retry_in } => {
                    anyhow!("Circuit breaker {} open, retry in {:?}", name, retry_in)
                }
                CircuitBreakerError::Inner(inner) => inner,
            })?;

        self.store(symbol, period, &bars).await;
        Ok(bars)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
