use crate::domain::errors::ForecastError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::observability::Metrics;
use std::time::Instant;
use tracing::debug;

/// Fetches bars, recording latency and outcome.
///
/// Both a provider error and an empty series map to `ProviderUnavailable`.
pub async fn fetch_bars(
    provider: &dyn PriceHistoryProvider,
    metrics: &Metrics,
    symbol: &str,
    period: HistoryPeriod,
) -> Result<Vec<PriceBar>, ForecastError> {
    let started = Instant::now();
    let result = provider.get_bars(symbol, period).await;
    let elapsed = started.elapsed().as_secs_f64();

    let outcome = match &result {
        Ok(bars) if bars.is_empty() => "empty",
        Ok(_) => "ok",
        Err(_) => "error",
    };
    metrics.observe_provider_fetch(provider.name(), period.as_range_str(), outcome, elapsed);

    match result {
        Ok(bars) if !bars.is_empty() => {
            debug!(
                "History: {} bars for {} over {} from {}",
                bars.len(),
                symbol,
                period,
                provider.name()
            );
            Ok(bars)
        }
        Ok(_) => Err(ForecastError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason: format!("no bars returned for {}", period),
        }),
        Err(e) => Err(ForecastError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{:#}", e),
        }),
    }
}
