use crate::domain::market::{HistoryPeriod, PriceBar};
use anyhow::Result;
use async_trait::async_trait;

/// Source of daily OHLCV history
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Bars for `symbol` over `period`, oldest first.
    ///
    /// An unknown symbol yields an empty vector rather than an error.
    async fn get_bars(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PriceBar>>;

    /// Provider name used in logs and metrics labels
    fn name(&self) -> &str;
}
