use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Longest history the mock can serve, in trading days
const MAX_BARS: usize = 1260;

/// Deterministic seeded random-walk daily bars.
///
/// The same (seed, symbol) always yields the same series, and shorter
/// periods are the tail of longer ones.
#[derive(Clone)]
pub struct MockPriceHistoryProvider {
    seed: u64,
    last_date: NaiveDate,
    unavailable: Arc<HashSet<String>>,
    failing: Arc<HashSet<String>>,
    bar_limits: Arc<HashMap<String, usize>>,
    fetches: Arc<AtomicUsize>,
}

impl MockPriceHistoryProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            last_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default(),
            unavailable: Arc::new(HashSet::new()),
            failing: Arc::new(HashSet::new()),
            bar_limits: Arc::new(HashMap::new()),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// These symbols return an empty series, like an unknown ticker
    pub fn with_unavailable<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unavailable = Arc::new(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// These symbols fail with a provider error
    pub fn with_failing<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing = Arc::new(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Caps the history of `symbol` at its most recent `bars`
    pub fn with_bar_limit(mut self, symbol: &str, bars: usize) -> Self {
        let mut limits = (*self.bar_limits).clone();
        limits.insert(symbol.to_string(), bars);
        self.bar_limits = Arc::new(limits);
        self
    }

    /// Number of `get_bars` calls so far, shared across clones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn series(&self, symbol: &str) -> Vec<PriceBar> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ symbol_hash(symbol));
        let dates = trading_days_until(self.last_date, MAX_BARS);

        let mut close: f64 = rng.random_range(20.0..400.0);
        let drift: f64 = rng.random_range(-0.0005..0.0008);

        dates
            .into_iter()
            .map(|date| {
                let open = close;
                close = (open * (1.0 + drift + rng.random_range(-0.02..0.02))).max(1.0);
                let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
                let volume = rng.random_range(1_000_000.0..6_000_000.0_f64).round();
                PriceBar::new(date, open, high, low, close, volume)
            })
            .collect()
    }
}

impl Default for MockPriceHistoryProvider {
    fn default() -> Self {
        Self::new(7)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPriceHistoryProvider {
    async fn get_bars(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PriceBar>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(symbol) {
            bail!("Mock provider failure for {}", symbol);
        }
        if self.unavailable.contains(symbol) {
            return Ok(Vec::new());
        }

        let mut wanted = period.trading_days().min(MAX_BARS);
        if let Some(limit) = self.bar_limits.get(symbol) {
            wanted = wanted.min(*limit);
        }

        let series = self.series(symbol);
        Ok(series[series.len() - wanted..].to_vec())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// FNV-1a, stable across runs and toolchains
fn symbol_hash(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

/// `count` weekdays ending at (or before) `last`, oldest first
fn trading_days_until(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut day = last;
    while dates.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day -= Duration::days(1);
    }
    dates.reverse();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::price_bar::is_chronological;

    #[tokio::test]
    async fn test_period_lengths_and_tails_agree() {
        let provider = MockPriceHistoryProvider::new(1);
        let two_years = provider.get_bars("AAPL", HistoryPeriod::TwoYears).await.unwrap();
        let six_months = provider.get_bars("AAPL", HistoryPeriod::SixMonths).await.unwrap();

        assert_eq!(two_years.len(), 504);
        assert_eq!(six_months.len(), 126);
        assert_eq!(two_years.last(), six_months.last());
        assert!(is_chronological(&two_years));
        assert!(two_years.iter().all(|b| b.is_valid() && b.low <= b.high));
        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_deterministic_per_symbol() {
        let a = MockPriceHistoryProvider::new(3);
        let b = MockPriceHistoryProvider::new(3);

        let first = a.get_bars("MSFT", HistoryPeriod::OneMonth).await.unwrap();
        let second = b.get_bars("MSFT", HistoryPeriod::OneMonth).await.unwrap();
        let other = a.get_bars("TSLA", HistoryPeriod::OneMonth).await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_configured_gaps() {
        let provider = MockPriceHistoryProvider::new(1)
            .with_unavailable(["ZZZZZNOTREAL"])
            .with_failing(["DOWN"])
            .with_bar_limit("NEW", 40);

        assert!(provider
            .get_bars("ZZZZZNOTREAL", HistoryPeriod::TwoYears)
            .await
            .unwrap()
            .is_empty());
        assert!(provider.get_bars("DOWN", HistoryPeriod::TwoYears).await.is_err());
        assert_eq!(
            provider.get_bars("NEW", HistoryPeriod::TwoYears).await.unwrap().len(),
            40
        );
    }

    #[test]
    fn test_usable_without_a_runtime() {
        let provider = MockPriceHistoryProvider::default();
        let bars = tokio_test::block_on(provider.get_bars("AMD", HistoryPeriod::FiveDays));
        let bars = tokio_test::assert_ok!(bars);
        assert_eq!(bars.len(), 5);
    }

    #[test]
    fn test_trading_days_skip_weekends() {
        let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let days = trading_days_until(friday, 6);

        assert_eq!(days.len(), 6);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(days.iter().all(|d| d.weekday() != Weekday::Sat && d.weekday() != Weekday::Sun));
    }
}
