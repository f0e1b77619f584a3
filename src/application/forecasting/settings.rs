use crate::domain::market::HistoryPeriod;
use crate::domain::ml::TrainingParams;

pub const DEFAULT_WATCHLIST: &[&str] = &["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NVDA"];

/// Tunables of the forecasting engine
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    /// Window length `L` fed to the model
    pub sequence_length: usize,
    pub default_prediction_days: usize,
    pub max_prediction_days: usize,
    /// Raw bars required before a training run is attempted
    pub min_training_bars: usize,
    pub training_period: HistoryPeriod,
    pub serving_period: HistoryPeriod,
    /// Share of sequences used for fitting; the chronological remainder validates
    pub train_split: f64,
    pub training: TrainingParams,
    pub max_batch_symbols: usize,
    pub recommendation_limit: usize,
    pub watchlist: Vec<String>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            sequence_length: 60,
            default_prediction_days: 5,
            max_prediction_days: 30,
            min_training_bars: 100,
            training_period: HistoryPeriod::TwoYears,
            serving_period: HistoryPeriod::SixMonths,
            train_split: 0.8,
            training: TrainingParams::default(),
            max_batch_symbols: 10,
            recommendation_limit: 5,
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}
