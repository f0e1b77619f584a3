use super::forecaster::Forecaster;
use crate::domain::forecasting::ForecastResult;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Fans forecasts out over several symbols.
///
/// Per-symbol failures are dropped from the result; an empty map is a valid answer.
pub struct BatchCoordinator {
    forecaster: Arc<Forecaster>,
}

impl BatchCoordinator {
    pub fn new(forecaster: Arc<Forecaster>) -> Self {
        Self { forecaster }
    }

    pub async fn get_multiple_predictions(
        &self,
        symbols: &[String],
        days: usize,
    ) -> HashMap<String, ForecastResult> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

        let forecasts = join_all(unique.iter().map(|symbol| async move {
            let result = self.forecaster.predict_trend(symbol, days).await;
            (symbol.to_string(), result)
        }))
        .await;

        let results: HashMap<String, ForecastResult> = forecasts
            .into_iter()
            .filter_map(|(symbol, result)| result.map(|r| (symbol, r)))
            .collect();

        info!(
            "BatchCoordinator: {}/{} symbols forecast",
            results.len(),
            unique.len()
        );
        results
    }

    /// Actionable forecasts (BUY or SELL) ranked by trend magnitude, strongest first
    pub async fn top_recommendations(
        &self,
        symbols: &[String],
        days: usize,
        limit: usize,
    ) -> Vec<ForecastResult> {
        let predictions = self.get_multiple_predictions(symbols, days).await;
        rank_actionable(predictions.into_values().collect(), limit)
    }
}

pub fn rank_actionable(forecasts: Vec<ForecastResult>, limit: usize) -> Vec<ForecastResult> {
    let mut actionable: Vec<ForecastResult> = forecasts
        .into_iter()
        .filter(|f| f.recommendation.is_actionable())
        .collect();

    actionable.sort_by(|a, b| {
        b.trend_change_percent
            .abs()
            .total_cmp(&a.trend_change_percent.abs())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    actionable.truncate(limit);
    actionable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(symbol: &str, trend: f64) -> ForecastResult {
        let current = 100.0;
        ForecastResult::from_predictions(symbol, current, vec![current * (1.0 + trend / 100.0)])
            .unwrap()
    }

    #[test]
    fn test_rank_keeps_actionable_by_magnitude() {
        let ranked = rank_actionable(
            vec![
                forecast("AAPL", 4.0),
                forecast("MSFT", -12.0),
                forecast("TSLA", 1.0),
                forecast("NVDA", 8.0),
            ],
            5,
        );

        let symbols: Vec<&str> = ranked.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "NVDA", "AAPL"]);
    }

    #[test]
    fn test_rank_respects_limit() {
        let forecasts = (0..8)
            .map(|i| forecast(&format!("S{}", i), 5.0 + i as f64))
            .collect();

        let ranked = rank_actionable(forecasts, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].symbol, "S7");
    }
}
