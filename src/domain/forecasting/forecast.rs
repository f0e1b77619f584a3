use super::recommendation::{self, Confidence, Recommendation};
use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

/// Multi-day price trajectory forecast for one symbol.
///
/// Built fresh per request and never persisted. A value of this type is
/// always complete: one predicted price per forecast day, all finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub symbol: String,
    pub current_price: f64,
    /// Predicted close on the last forecast day
    pub predicted_price: f64,
    pub trend_change_percent: f64,
    pub prediction_days: usize,
    pub confidence: Confidence,
    pub recommendation: Recommendation,
    pub predicted_prices: Vec<f64>,
}

impl ForecastResult {
    /// Assembles a result from the most recent actual close and the per-day predictions.
    pub fn from_predictions(
        symbol: &str,
        current_price: f64,
        predicted_prices: Vec<f64>,
    ) -> Result<Self, ForecastError> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ForecastError::Prediction {
                reason: format!("current price {} is not a positive number", current_price),
            });
        }

        let Some(&predicted_price) = predicted_prices.last() else {
            return Err(ForecastError::Prediction {
                reason: "no predicted prices".to_string(),
            });
        };

        if let Some(bad) = predicted_prices.iter().find(|p| !p.is_finite()) {
            return Err(ForecastError::Prediction {
                reason: format!("non-finite predicted price {}", bad),
            });
        }

        let trend_change_percent = (predicted_price - current_price) / current_price * 100.0;
        let (confidence, recommendation) = recommendation::derive(trend_change_percent);

        Ok(Self {
            symbol: symbol.to_string(),
            current_price,
            predicted_price,
            trend_change_percent,
            prediction_days: predicted_prices.len(),
            confidence,
            recommendation,
            predicted_prices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_uses_last_prediction() {
        let result =
            ForecastResult::from_predictions("AAPL", 100.0, vec![101.0, 104.0, 112.0]).unwrap();

        assert_eq!(result.prediction_days, 3);
        assert_eq!(result.predicted_price, 112.0);
        assert!((result.trend_change_percent - 12.0).abs() < 1e-9);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_rejects_incomplete_results() {
        assert!(ForecastResult::from_predictions("AAPL", 100.0, vec![]).is_err());
        assert!(ForecastResult::from_predictions("AAPL", 0.0, vec![1.0]).is_err());
        assert!(ForecastResult::from_predictions("AAPL", 100.0, vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_serializes_fixed_field_set() {
        let result = ForecastResult::from_predictions("MSFT", 200.0, vec![190.0]).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["symbol"], "MSFT");
        assert_eq!(json["recommendation"], "SELL");
        assert_eq!(json["confidence"], "Medium");
        assert_eq!(json["predicted_prices"].as_array().unwrap().len(), 1);
    }
}
