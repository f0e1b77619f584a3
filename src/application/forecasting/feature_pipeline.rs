use crate::domain::errors::ForecastError;
use crate::domain::forecasting::FeatureRow;
use crate::domain::market::PriceBar;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::debug;

pub const FAST_MA_PERIOD: usize = 20;
pub const SLOW_MA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const VOLUME_MA_PERIOD: usize = 20;

/// Bars consumed before the first fully defined row
pub const WARMUP_BARS: usize = SLOW_MA_PERIOD;

/// Derives indicator rows from daily bars.
///
/// Indicator state is rebuilt on every call; the pipeline itself holds only
/// fresh indicator prototypes and can be shared freely.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    fast_ma: SimpleMovingAverage,
    slow_ma: SimpleMovingAverage,
    volume_ma: SimpleMovingAverage,
    avg_gain: SimpleMovingAverage,
    avg_loss: SimpleMovingAverage,
}

impl FeaturePipeline {
    pub fn new() -> Result<Self, ForecastError> {
        let sma = |period: usize| {
            SimpleMovingAverage::new(period).map_err(|e| ForecastError::InvalidRequest {
                reason: format!("invalid indicator period {}: {:?}", period, e),
            })
        };

        Ok(Self {
            fast_ma: sma(FAST_MA_PERIOD)?,
            slow_ma: sma(SLOW_MA_PERIOD)?,
            volume_ma: sma(VOLUME_MA_PERIOD)?,
            avg_gain: sma(RSI_PERIOD)?,
            avg_loss: sma(RSI_PERIOD)?,
        })
    }

    /// Rows for every bar with all indicators defined, oldest first.
    ///
    /// Invalid bars are skipped and bars are put in date order first.
    /// Fewer than `WARMUP_BARS` usable bars yields an empty vector.
    pub fn compute(&self, bars: &[PriceBar]) -> Vec<FeatureRow> {
        let mut usable: Vec<&PriceBar> = bars.iter().filter(|b| b.is_valid()).collect();
        if usable.len() != bars.len() {
            debug!(
                "FeaturePipeline: skipped {} invalid bars",
                bars.len() - usable.len()
            );
        }
        usable.sort_by_key(|b| b.date);
        usable.dedup_by_key(|b| b.date);

        if usable.len() < WARMUP_BARS {
            return Vec::new();
        }

        let mut fast_ma = self.fast_ma.clone();
        let mut slow_ma = self.slow_ma.clone();
        let mut volume_ma = self.volume_ma.clone();
        let mut avg_gain = self.avg_gain.clone();
        let mut avg_loss = self.avg_loss.clone();

        let mut rows = Vec::with_capacity(usable.len() + 1 - WARMUP_BARS);
        let mut previous_close: Option<f64> = None;

        for (i, bar) in usable.iter().enumerate() {
            let ma_20 = fast_ma.next(bar.close);
            let ma_50 = slow_ma.next(bar.close);
            let volume_ma_20 = volume_ma.next(bar.volume);

            let mut rsi = None;
            if let Some(prev) = previous_close {
                let delta = bar.close - prev;
                let gain = avg_gain.next(delta.max(0.0));
                let loss = avg_loss.next((-delta).max(0.0));
                if i >= RSI_PERIOD {
                    rsi = Some(relative_strength_index(gain, loss));
                }
            }
            previous_close = Some(bar.close);

            if i + 1 < WARMUP_BARS {
                continue;
            }
            let Some(rsi_14) = rsi else {
                continue;
            };

            rows.push(FeatureRow {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                ma_20,
                ma_50,
                rsi_14,
                volume_ma_20,
            });
        }

        rows
    }
}

/// RSI from average gain and average loss magnitude.
///
/// Zero average loss saturates at 100, including a flat series.
pub fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain.max(0.0) / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = start + Duration::days(i as i64);
                PriceBar::new(date, close, close + 1.0, close - 1.0, close, 1_000.0 + i as f64)
            })
            .collect()
    }

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn test_row_count_after_warmup() {
        let pipeline = FeaturePipeline::new().unwrap();
        let rows = pipeline.compute(&bars_from_closes(&zigzag(120)));

        assert_eq!(rows.len(), 120 - WARMUP_BARS + 1);
        assert!(rows.iter().all(|r| r.values().iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_forty_bars_yield_nothing() {
        let pipeline = FeaturePipeline::new().unwrap();
        assert!(pipeline.compute(&bars_from_closes(&zigzag(40))).is_empty());
        assert!(pipeline.compute(&[]).is_empty());
    }

    #[test]
    fn test_moving_averages_match_trailing_means() {
        let closes: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        let pipeline = FeaturePipeline::new().unwrap();
        let rows = pipeline.compute(&bars_from_closes(&closes));

        // first row sits on bar 50 (close 50.0)
        let first = &rows[0];
        assert_eq!(first.close, 50.0);
        assert!((first.ma_50 - 25.5).abs() < 1e-9);
        assert!((first.ma_20 - 40.5).abs() < 1e-9);
        // monotonic rise has no losses
        assert_eq!(first.rsi_14, 100.0);
    }

    #[test]
    fn test_rsi_bounds() {
        let pipeline = FeaturePipeline::new().unwrap();
        let falling: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();
        let rows = pipeline.compute(&bars_from_closes(&falling));
        assert!(rows.iter().all(|r| r.rsi_14.abs() < 1e-9));

        let rows = pipeline.compute(&bars_from_closes(&zigzag(200)));
        assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.rsi_14)));
    }

    #[test]
    fn test_flat_series_rsi_is_saturated() {
        let pipeline = FeaturePipeline::new().unwrap();
        let rows = pipeline.compute(&bars_from_closes(&[42.0; 70]));

        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.rsi_14 == 100.0));
    }

    #[test]
    fn test_rsi_formula() {
        assert_eq!(relative_strength_index(1.0, 0.0), 100.0);
        assert!((relative_strength_index(1.0, 1.0) - 50.0).abs() < 1e-12);
        assert_eq!(relative_strength_index(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_invalid_bars_are_skipped() {
        let mut bars = bars_from_closes(&zigzag(70));
        bars[10].close = f64::NAN;
        let pipeline = FeaturePipeline::new().unwrap();

        assert_eq!(pipeline.compute(&bars).len(), 69 - WARMUP_BARS + 1);
    }
}
