use crate::domain::market::PriceBar;
use chrono::DateTime;
use serde::Deserialize;

// ===== Chart endpoint wire format =====

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Daily bars in date order; rows with any missing field are skipped.
    ///
    /// A response without results (unknown symbol) yields no bars.
    pub fn into_bars(self) -> Vec<PriceBar> {
        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Vec::new();
        };
        let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Vec::new();
        };

        let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        let mut bars: Vec<PriceBar> = result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
                Some(PriceBar::new(
                    date,
                    at(&quote.open, i)?,
                    at(&quote.high, i)?,
                    at(&quote.low, i)?,
                    at(&quote.close, i)?,
                    at(&quote.volume, i)?,
                ))
            })
            .filter(|bar| bar.is_valid())
            .collect();

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "gmtoffset": -14400},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{
                    "open":   [187.15, null, 182.15],
                    "high":   [188.44, 185.88, 183.09],
                    "low":    [183.89, 183.43, 180.88],
                    "close":  [185.64, 184.25, 181.91],
                    "volume": [82488700, 58414500, 71983600]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parses_bars_and_skips_incomplete_rows() {
        let response: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let bars = response.into_bars();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[1].volume, 71983600.0);
    }

    #[test]
    fn test_unknown_symbol_is_empty() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();

        assert!(response.chart.error.is_some());
        assert!(response.into_bars().is_empty());
    }
}
