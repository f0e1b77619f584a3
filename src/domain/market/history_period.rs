use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative lookback window accepted by the price history provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl HistoryPeriod {
    /// Range string understood by the chart API ("6mo", "2y", ...)
    pub fn as_range_str(&self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::FiveDays => "5d",
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
        }
    }

    /// Approximate number of daily bars in this window (252 trading days per year)
    pub fn trading_days(&self) -> usize {
        match self {
            HistoryPeriod::OneDay => 1,
            HistoryPeriod::FiveDays => 5,
            HistoryPeriod::OneMonth => 21,
            HistoryPeriod::ThreeMonths => 63,
            HistoryPeriod::SixMonths => 126,
            HistoryPeriod::OneYear => 252,
            HistoryPeriod::TwoYears => 504,
            HistoryPeriod::FiveYears => 1260,
        }
    }

    pub fn all() -> Vec<HistoryPeriod> {
        vec![
            HistoryPeriod::OneDay,
            HistoryPeriod::FiveDays,
            HistoryPeriod::OneMonth,
            HistoryPeriod::ThreeMonths,
            HistoryPeriod::SixMonths,
            HistoryPeriod::OneYear,
            HistoryPeriod::TwoYears,
            HistoryPeriod::FiveYears,
        ]
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(HistoryPeriod::OneDay),
            "5d" => Ok(HistoryPeriod::FiveDays),
            "1mo" => Ok(HistoryPeriod::OneMonth),
            "3mo" => Ok(HistoryPeriod::ThreeMonths),
            "6mo" => Ok(HistoryPeriod::SixMonths),
            "1y" => Ok(HistoryPeriod::OneYear),
            "2y" => Ok(HistoryPeriod::TwoYears),
            "5y" => Ok(HistoryPeriod::FiveYears),
            _ => Err(anyhow!(
                "Invalid history period: '{}'. Valid options: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y",
                s
            )),
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_range_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing_matches_display() {
        for period in HistoryPeriod::all() {
            let parsed: HistoryPeriod = period.to_string().parse().unwrap();
            assert_eq!(parsed, period);
        }
    }

    #[test]
    fn test_period_parsing_is_case_insensitive() {
        assert_eq!(
            "6MO".parse::<HistoryPeriod>().unwrap(),
            HistoryPeriod::SixMonths
        );
        assert_eq!(" 2y ".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::TwoYears);
    }

    #[test]
    fn test_invalid_period_rejected() {
        assert!("10y".parse::<HistoryPeriod>().is_err());
        assert!("".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn test_trading_days_are_ordered() {
        let days: Vec<usize> = HistoryPeriod::all()
            .iter()
            .map(|p| p.trading_days())
            .collect();
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(HistoryPeriod::TwoYears.trading_days(), 504);
    }
}
