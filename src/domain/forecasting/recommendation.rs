//! Maps a forecast's aggregate trend into a confidence tier and an action.
//!
//! The thresholds are fixed policy constants, not learned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// |trend| strictly above this is High confidence
pub const HIGH_CONFIDENCE_PCT: f64 = 10.0;
/// |trend| at or above this is at least Medium confidence
pub const MEDIUM_CONFIDENCE_PCT: f64 = 5.0;
/// trend strictly above this buys, strictly below its negation sells
pub const ACTION_THRESHOLD_PCT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// BUY or SELL
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Recommendation::Hold)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::Hold => write!(f, "HOLD"),
        }
    }
}

pub fn derive_confidence(trend_change_percent: f64) -> Confidence {
    let magnitude = trend_change_percent.abs();
    if magnitude > HIGH_CONFIDENCE_PCT {
        Confidence::High
    } else if magnitude >= MEDIUM_CONFIDENCE_PCT {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn derive_recommendation(trend_change_percent: f64) -> Recommendation {
    if trend_change_percent > ACTION_THRESHOLD_PCT {
        Recommendation::Buy
    } else if trend_change_percent < -ACTION_THRESHOLD_PCT {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

pub fn derive(trend_change_percent: f64) -> (Confidence, Recommendation) {
    (
        derive_confidence(trend_change_percent),
        derive_recommendation(trend_change_percent),
    )
}
