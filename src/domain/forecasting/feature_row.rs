use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Ordered list of feature names.
/// This order is the column order of every feature matrix and of stored
/// normalizers; changing it invalidates existing artifacts.
pub const FEATURE_NAMES: &[&str] = &[
    "close",
    "volume",
    "ma_20",
    "ma_50",
    "rsi_14",
    "volume_ma_20",
];

pub const FEATURE_COUNT: usize = 6;

/// Column holding the close price (the model target)
pub const CLOSE_INDEX: usize = 0;

/// One fully-defined row of indicators derived from a trailing window of bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub ma_20: f64,
    pub ma_50: f64,
    pub rsi_14: f64,
    pub volume_ma_20: f64,
}

impl FeatureRow {
    /// Values in `FEATURE_NAMES` order
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.close,
            self.volume,
            self.ma_20,
            self.ma_50,
            self.rsi_14,
            self.volume_ma_20,
        ]
    }
}

/// Stacks rows into a `rows x FEATURE_COUNT` matrix
pub fn to_matrix(rows: &[FeatureRow]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i].values()[j])
}

/// Identifier stored with artifacts to detect schema drift
pub fn feature_schema() -> String {
    FEATURE_NAMES.join(",")
}
