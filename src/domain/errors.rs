use thiserror::Error;

/// Errors raised by the trend forecasting engine.
///
/// All of these collapse to "no result" at the public forecasting API;
/// callers that need the cause use the `try_*` variants.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Insufficient data for {symbol}: {reason}")]
    InsufficientData { symbol: String, reason: String },

    #[error("Insufficient history for {symbol}: {available} usable feature rows, need {required}")]
    InsufficientHistory {
        symbol: String,
        available: usize,
        required: usize,
    },

    #[error("Normalizer used before fit: {operation}")]
    UnfittedState { operation: &'static str },

    #[error("Price history unavailable for {symbol}: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    #[error("Stored artifact for {symbol} is corrupt: {reason}")]
    ArtifactCorrupt { symbol: String, reason: String },

    #[error("Feature shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Training failed for {symbol}: {reason}")]
    Training { symbol: String, reason: String },

    #[error("Model produced an invalid prediction: {reason}")]
    Prediction { reason: String },

    #[error("Artifact storage error: {reason}")]
    Storage { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ForecastError {
    /// Label used for metrics and log grouping.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::InsufficientData { .. } => "insufficient_data",
            ForecastError::InsufficientHistory { .. } => "insufficient_history",
            ForecastError::UnfittedState { .. } => "unfitted_state",
            ForecastError::ProviderUnavailable { .. } => "provider_unavailable",
            ForecastError::ArtifactCorrupt { .. } => "artifact_corrupt",
            ForecastError::ShapeMismatch { .. } => "shape_mismatch",
            ForecastError::Training { .. } => "training",
            ForecastError::Prediction { .. } => "prediction",
            ForecastError::Storage { .. } => "storage",
            ForecastError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Transient failures the caller may retry later. The engine never retries internally.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ForecastError::ProviderUnavailable { .. } | ForecastError::Storage { .. }
        )
    }
}
