use super::forecast::ForecastResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the model artifact for one symbol.
///
/// `NoArtifact -> Training -> Ready`, and `Ready -> Training` on explicit retrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelState {
    NoArtifact,
    Training,
    Ready,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::NoArtifact => write!(f, "NoArtifact"),
            ModelState::Training => write!(f, "Training"),
            ModelState::Ready => write!(f, "Ready"),
        }
    }
}

/// Answer to a fire-and-forget training request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainStatus {
    Started,
    AlreadyTraining,
}

/// Answer to a prediction request that must not block on training
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Ready(ForecastResult),
    /// No artifact existed; a background training run was started
    TrainingStarted,
    /// A training run for this symbol is already in flight
    TrainingInProgress,
    Unavailable,
}
