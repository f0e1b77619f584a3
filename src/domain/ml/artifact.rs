use super::mlp_regressor::{MlpRegressor, TrainingReport};
use super::normalizer::MinMaxNormalizer;
use super::sequence_model::SequenceModel;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::feature_row::{FEATURE_COUNT, feature_schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything needed to serve forecasts for one symbol without retraining.
///
/// The model and the normalizer are saved and loaded together; an artifact
/// missing either one does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub symbol: String,
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_schema: String,
    pub sequence_length: usize,
    pub model: MlpRegressor,
    pub normalizer: MinMaxNormalizer,
    pub report: TrainingReport,
}

impl ModelArtifact {
    pub fn new(
        symbol: &str,
        sequence_length: usize,
        model: MlpRegressor,
        normalizer: MinMaxNormalizer,
        report: TrainingReport,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            feature_schema: feature_schema(),
            sequence_length,
            model,
            normalizer,
            report,
        }
    }

    /// Checks the artifact can serve the current feature layout at `sequence_length`
    pub fn validate(&self, sequence_length: usize) -> Result<(), ForecastError> {
        let corrupt = |reason: String| ForecastError::ArtifactCorrupt {
            symbol: self.symbol.clone(),
            reason,
        };

        if self.feature_schema != feature_schema() {
            return Err(corrupt(format!(
                "feature schema '{}' differs from '{}'",
                self.feature_schema,
                feature_schema()
            )));
        }
        if self.sequence_length != sequence_length
            || self.model.sequence_length() != sequence_length
        {
            return Err(corrupt(format!(
                "sequence length {} (model {}) differs from configured {}",
                self.sequence_length,
                self.model.sequence_length(),
                sequence_length
            )));
        }
        if !self.normalizer.is_fitted() {
            return Err(corrupt("normalizer is not fitted".to_string()));
        }
        if self.normalizer.feature_count() != FEATURE_COUNT
            || self.model.feature_count() != FEATURE_COUNT
        {
            return Err(corrupt(format!(
                "feature count (normalizer {}, model {}) differs from {}",
                self.normalizer.feature_count(),
                self.model.feature_count(),
                FEATURE_COUNT
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ForecastError> {
        serde_json::to_string(self).map_err(|e| ForecastError::Storage {
            reason: format!("failed to serialize artifact for {}: {}", self.symbol, e),
        })
    }

    pub fn from_json(symbol: &str, json: &str) -> Result<Self, ForecastError> {
        let artifact: Self =
            serde_json::from_str(json).map_err(|e| ForecastError::ArtifactCorrupt {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        if artifact.symbol != symbol {
            return Err(ForecastError::ArtifactCorrupt {
                symbol: symbol.to_string(),
                reason: format!("artifact belongs to {}", artifact.symbol),
            });
        }
        Ok(artifact)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Untrained but structurally valid artifact
    pub(crate) fn sample_artifact(symbol: &str, sequence_length: usize) -> ModelArtifact {
        let mut rng = StdRng::seed_from_u64(11);
        let model = MlpRegressor::new(sequence_length, FEATURE_COUNT, 4, &mut rng);
        let mut normalizer = MinMaxNormalizer::new();
        normalizer
            .fit(Array2::from_shape_fn((10, FEATURE_COUNT), |(i, j)| (i * (j + 1)) as f64).view())
            .unwrap();
        let report = TrainingReport {
            epochs_run: 1,
            best_epoch: 1,
            best_validation_loss: 0.1,
            final_training_loss: 0.1,
            train_samples: 8,
            validation_samples: 2,
            stopped_early: false,
        };
        ModelArtifact::new(symbol, sequence_length, model, normalizer, report)
    }

    #[test]
    fn test_json_round_trip() {
        let artifact = sample_artifact("AAPL", 5);
        let json = artifact.to_json().unwrap();
        let restored = ModelArtifact::from_json("AAPL", &json).unwrap();

        assert_eq!(restored.run_id, artifact.run_id);
        assert_eq!(restored.trained_at, artifact.trained_at);
        assert!(restored.validate(5).is_ok());

        let window = Array2::from_elem((5, FEATURE_COUNT), 0.5);
        let before = artifact.model.predict(window.view()).unwrap();
        let after = restored.model.predict(window.view()).unwrap();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        assert!(matches!(
            ModelArtifact::from_json("AAPL", "{\"symbol\":\"AAPL\"}"),
            Err(ForecastError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            ModelArtifact::from_json("AAPL", "not json"),
            Err(ForecastError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_wrong_symbol_is_corrupt() {
        let json = sample_artifact("MSFT", 5).to_json().unwrap();
        assert!(ModelArtifact::from_json("AAPL", &json).is_err());
    }

    #[test]
    fn test_validate_rejects_schema_and_length_drift() {
        let mut artifact = sample_artifact("AAPL", 5);
        assert!(artifact.validate(60).is_err());

        artifact.feature_schema = "close,volume".to_string();
        assert!(matches!(
            artifact.validate(5),
            Err(ForecastError::ArtifactCorrupt { .. })
        ));
    }
}
