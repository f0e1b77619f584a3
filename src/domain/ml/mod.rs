pub mod artifact;
pub mod mlp_regressor;
pub mod normalizer;
pub mod sequence_model;

pub use artifact::ModelArtifact;
pub use mlp_regressor::{MlpRegressor, TrainingParams, TrainingReport};
pub use normalizer::MinMaxNormalizer;
pub use sequence_model::{ModelError, Sequence, SequenceModel};
