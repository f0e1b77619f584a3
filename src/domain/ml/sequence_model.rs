use ndarray::{Array2, ArrayView2};
use thiserror::Error;

/// One supervised example: `sequence_length` consecutive scaled feature
/// rows and the scaled close of the row that follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub inputs: Array2<f64>,
    pub target: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("no training sequences")]
    EmptyTrainingSet,

    #[error("window shape {actual_rows}x{actual_cols} does not match model input {expected_rows}x{expected_cols}")]
    WindowShape {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("training diverged at epoch {epoch}")]
    Diverged { epoch: usize },

    #[error("model produced a non-finite output")]
    NonFiniteOutput,
}

/// Regression model over fixed-length feature windows.
///
/// `predict` returns the next step's scaled close.
pub trait SequenceModel: Send + Sync {
    fn predict(&self, window: ArrayView2<f64>) -> Result<f64, ModelError>;

    fn sequence_length(&self) -> usize;

    fn feature_count(&self) -> usize;

    /// Get model name/type
    fn name(&self) -> &str;
}
