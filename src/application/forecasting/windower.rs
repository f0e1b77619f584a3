use crate::domain::errors::ForecastError;
use crate::domain::forecasting::CLOSE_INDEX;
use crate::domain::ml::Sequence;
use ndarray::{Array2, ArrayView2, s};

/// Number of training sequences a series of `rows` yields
pub fn sequence_count(rows: usize, sequence_length: usize) -> usize {
    rows.saturating_sub(sequence_length)
}

/// Sliding windows with stride 1: inputs are rows `[i, i+L)`, target is the close of row `i+L`.
pub fn training_sequences(scaled: ArrayView2<f64>, sequence_length: usize) -> Vec<Sequence> {
    let count = sequence_count(scaled.nrows(), sequence_length);
    if sequence_length == 0 {
        return Vec::new();
    }

    (0..count)
        .map(|i| Sequence {
            inputs: scaled.slice(s![i..i + sequence_length, ..]).to_owned(),
            target: scaled[[i + sequence_length, CLOSE_INDEX]],
        })
        .collect()
}

/// The last `sequence_length` rows, the seed of the autoregressive loop
pub fn serving_window(
    symbol: &str,
    scaled: ArrayView2<f64>,
    sequence_length: usize,
) -> Result<Array2<f64>, ForecastError> {
    let available = scaled.nrows();
    if sequence_length == 0 || available < sequence_length {
        return Err(ForecastError::InsufficientHistory {
            symbol: symbol.to_string(),
            available,
            required: sequence_length,
        });
    }

    Ok(scaled
        .slice(s![available - sequence_length.., ..])
        .to_owned())
}

/// Chronological split: the first `ratio` share trains, the rest validates
pub fn split_train_validation(sequences: Vec<Sequence>, ratio: f64) -> (Vec<Sequence>, Vec<Sequence>) {
    let ratio = ratio.clamp(0.0, 1.0);
    let split = ((sequences.len() as f64) * ratio) as usize;
    let mut train = sequences;
    let validation = train.split_off(split.min(train.len()));
    (train, validation)
}
