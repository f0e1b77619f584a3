use crate::domain::errors::ForecastError;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature min/max rescaling to `[0, 1]`.
///
/// Fitted once per training cycle; `transform` and `inverse_transform`
/// reuse the fitted range and extrapolate linearly outside it.
/// A constant column uses a unit range so it maps to zero instead of dividing by zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxNormalizer {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.data_min.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.data_min.len()
    }

    /// Learns per-column min/max, replacing any previous fit
    pub fn fit(&mut self, data: ArrayView2<f64>) -> Result<(), ForecastError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ForecastError::InvalidRequest {
                reason: "cannot fit normalizer on an empty matrix".to_string(),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidRequest {
                reason: "cannot fit normalizer on non-finite values".to_string(),
            });
        }

        let mut data_min = Vec::with_capacity(data.ncols());
        let mut data_max = Vec::with_capacity(data.ncols());
        for column in data.axis_iter(Axis(1)) {
            data_min.push(column.iter().copied().fold(f64::INFINITY, f64::min));
            data_max.push(column.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        }

        self.data_min = data_min;
        self.data_max = data_max;
        Ok(())
    }

    /// Fits on `data` then scales it. Training only: this redefines the fitted range.
    pub fn fit_transform(&mut self, data: ArrayView2<f64>) -> Result<Array2<f64>, ForecastError> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn transform(&self, data: ArrayView2<f64>) -> Result<Array2<f64>, ForecastError> {
        self.check_shape("transform", data.ncols())?;

        let mut scaled = data.to_owned();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.range(j);
            column.mapv_inplace(|v| (v - min) / range);
        }
        Ok(scaled)
    }

    pub fn inverse_transform(&self, scaled: ArrayView2<f64>) -> Result<Array2<f64>, ForecastError> {
        self.check_shape("inverse_transform", scaled.ncols())?;

        let mut restored = scaled.to_owned();
        for (j, mut column) in restored.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.range(j);
            column.mapv_inplace(|v| v * range + min);
        }
        Ok(restored)
    }

    /// Inverts a single column.
    ///
    /// Equivalent to padding the other columns with zeros, calling
    /// `inverse_transform` and keeping only `column`.
    pub fn inverse_transform_column(
        &self,
        column: usize,
        scaled: &[f64],
    ) -> Result<Vec<f64>, ForecastError> {
        if !self.is_fitted() {
            return Err(ForecastError::UnfittedState {
                operation: "inverse_transform",
            });
        }
        if column >= self.feature_count() {
            return Err(ForecastError::ShapeMismatch {
                expected: self.feature_count(),
                actual: column + 1,
            });
        }

        let min = self.data_min[column];
        let range = self.range(column);
        Ok(scaled.iter().map(|v| v * range + min).collect())
    }

    /// Fitted (min, max) of a column
    pub fn column_range(&self, column: usize) -> Option<(f64, f64)> {
        Some((*self.data_min.get(column)?, *self.data_max.get(column)?))
    }

    fn range(&self, column: usize) -> f64 {
        let range = self.data_max[column] - self.data_min[column];
        if range == 0.0 { 1.0 } else { range }
    }

    fn check_shape(&self, operation: &'static str, columns: usize) -> Result<(), ForecastError> {
        if !self.is_fitted() {
            return Err(ForecastError::UnfittedState { operation });
        }
        if columns != self.feature_count() {
            return Err(ForecastError::ShapeMismatch {
                expected: self.feature_count(),
                actual: columns,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn synthetic_rows() -> Array2<f64> {
        Array2::from_shape_fn((50, 6), |(i, j)| {
            let i = i as f64;
            match j {
                0 => 100.0 + (i * 0.37).sin() * 12.5,
                1 => 1_000.0 + i * 17.0,
                2 => 98.0 + i * 0.1,
                3 => 95.0 + (i * 0.05).cos(),
                4 => (i * 1.9) % 100.0,
                _ => 900.0 + i,
            }
        })
    }

    #[test]
    fn test_round_trip_within_fitted_range() {
        let data = synthetic_rows();
        let mut normalizer = MinMaxNormalizer::new();
        let scaled = normalizer.fit_transform(data.view()).unwrap();
        let restored = normalizer.inverse_transform(scaled.view()).unwrap();

        for (original, back) in data.iter().zip(restored.iter()) {
            assert!((original - back).abs() < 1e-9, "{} vs {}", original, back);
        }
    }

    #[test]
    fn test_scaled_values_in_unit_interval() {
        let data = synthetic_rows();
        let mut normalizer = MinMaxNormalizer::new();
        let scaled = normalizer.fit_transform(data.view()).unwrap();

        assert!(scaled.iter().all(|v| (-1e-12..=1.0 + 1e-12).contains(v)));
    }

    #[test]
    fn test_extrapolates_linearly_outside_range() {
        let mut normalizer = MinMaxNormalizer::new();
        normalizer.fit(array![[10.0], [20.0]].view()).unwrap();

        let scaled = normalizer.transform(array![[30.0], [5.0]].view()).unwrap();
        assert!((scaled[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((scaled[[1, 0]] + 0.5).abs() < 1e-12);

        let restored = normalizer.inverse_transform(scaled.view()).unwrap();
        assert!((restored[[0, 0]] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let mut normalizer = MinMaxNormalizer::new();
        let scaled = normalizer
            .fit_transform(array![[7.0, 1.0], [7.0, 2.0]].view())
            .unwrap();

        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[1, 0]], 0.0);
        let restored = normalizer.inverse_transform(scaled.view()).unwrap();
        assert_eq!(restored[[1, 0]], 7.0);
    }

    #[test]
    fn test_unfitted_use_is_rejected() {
        let normalizer = MinMaxNormalizer::new();
        let data = array![[1.0, 2.0]];

        assert!(matches!(
            normalizer.transform(data.view()),
            Err(ForecastError::UnfittedState { .. })
        ));
        assert!(matches!(
            normalizer.inverse_transform(data.view()),
            Err(ForecastError::UnfittedState { .. })
        ));
        assert!(matches!(
            normalizer.inverse_transform_column(0, &[0.5]),
            Err(ForecastError::UnfittedState { .. })
        ));
    }

    #[test]
    fn test_column_inverse_matches_zero_padded_inverse() {
        let data = synthetic_rows();
        let mut normalizer = MinMaxNormalizer::new();
        normalizer.fit(data.view()).unwrap();

        let predictions = [0.1, 0.55, 1.2];
        let mut padded = Array2::zeros((predictions.len(), 6));
        for (i, p) in predictions.iter().enumerate() {
            padded[[i, 0]] = *p;
        }
        let full = normalizer.inverse_transform(padded.view()).unwrap();
        let column = normalizer.inverse_transform_column(0, &predictions).unwrap();

        for (i, value) in column.iter().enumerate() {
            assert!((value - full[[i, 0]]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut normalizer = MinMaxNormalizer::new();
        normalizer.fit(array![[1.0, 2.0], [3.0, 4.0]].view()).unwrap();

        assert!(matches!(
            normalizer.transform(array![[1.0, 2.0, 3.0]].view()),
            Err(ForecastError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
