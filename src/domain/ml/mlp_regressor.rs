//! Single hidden layer regressor over flattened feature windows.
//!
//! Trained with mini-batch Adam on mean squared error. Per-batch gradients
//! are accumulated in parallel with rayon; the shuffle order and weight
//! initialization come from a seeded RNG so a run is reproducible.

use super::sequence_model::{ModelError, Sequence, SequenceModel};
use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, Axis, Dimension, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub max_epochs: usize,
    /// Epochs without validation improvement before stopping
    pub patience: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub hidden_units: usize,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_epochs: 50,
            patience: 10,
            batch_size: 32,
            learning_rate: 0.001,
            hidden_units: 32,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs_run: usize,
    /// Epoch whose weights were kept
    pub best_epoch: usize,
    /// Validation MSE of the kept weights, or training MSE when there was no validation split
    pub best_validation_loss: f64,
    pub final_training_loss: f64,
    pub train_samples: usize,
    pub validation_samples: usize,
    pub stopped_early: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpRegressor {
    sequence_length: usize,
    feature_count: usize,
    hidden_weights: Array2<f64>,
    hidden_bias: Array1<f64>,
    output_weights: Array1<f64>,
    output_bias: f64,
}

/// Gradient (or Adam moment) buffers shaped like the model parameters
#[derive(Debug, Clone)]
struct Gradients {
    hidden_weights: Array2<f64>,
    hidden_bias: Array1<f64>,
    output_weights: Array1<f64>,
    output_bias: f64,
    loss: f64,
}

impl Gradients {
    fn zeros(hidden_units: usize, inputs: usize) -> Self {
        Self {
            hidden_weights: Array2::zeros((hidden_units, inputs)),
            hidden_bias: Array1::zeros(hidden_units),
            output_weights: Array1::zeros(hidden_units),
            output_bias: 0.0,
            loss: 0.0,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.hidden_weights += &other.hidden_weights;
        self.hidden_bias += &other.hidden_bias;
        self.output_weights += &other.output_weights;
        self.output_bias += other.output_bias;
        self.loss += other.loss;
        self
    }

    fn scale(&mut self, factor: f64) {
        self.hidden_weights *= factor;
        self.hidden_bias *= factor;
        self.output_weights *= factor;
        self.output_bias *= factor;
    }
}

struct AdamOptimizer {
    learning_rate: f64,
    step: i32,
    first_moment: Gradients,
    second_moment: Gradients,
}

impl AdamOptimizer {
    fn new(model: &MlpRegressor, learning_rate: f64) -> Self {
        let (hidden, inputs) = model.hidden_weights.dim();
        Self {
            learning_rate,
            step: 0,
            first_moment: Gradients::zeros(hidden, inputs),
            second_moment: Gradients::zeros(hidden, inputs),
        }
    }

    fn apply(&mut self, model: &mut MlpRegressor, grads: &Gradients) {
        self.step += 1;
        let correction = (1.0 - BETA2.powi(self.step)).sqrt() / (1.0 - BETA1.powi(self.step));
        let lr = self.learning_rate * correction;

        update_tensor(
            &mut model.hidden_weights,
            &grads.hidden_weights,
            &mut self.first_moment.hidden_weights,
            &mut self.second_moment.hidden_weights,
            lr,
        );
        update_tensor(
            &mut model.hidden_bias,
            &grads.hidden_bias,
            &mut self.first_moment.hidden_bias,
            &mut self.second_moment.hidden_bias,
            lr,
        );
        update_tensor(
            &mut model.output_weights,
            &grads.output_weights,
            &mut self.first_moment.output_weights,
            &mut self.second_moment.output_weights,
            lr,
        );

        let g = grads.output_bias;
        let m = &mut self.first_moment.output_bias;
        let v = &mut self.second_moment.output_bias;
        *m = BETA1 * *m + (1.0 - BETA1) * g;
        *v = BETA2 * *v + (1.0 - BETA2) * g * g;
        model.output_bias -= lr * *m / (v.sqrt() + EPSILON);
    }
}

fn update_tensor<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    first_moment: &mut Array<f64, D>,
    second_moment: &mut Array<f64, D>,
    lr: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(first_moment)
        .and(second_moment)
        .for_each(|p, &g, m, v| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            *p -= lr * *m / (v.sqrt() + EPSILON);
        });
}

fn flatten(window: ArrayView2<f64>) -> Array1<f64> {
    window.iter().copied().collect()
}

impl MlpRegressor {
    /// Glorot-uniform initialized network
    pub fn new(
        sequence_length: usize,
        feature_count: usize,
        hidden_units: usize,
        rng: &mut StdRng,
    ) -> Self {
        let inputs = sequence_length * feature_count;
        let hidden_limit = (6.0 / (inputs + hidden_units) as f64).sqrt();
        let output_limit = (6.0 / (hidden_units + 1) as f64).sqrt();

        let hidden_weights = Array2::from_shape_fn((hidden_units, inputs), |_| {
            rng.random_range(-hidden_limit..hidden_limit)
        });
        let output_weights = Array1::from_shape_fn(hidden_units, |_| {
            rng.random_range(-output_limit..output_limit)
        });

        Self {
            sequence_length,
            feature_count,
            hidden_weights,
            hidden_bias: Array1::zeros(hidden_units),
            output_weights,
            output_bias: 0.0,
        }
    }

    pub fn hidden_units(&self) -> usize {
        self.hidden_bias.len()
    }

    /// Fits a fresh network.
    ///
    /// Keeps the weights from the epoch with the lowest monitored loss
    /// (validation loss, or training loss when `validation` is empty) and
    /// stops after `patience` epochs without improvement.
    pub fn fit(
        train: &[Sequence],
        validation: &[Sequence],
        params: &TrainingParams,
    ) -> Result<(Self, TrainingReport), ModelError> {
        let first = train.first().ok_or(ModelError::EmptyTrainingSet)?;
        let (sequence_length, feature_count) = first.inputs.dim();

        for sequence in train.iter().chain(validation) {
            let (rows, cols) = sequence.inputs.dim();
            if rows != sequence_length || cols != feature_count {
                return Err(ModelError::WindowShape {
                    expected_rows: sequence_length,
                    expected_cols: feature_count,
                    actual_rows: rows,
                    actual_cols: cols,
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut model = Self::new(
            sequence_length,
            feature_count,
            params.hidden_units.max(1),
            &mut rng,
        );

        let train_x: Vec<Array1<f64>> = train.iter().map(|s| flatten(s.inputs.view())).collect();
        let train_y: Vec<f64> = train.iter().map(|s| s.target).collect();
        let val_x: Vec<Array1<f64>> = validation
            .iter()
            .map(|s| flatten(s.inputs.view()))
            .collect();
        let val_y: Vec<f64> = validation.iter().map(|s| s.target).collect();

        let mut optimizer = AdamOptimizer::new(&model, params.learning_rate);
        let mut order: Vec<usize> = (0..train.len()).collect();
        let batch_size = params.batch_size.max(1);

        let mut best_model = model.clone();
        let mut best_validation_loss = f64::INFINITY;
        let mut best_epoch = 0;
        let mut epochs_without_improvement = 0;
        let mut epochs_run = 0;
        let mut final_training_loss = f64::NAN;
        let mut stopped_early = false;

        for epoch in 1..=params.max_epochs {
            order.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            for batch in order.chunks(batch_size) {
                let mut grads = model.batch_gradients(batch, &train_x, &train_y);
                epoch_loss += grads.loss;
                grads.scale(1.0 / batch.len() as f64);
                optimizer.apply(&mut model, &grads);
            }

            final_training_loss = epoch_loss / train.len() as f64;
            if !final_training_loss.is_finite() {
                return Err(ModelError::Diverged { epoch });
            }
            epochs_run = epoch;

            let monitored = if val_x.is_empty() {
                final_training_loss
            } else {
                model.mean_squared_error(&val_x, &val_y)
            };

            if monitored < best_validation_loss {
                best_validation_loss = monitored;
                best_epoch = epoch;
                best_model = model.clone();
                epochs_without_improvement = 0;
            } else {
                epochs_without_improvement += 1;
                if epochs_without_improvement >= params.patience {
                    debug!(
                        "MlpRegressor: early stop at epoch {} (best epoch {}, loss {:.6})",
                        epoch, best_epoch, best_validation_loss
                    );
                    stopped_early = true;
                    break;
                }
            }
        }

        let report = TrainingReport {
            epochs_run,
            best_epoch,
            best_validation_loss,
            final_training_loss,
            train_samples: train.len(),
            validation_samples: validation.len(),
            stopped_early,
        };
        Ok((best_model, report))
    }

    fn forward(&self, x: ArrayView1<f64>) -> (Array1<f64>, f64) {
        let hidden = (self.hidden_weights.dot(&x) + &self.hidden_bias).mapv(f64::tanh);
        let output = self.output_weights.dot(&hidden) + self.output_bias;
        (hidden, output)
    }

    fn sample_gradients(&self, x: &Array1<f64>, target: f64) -> Gradients {
        let (hidden, output) = self.forward(x.view());
        let error = output - target;
        let d_output = 2.0 * error;

        let output_weights = &hidden * d_output;
        let d_hidden = &self.output_weights * d_output * &hidden.mapv(|h| 1.0 - h * h);
        let hidden_weights = d_hidden
            .view()
            .insert_axis(Axis(1))
            .dot(&x.view().insert_axis(Axis(0)));

        Gradients {
            hidden_weights,
            hidden_bias: d_hidden,
            output_weights,
            output_bias: d_output,
            loss: error * error,
        }
    }

    /// Summed (not averaged) gradients over the batch
    fn batch_gradients(&self, batch: &[usize], inputs: &[Array1<f64>], targets: &[f64]) -> Gradients {
        let (hidden, width) = self.hidden_weights.dim();
        batch
            .par_iter()
            .map(|&i| self.sample_gradients(&inputs[i], targets[i]))
            .reduce(|| Gradients::zeros(hidden, width), Gradients::merge)
    }

    fn mean_squared_error(&self, inputs: &[Array1<f64>], targets: &[f64]) -> f64 {
        let total: f64 = inputs
            .par_iter()
            .zip(targets.par_iter())
            .map(|(x, &y)| {
                let (_, output) = self.forward(x.view());
                (output - y).powi(2)
            })
            .sum();
        total / inputs.len() as f64
    }
}

impl SequenceModel for MlpRegressor {
    fn predict(&self, window: ArrayView2<f64>) -> Result<f64, ModelError> {
        let (rows, cols) = window.dim();
        if rows != self.sequence_length || cols != self.feature_count {
            return Err(ModelError::WindowShape {
                expected_rows: self.sequence_length,
                expected_cols: self.feature_count,
                actual_rows: rows,
                actual_cols: cols,
            });
        }

        let (_, output) = self.forward(flatten(window).view());
        if output.is_finite() {
            Ok(output)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn name(&self) -> &str {
        "mlp_regressor"
    }
}
