//! Softmax category model
//!
//! Multinomial logistic regression over standardized category hours. Weights
//! start at zero and are fitted with full-batch gradient descent, so training
//! is deterministic for a given data set. The model persists as JSON.

use crate::category::types::{TrainingReport, ACTION_COUNT, CATEGORY_COUNT};
use crate::error::AnalysisError;
use crate::forecast::scaler::StandardScaler;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Current persisted format
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Gradient descent settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 400,
            learning_rate: 0.5,
            l2: 1e-4,
        }
    }
}

/// Fitted model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxModel {
    pub format_version: u32,
    scaler: StandardScaler,
    /// One row of weights per action
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl SoftmaxModel {
    /// Fit on `samples` (10 hours per row) with action labels 0..=2
    pub fn train(
        samples: &[Vec<f64>],
        labels: &[usize],
        params: TrainingParams,
    ) -> Result<(Self, TrainingReport), AnalysisError> {
        validate_training_set(samples, labels)?;

        let scaler = StandardScaler::fit(samples);
        let x = scaler.transform(samples);
        let n = x.len() as f64;

        let mut weights = vec![vec![0.0; CATEGORY_COUNT]; ACTION_COUNT];
        let mut bias = vec![0.0; ACTION_COUNT];

        for epoch in 0..params.epochs {
            let mut grad_w = vec![vec![0.0; CATEGORY_COUNT]; ACTION_COUNT];
            let mut grad_b = vec![0.0; ACTION_COUNT];

            for (row, &label) in x.iter().zip(labels) {
                let probs = softmax(&logits(&weights, &bias, row));
                for k in 0..ACTION_COUNT {
                    let target = if k == label { 1.0 } else { 0.0 };
                    let err = probs[k] - target;
                    grad_b[k] += err;
                    for (g, v) in grad_w[k].iter_mut().zip(row) {
                        *g += err * v;
                    }
                }
            }

            for k in 0..ACTION_COUNT {
                bias[k] -= params.learning_rate * grad_b[k] / n;
                for j in 0..CATEGORY_COUNT {
                    let grad = grad_w[k][j] / n + params.l2 * weights[k][j];
                    weights[k][j] -= params.learning_rate * grad;
                }
            }

            if epoch % 100 == 0 {
                debug!(epoch, loss = cross_entropy(&weights, &bias, &x, labels), "Training");
            }
        }

        let model = Self {
            format_version: MODEL_FORMAT_VERSION,
            scaler,
            weights,
            bias,
        };

        let correct = samples
            .iter()
            .zip(labels)
            .filter(|(row, &label)| argmax(&model.probabilities(row)) == label)
            .count();

        let report = TrainingReport {
            samples: samples.len(),
            epochs: params.epochs,
            final_loss: cross_entropy(&model.weights, &model.bias, &x, labels),
            accuracy: correct as f64 / n,
        };

        Ok((model, report))
    }

    /// Class probabilities for a raw (unscaled) feature row
    pub fn probabilities(&self, features: &[f64]) -> [f64; ACTION_COUNT] {
        let row = self.scaler.transform_row(features);
        let probs = softmax(&logits(&self.weights, &self.bias, &row));
        let mut out = [0.0; ACTION_COUNT];
        out.copy_from_slice(&probs);
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a model; a missing file is `Ok(None)`
    pub fn load(path: &Path) -> Result<Option<Self>, AnalysisError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let model: Self = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(Some(model))
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(AnalysisError::ModelError(format!(
                "unsupported model format version {}",
                self.format_version
            )));
        }
        let shape_ok = self.scaler.width() == CATEGORY_COUNT
            && self.bias.len() == ACTION_COUNT
            && self.weights.len() == ACTION_COUNT
            && self.weights.iter().all(|w| w.len() == CATEGORY_COUNT);
        if !shape_ok {
            return Err(AnalysisError::ModelError(
                "model parameters have the wrong shape".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_training_set(samples: &[Vec<f64>], labels: &[usize]) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidTrainingData(
            "no training samples".to_string(),
        ));
    }
    if samples.len() != labels.len() {
        return Err(AnalysisError::InvalidTrainingData(format!(
            "{} samples but {} labels",
            samples.len(),
            labels.len()
        )));
    }
    if let Some(row) = samples.iter().position(|r| r.len() != CATEGORY_COUNT) {
        return Err(AnalysisError::InvalidTrainingData(format!(
            "sample {row} has {} features, expected {CATEGORY_COUNT}",
            samples[row].len()
        )));
    }
    if let Some(label) = labels.iter().find(|&&l| l >= ACTION_COUNT) {
        return Err(AnalysisError::InvalidTrainingData(format!(
            "label {label} is outside 0..{ACTION_COUNT}"
        )));
    }
    Ok(())
}

fn logits(weights: &[Vec<f64>], bias: &[f64], row: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .zip(bias)
        .map(|(w, b)| b + w.iter().zip(row).map(|(wi, xi)| wi * xi).sum::<f64>())
        .collect()
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Mean negative log-likelihood over standardized rows
fn cross_entropy(weights: &[Vec<f64>], bias: &[f64], x: &[Vec<f64>], labels: &[usize]) -> f64 {
    let total: f64 = x
        .iter()
        .zip(labels)
        .map(|(row, &label)| {
            let probs = softmax(&logits(weights, bias, row));
            -probs[label].max(1e-12).ln()
        })
        .sum();
    total / x.len().max(1) as f64
}

/// Index of the largest value; ties go to the lowest index
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}
