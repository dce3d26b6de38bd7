//! Category usage classification
//!
//! Maps a per-category hours vector to one of three coaching actions. A
//! learned softmax model is used when one is available; otherwise a fixed
//! rule on total hours produces a baseline answer.
//!
//! Model lifecycle: Uninitialized → Loaded → Trained. The model is loaded
//! lazily on the first prediction, at most once per classifier.

pub mod model;
pub mod suggestion;
pub mod types;

pub use model::{SoftmaxModel, TrainingParams};
pub use types::{
    CategoryUsage, ClassificationResult, LoadOutcome, Suggestion, TrainingReport, UsageAction,
    UsageCategory, ACTION_COUNT, CATEGORY_COUNT,
};

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Confidence reported by the baseline rule
pub const BASELINE_CONFIDENCE: f64 = 0.7;

/// Probability given to each non-predicted class by the baseline rule
pub const BASELINE_OTHER_PROBABILITY: f64 = 0.15;

/// Baseline thresholds on total hours
const TAKE_BREAKS_HOURS: f64 = 4.0;
const REDUCE_USAGE_HOURS: f64 = 8.0;

/// Upper bound in hours per category for synthetic samples, canonical order
const SYNTHETIC_MAX_HOURS: [f64; CATEGORY_COUNT] =
    [5.0, 4.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.5, 1.0, 1.0];

/// Baseline rule on total daily hours
pub fn baseline_action(total_hours: f64) -> UsageAction {
    if total_hours < TAKE_BREAKS_HOURS {
        UsageAction::NoChange
    } else if total_hours < REDUCE_USAGE_HOURS {
        UsageAction::TakeBreaks
    } else {
        UsageAction::ReduceUsage
    }
}

/// Random usage vectors labeled with the baseline rule
pub fn synthetic_training_set(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);

    for _ in 0..n {
        let row: Vec<f64> = SYNTHETIC_MAX_HOURS
            .iter()
            .map(|&max| rng.gen_range(0.0..max))
            .collect();
        let total: f64 = row.iter().sum();
        labels.push(baseline_action(total).index());
        samples.push(row);
    }

    (samples, labels)
}

#[derive(Debug)]
enum ModelState {
    Uninitialized,
    Loaded(SoftmaxModel),
    Trained(SoftmaxModel),
}

impl ModelState {
    fn model(&self) -> Option<&SoftmaxModel> {
        match self {
            ModelState::Uninitialized => None,
            ModelState::Loaded(model) | ModelState::Trained(model) => Some(model),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ModelState::Uninitialized => "uninitialized",
            ModelState::Loaded(_) => "loaded",
            ModelState::Trained(_) => "trained",
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: ModelState,
    load_attempted: bool,
}

/// Classifier shared between readers (predict) and writers (train, load)
#[derive(Debug)]
pub struct CategoryClassifier {
    model_path: PathBuf,
    model_enabled: bool,
    inner: RwLock<Inner>,
}

impl CategoryClassifier {
    pub fn new(model_path: impl Into<PathBuf>, model_enabled: bool) -> Self {
        Self {
            model_path: model_path.into(),
            model_enabled,
            inner: RwLock::new(Inner {
                state: ModelState::Uninitialized,
                load_attempted: false,
            }),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.model_path.clone(), config.capabilities.category_model)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Lifecycle state name: `uninitialized`, `loaded` or `trained`
    pub fn state(&self) -> &'static str {
        self.inner.read().state.name()
    }

    /// Classify a usage vector, lazily loading the model on first use
    pub fn predict(&self, usage: &CategoryUsage) -> ClassificationResult {
        if !self.model_enabled {
            return baseline_result(usage);
        }

        self.ensure_loaded();

        let inner = self.inner.read();
        match inner.state.model() {
            Some(model) => model_result(model, usage),
            None => baseline_result(usage),
        }
    }

    /// Fit a new model and make it the active one
    pub fn train(
        &self,
        samples: &[Vec<f64>],
        labels: &[usize],
        params: TrainingParams,
    ) -> Result<TrainingReport, AnalysisError> {
        let (model, report) = SoftmaxModel::train(samples, labels, params)?;
        info!(
            samples = report.samples,
            accuracy = report.accuracy,
            loss = report.final_loss,
            "Category model trained"
        );

        let mut inner = self.inner.write();
        inner.state = ModelState::Trained(model);
        inner.load_attempted = true;
        Ok(report)
    }

    /// Persist the active model
    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let inner = self.inner.read();
        let model = inner.state.model().ok_or_else(|| {
            AnalysisError::ModelError("no trained or loaded model to save".to_string())
        })?;
        model.save(path)?;
        info!(path = %path.display(), "Category model saved");
        Ok(())
    }

    /// Replace the active model with one read from `path`
    pub fn load(&self, path: &Path) -> Result<LoadOutcome, AnalysisError> {
        let loaded = SoftmaxModel::load(path)?;
        let mut inner = self.inner.write();
        inner.load_attempted = true;
        match loaded {
            Some(model) => {
                inner.state = ModelState::Loaded(model);
                info!(path = %path.display(), "Category model loaded");
                Ok(LoadOutcome::Loaded)
            }
            None => {
                debug!(path = %path.display(), "No category model found");
                Ok(LoadOutcome::NotFound)
            }
        }
    }

    fn ensure_loaded(&self) {
        if self.inner.read().load_attempted {
            return;
        }

        let mut inner = self.inner.write();
        if inner.load_attempted {
            return;
        }
        inner.load_attempted = true;

        match SoftmaxModel::load(&self.model_path) {
            Ok(Some(model)) => {
                info!(path = %self.model_path.display(), "Category model loaded");
                inner.state = ModelState::Loaded(model);
            }
            Ok(None) => {
                debug!(path = %self.model_path.display(), "No category model, using baseline");
            }
            Err(e) => {
                warn!(
                    path = %self.model_path.display(),
                    error = %e,
                    "Category model unreadable, using baseline"
                );
            }
        }
    }
}

fn baseline_result(usage: &CategoryUsage) -> ClassificationResult {
    let action = baseline_action(usage.total_hours());
    let probabilities = UsageAction::ALL
        .iter()
        .map(|&a| {
            let p = if a == action {
                BASELINE_CONFIDENCE
            } else {
                BASELINE_OTHER_PROBABILITY
            };
            (a, p)
        })
        .collect();

    ClassificationResult {
        class_index: action.index(),
        action,
        confidence: BASELINE_CONFIDENCE,
        probabilities,
        suggestion: suggestion::build_suggestion(action, usage),
        baseline: true,
    }
}

fn model_result(model: &SoftmaxModel, usage: &CategoryUsage) -> ClassificationResult {
    let probs = model.probabilities(&usage.as_features());
    let class_index = model::argmax(&probs);
    let action = UsageAction::from_index(class_index).unwrap_or(UsageAction::NoChange);
    let probabilities: BTreeMap<UsageAction, f64> =
        UsageAction::ALL.iter().map(|&a| (a, probs[a.index()])).collect();

    ClassificationResult {
        class_index,
        action,
        confidence: probs[class_index],
        probabilities,
        suggestion: suggestion::build_suggestion(action, usage),
        baseline: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn usage_with_total(hours: f64) -> CategoryUsage {
        let mut usage = CategoryUsage::default();
        usage.set(UsageCategory::SocialMedia, hours / 2.0);
        usage.set(UsageCategory::Entertainment, hours / 2.0);
        usage
    }

    fn offline_classifier() -> (tempfile::TempDir, CategoryClassifier) {
        let dir = tempdir().unwrap();
        let classifier = CategoryClassifier::new(dir.path().join("model.json"), true);
        (dir, classifier)
    }

    #[test]
    fn test_baseline_thresholds() {
        let (_dir, classifier) = offline_classifier();

        let high = classifier.predict(&usage_with_total(10.0));
        assert_eq!(high.action, UsageAction::ReduceUsage);
        assert_eq!(high.class_index, 2);
        assert_eq!(high.confidence, 0.7);
        assert!(high.baseline);

        assert_eq!(
            classifier.predict(&usage_with_total(5.0)).action,
            UsageAction::TakeBreaks
        );
        assert_eq!(
            classifier.predict(&usage_with_total(2.0)).action,
            UsageAction::NoChange
        );
        assert_eq!(baseline_action(4.0), UsageAction::TakeBreaks);
        assert_eq!(baseline_action(8.0), UsageAction::ReduceUsage);
    }

    #[test]
    fn test_baseline_probabilities() {
        let (_dir, classifier) = offline_classifier();
        let result = classifier.predict(&usage_with_total(5.0));

        assert_eq!(result.probabilities[&UsageAction::TakeBreaks], 0.7);
        assert_eq!(result.probabilities[&UsageAction::NoChange], 0.15);
        assert_eq!(result.probabilities[&UsageAction::ReduceUsage], 0.15);
    }

    #[test]
    fn test_lazy_load_happens_once() {
        let (dir, classifier) = offline_classifier();
        assert_eq!(classifier.state(), "uninitialized");

        classifier.predict(&usage_with_total(1.0));
        assert_eq!(classifier.state(), "uninitialized");

        // a model appearing later is not picked up without an explicit load
        let (samples, labels) = synthetic_training_set(200, 7);
        let (model, _) = SoftmaxModel::train(&samples, &labels, TrainingParams::default()).unwrap();
        model.save(&dir.path().join("model.json")).unwrap();

        assert!(classifier.predict(&usage_with_total(1.0)).baseline);
        assert_eq!(
            classifier.load(&dir.path().join("model.json")).unwrap(),
            LoadOutcome::Loaded
        );
        assert_eq!(classifier.state(), "loaded");
        assert!(!classifier.predict(&usage_with_total(1.0)).baseline);
    }

    #[test]
    fn test_lazy_load_picks_up_existing_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let (samples, labels) = synthetic_training_set(200, 3);
        let (model, _) = SoftmaxModel::train(&samples, &labels, TrainingParams::default()).unwrap();
        model.save(&path).unwrap();

        let classifier = CategoryClassifier::new(&path, true);
        let result = classifier.predict(&usage_with_total(12.0));
        assert!(!result.baseline);
        assert_eq!(classifier.state(), "loaded");
        assert!((result.probabilities.values().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_model_always_uses_baseline() {
        let dir = tempdir().unwrap();
        let classifier = CategoryClassifier::new(dir.path().join("model.json"), false);
        let (samples, labels) = synthetic_training_set(50, 1);
        classifier
            .train(&samples, &labels, TrainingParams::default())
            .unwrap();
        assert!(classifier.predict(&usage_with_total(3.0)).baseline);
    }

    #[test]
    fn test_train_save_load_round_trip() {
        let (dir, classifier) = offline_classifier();
        let (samples, labels) = synthetic_training_set(300, 42);
        let report = classifier
            .train(&samples, &labels, TrainingParams::default())
            .unwrap();
        assert_eq!(report.samples, 300);
        assert_eq!(classifier.state(), "trained");

        let path = dir.path().join("saved.json");
        classifier.save(&path).unwrap();

        let reloaded = CategoryClassifier::new(&path, true);
        for hours in [1.0, 5.0, 9.0, 14.0] {
            let usage = usage_with_total(hours);
            let (before, after) = (classifier.predict(&usage), reloaded.predict(&usage));
            assert_eq!(before.action, after.action);
            assert_eq!(before.suggestion, after.suggestion);
            assert!((before.confidence - after.confidence).abs() < 1e-9);
        }
    }

    #[test]
    fn test_save_without_model_fails() {
        let (dir, classifier) = offline_classifier();
        assert!(matches!(
            classifier.save(&dir.path().join("out.json")),
            Err(AnalysisError::ModelError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let (dir, classifier) = offline_classifier();
        assert_eq!(
            classifier.load(&dir.path().join("nope.json")).unwrap(),
            LoadOutcome::NotFound
        );
        assert_eq!(classifier.state(), "uninitialized");
    }

    #[test]
    fn test_synthetic_set_is_reproducible_and_labeled() {
        let (a_samples, a_labels) = synthetic_training_set(100, 9);
        let (b_samples, b_labels) = synthetic_training_set(100, 9);
        assert_eq!(a_samples, b_samples);
        assert_eq!(a_labels, b_labels);

        for (row, &label) in a_samples.iter().zip(&a_labels) {
            assert_eq!(row.len(), CATEGORY_COUNT);
            assert_eq!(baseline_action(row.iter().sum()).index(), label);
        }
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let (_dir, classifier) = offline_classifier();
        let json = serde_json::to_value(classifier.predict(&usage_with_total(9.0))).unwrap();
        assert_eq!(json["classIndex"], 2);
        assert_eq!(json["action"], "reduce_usage");
        assert_eq!(json["baseline"], true);
        assert_eq!(json["probabilities"]["reduce_usage"], 0.7);
    }
}
