//! Short-horizon screen time forecasting
//!
//! Fits a random forest from calendar/context features to daily hours and
//! projects the next seven days.
//!
//! Pipeline: Dataset → feature rows → train/eval split → StandardScaler →
//! RandomForestRegressor → metrics → 7-day projection
//!
//! With fewer than [`HOLDOUT_MIN_RECORDS`] records the model is evaluated on
//! its own training rows, so the reported quality is optimistic.

pub mod forest;
pub mod scaler;

use crate::config::ForecastConfig;
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::types::{FitQuality, Forecast, ForecastDay, ModelPerformance};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

pub use forest::RandomForestRegressor;
pub use scaler::StandardScaler;

/// Minimum records before forecasting is attempted
pub const MIN_FORECAST_RECORDS: usize = 7;

/// Minimum records before a held-out evaluation split is used
pub const HOLDOUT_MIN_RECORDS: usize = 10;

/// Fraction of records held out for evaluation
const TEST_FRACTION: f64 = 0.3;

/// Number of projected days
pub const FORECAST_DAYS: usize = 7;

/// Random-forest forecaster
pub struct Forecaster {
    config: ForecastConfig,
    enabled: bool,
}

impl Forecaster {
    /// `enabled = false` models a missing regression backend: every call
    /// returns [`AnalysisError::ForecasterUnavailable`].
    pub fn new(config: ForecastConfig, enabled: bool) -> Self {
        Self { config, enabled }
    }

    /// Fit on `dataset` and project seven days starting at `today`
    pub fn forecast(
        &self,
        dataset: &Dataset,
        today: NaiveDate,
    ) -> Result<Forecast, AnalysisError> {
        if !self.enabled {
            return Err(AnalysisError::ForecasterUnavailable);
        }
        if dataset.len() < MIN_FORECAST_RECORDS {
            return Err(AnalysisError::InsufficientData {
                required: MIN_FORECAST_RECORDS,
                actual: dataset.len(),
            });
        }
        let start = dataset.start_date().ok_or(AnalysisError::EmptyDataset)?;

        // the seeded split indexes rows, so they must be in a canonical order
        let records = dataset.sorted_by_date();
        let x: Vec<Vec<f64>> = records
            .iter()
            .map(|r| {
                feature_row(
                    r.day_of_week,
                    r.app_count as f64,
                    r.is_weekend,
                    (r.date - start).num_days(),
                )
            })
            .collect();
        let y: Vec<f64> = records
            .iter()
            .map(|r| r.screen_time_hours())
            .collect();

        let split = train_test_split(x.len(), self.config.seed);
        let held_out = split.held_out;
        let (train_x, train_y) = select(&x, &y, &split.train);
        let (eval_x, eval_y) = select(&x, &y, &split.eval);

        let scaler = StandardScaler::fit(&train_x);
        let mut model = RandomForestRegressor::new(self.config.estimators, self.config.seed);
        model.fit(&scaler.transform(&train_x), &train_y);

        let predicted = model.predict(&scaler.transform(&eval_x));
        let mae = mean_absolute_error(&eval_y, &predicted);
        let r2 = r2_score(&eval_y, &predicted);
        debug!(mae, r2, held_out, "Forecast model evaluated");

        let app_count = dataset.mean_app_count();
        let next_7_days: Vec<ForecastDay> = (0..FORECAST_DAYS as i64)
            .map(|offset| {
                let date = today + Duration::days(offset);
                let day_of_week = sunday_based_weekday(date);
                let is_weekend = day_of_week == 0 || day_of_week == 6;
                let days_since_start = (date - start).num_days();
                let row = feature_row(day_of_week, app_count, is_weekend, days_since_start);
                let raw = model.predict_row(&scaler.transform_row(&row));
                ForecastDay {
                    date,
                    day_of_week,
                    predicted_screen_time_hours: raw.max(0.0),
                    is_weekend,
                }
            })
            .collect();

        let weekly_prediction: f64 = next_7_days
            .iter()
            .map(|d| d.predicted_screen_time_hours)
            .sum();
        info!(
            weekly_prediction,
            accuracy = FitQuality::from_r2(r2).as_str(),
            "Forecast ready"
        );

        Ok(Forecast {
            model_performance: ModelPerformance {
                mean_absolute_error_hours: mae,
                r2_score: r2,
                accuracy: FitQuality::from_r2(r2),
                training_samples: split.train.len(),
                evaluation_samples: split.eval.len(),
                held_out_evaluation: held_out,
            },
            next_7_days,
            weekly_prediction,
        })
    }
}

/// Feature order: day of week, app count, weekend flag, days since start
fn feature_row(
    day_of_week: u8,
    app_count: f64,
    is_weekend: bool,
    days_since_start: i64,
) -> Vec<f64> {
    vec![
        day_of_week as f64,
        app_count,
        if is_weekend { 1.0 } else { 0.0 },
        days_since_start as f64,
    ]
}

/// Weekday on the 0 = Sunday scale, derived from the Monday = 1..Sunday = 7 numbering
pub fn sunday_based_weekday(date: NaiveDate) -> u8 {
    let monday_based = date.weekday().number_from_monday() as u8;
    if monday_based == 7 {
        0
    } else {
        monday_based
    }
}

struct Split {
    train: Vec<usize>,
    eval: Vec<usize>,
    held_out: bool,
}

/// Shuffled 70/30 split for `n >= 10`; below that, train and evaluate on everything
fn train_test_split(n: usize, seed: u64) -> Split {
    let all: Vec<usize> = (0..n).collect();
    if n < HOLDOUT_MIN_RECORDS {
        return Split {
            train: all.clone(),
            eval: all,
            held_out: false,
        };
    }

    let mut shuffled = all;
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n_eval = (n as f64 * TEST_FRACTION).ceil() as usize;
    let train = shuffled.split_off(n_eval);
    Split {
        train,
        eval: shuffled,
        held_out: true,
    }
}

fn select(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    indices.iter().map(|&i| (x[i].clone(), y[i])).unzip()
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    total / actual.len() as f64
}

/// Coefficient of determination. A constant target scores 1.0 when predicted
/// perfectly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot <= f64::EPSILON {
        if ss_res <= f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}
