//! Descriptive statistics over a usage dataset

use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::types::Summary;

/// Summarizer for whole-dataset aggregates
pub struct Summarizer;

impl Summarizer {
    /// Compute count, mean/max/min/sum of daily hours and mean app count.
    ///
    /// Plain arithmetic means over every record; no outlier removal.
    pub fn summarize(dataset: &Dataset) -> Result<Summary, AnalysisError> {
        let records = dataset.records();
        if records.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let n = records.len() as f64;
        let hours: Vec<f64> = records.iter().map(|r| r.screen_time_hours()).collect();
        let total: f64 = hours.iter().sum();
        let max = hours.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = hours.iter().copied().fold(f64::INFINITY, f64::min);
        let apps: f64 = records.iter().map(|r| r.app_count as f64).sum();

        Ok(Summary {
            total_days: records.len(),
            avg_daily_screen_time: total / n,
            max_daily_screen_time: max,
            min_daily_screen_time: min,
            avg_apps_per_day: apps / n,
            total_screen_time_hours: total,
        })
    }
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
