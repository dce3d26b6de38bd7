//! Usage trend estimation
//!
//! Two estimators with deliberately different thresholds:
//!
//! - **Linear fit**: least-squares slope of daily hours against the day index
//!   (0..n-1, calendar gaps ignored). `> 0.1` h/step is increasing, `< -0.1` is
//!   decreasing.
//! - **Half split**: mean of the second half against the first half, ±10%.
//!
//! Results from the two methods are not comparable and are labeled with the
//! method that produced them.

use crate::dataset::Dataset;
use crate::summary::mean;
use crate::types::{Trend, TrendMethod, TrendReport};
use tracing::debug;

/// Minimum records before a trend is estimated
pub const MIN_TREND_RECORDS: usize = 3;

/// Slope threshold in hours per index step
const SLOPE_THRESHOLD: f64 = 0.1;

/// Relative threshold of the half-split heuristic
const HALF_SPLIT_RATIO: f64 = 0.1;

/// Records averaged into `recent_avg`
const RECENT_WINDOW: usize = 7;

/// Window of the rolling mean
const ROLLING_WINDOW: usize = 3;

/// Trend estimator
pub struct TrendEstimator {
    use_linear_fit: bool,
}

impl TrendEstimator {
    /// `use_linear_fit = false` selects the half-split heuristic
    pub fn new(use_linear_fit: bool) -> Self {
        Self { use_linear_fit }
    }

    /// Estimate the trend of a dataset, sorting it by date first
    pub fn estimate(&self, dataset: &Dataset) -> TrendReport {
        let hours: Vec<f64> = dataset
            .sorted_by_date()
            .iter()
            .map(|r| r.screen_time_hours())
            .collect();
        self.estimate_series(&hours)
    }

    /// Estimate the trend of an already time-ordered series
    pub fn estimate_series(&self, hours: &[f64]) -> TrendReport {
        if hours.len() < MIN_TREND_RECORDS {
            debug!(records = hours.len(), "Too few records for a trend");
            return TrendReport::insufficient();
        }

        let (trend, method, slope) = if self.use_linear_fit {
            let slope = least_squares_slope(hours);
            (classify_slope(slope), TrendMethod::LinearFit, Some(slope))
        } else {
            (half_split_trend(hours), TrendMethod::HalfSplit, None)
        };

        let recent_start = hours.len().saturating_sub(RECENT_WINDOW);

        TrendReport {
            trend,
            method: Some(method),
            slope,
            recent_avg: mean(&hours[recent_start..]),
            overall_avg: mean(hours),
            rolling_avg: rolling_mean(hours, ROLLING_WINDOW).last().copied(),
        }
    }
}

/// Ordinary least-squares slope of `y` against `x = 0..n-1`
fn least_squares_slope(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n;

    let (num, den) = y
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &yi)| {
            let dx = i as f64 - x_mean;
            (num + dx * (yi - y_mean), den + dx * dx)
        });

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn classify_slope(slope: f64) -> Trend {
    if slope > SLOPE_THRESHOLD {
        Trend::Increasing
    } else if slope < -SLOPE_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Compare halves split at `n / 2`; for odd `n` the middle value joins the second half
fn half_split_trend(hours: &[f64]) -> Trend {
    let mid = hours.len() / 2;
    let (Some(first), Some(second)) = (mean(&hours[..mid]), mean(&hours[mid..])) else {
        return Trend::Stable;
    };

    if second > first * (1.0 + HALF_SPLIT_RATIO) {
        Trend::Increasing
    } else if second < first * (1.0 - HALF_SPLIT_RATIO) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Trailing rolling mean; the first values use however many points exist
fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
