//! Core data types for the usage analysis pipeline
//!
//! Records flow in as [`UsageRecord`]s and leave as a single immutable
//! [`AnalysisResult`]. Field names serialize to the camelCase document layout
//! consumed by the app and the report renderers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds in one hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Weekday names indexed by the 0 = Sunday convention
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// One day of device usage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Calendar date of the row
    pub date: NaiveDate,
    /// Total screen time in milliseconds
    #[serde(rename = "totalScreenTime")]
    pub total_screen_time_ms: u64,
    /// Number of distinct apps used
    pub app_count: u32,
    /// Day of week, 0 = Sunday
    pub day_of_week: u8,
    /// Weekend flag as reported by the producer
    pub is_weekend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_app_package: Option<String>,
    #[serde(rename = "topAppTime", default, skip_serializing_if = "Option::is_none")]
    pub top_app_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
}

impl UsageRecord {
    /// Screen time converted to hours
    pub fn screen_time_hours(&self) -> f64 {
        self.total_screen_time_ms as f64 / MS_PER_HOUR
    }
}

/// Provenance attached to every analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub report_id: Uuid,
    pub producer: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
}

/// Aggregate statistics over the whole dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_days: usize,
    pub avg_daily_screen_time: f64,
    pub max_daily_screen_time: f64,
    pub min_daily_screen_time: f64,
    pub avg_apps_per_day: f64,
    pub total_screen_time_hours: f64,
}

/// Mean daily hours split by weekday/weekend; a side without records is `None`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeekdayWeekend {
    pub weekday: Option<f64>,
    pub weekend: Option<f64>,
}

/// Mean hours for one day of the week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    pub day: String,
    pub day_of_week: u8,
    pub avg_screen_time_hours: f64,
}

/// Direction of usage over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        }
    }
}

/// How the trend was estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMethod {
    /// Least-squares slope against the day index
    LinearFit,
    /// Mean of the second half compared to the first half
    HalfSplit,
}

/// Output of the trend estimator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendReport {
    pub trend: Trend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<TrendMethod>,
    /// Hours per index step, only for [`TrendMethod::LinearFit`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_avg: Option<f64>,
    /// Latest value of the 3-day rolling mean
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_avg: Option<f64>,
}

impl TrendReport {
    pub fn insufficient() -> Self {
        Self {
            trend: Trend::InsufficientData,
            method: None,
            slope: None,
            recent_avg: None,
            overall_avg: None,
            rolling_avg: None,
        }
    }
}

/// Ordinal usage level derived from mean daily hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorClass {
    LightUser,
    ModerateUser,
    HeavyUser,
    ExcessiveUser,
}

impl BehaviorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorClass::LightUser => "light_user",
            BehaviorClass::ModerateUser => "moderate_user",
            BehaviorClass::HeavyUser => "heavy_user",
            BehaviorClass::ExcessiveUser => "excessive_user",
        }
    }

    /// Human-readable label, e.g. "Heavy User"
    pub fn display_name(&self) -> &'static str {
        match self {
            BehaviorClass::LightUser => "Light User",
            BehaviorClass::ModerateUser => "Moderate User",
            BehaviorClass::HeavyUser => "Heavy User",
            BehaviorClass::ExcessiveUser => "Excessive User",
        }
    }
}

/// Usage patterns section of the result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patterns {
    pub weekday_vs_weekend: WeekdayWeekend,
    pub daily_averages: Vec<DailyAverage>,
    pub trends: TrendReport,
    pub behavior_classification: BehaviorClass,
}

/// Qualitative label for the forecaster's R²
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Good,
    Fair,
    Poor,
}

impl FitQuality {
    /// `good` above 0.5, `fair` above 0.2, `poor` otherwise
    pub fn from_r2(r2: f64) -> Self {
        if r2 > 0.5 {
            FitQuality::Good
        } else if r2 > 0.2 {
            FitQuality::Fair
        } else {
            FitQuality::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitQuality::Good => "good",
            FitQuality::Fair => "fair",
            FitQuality::Poor => "poor",
        }
    }
}

/// Evaluation metrics of the forecast model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelPerformance {
    pub mean_absolute_error_hours: f64,
    pub r2_score: f64,
    pub accuracy: FitQuality,
    pub training_samples: usize,
    pub evaluation_samples: usize,
    /// False when the model was evaluated on its own training rows
    pub held_out_evaluation: bool,
}

/// One projected day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub predicted_screen_time_hours: f64,
    pub is_weekend: bool,
}

/// Successful forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub model_performance: ModelPerformance,
    pub next_7_days: Vec<ForecastDay>,
    pub weekly_prediction: f64,
}

/// Predictions section: a forecast, or the reason one could not be produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictionSection {
    Forecast(Forecast),
    Unavailable { error: String },
}

impl PredictionSection {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            PredictionSection::Forecast(forecast) => Some(forecast),
            PredictionSection::Unavailable { .. } => None,
        }
    }
}

/// Complete output of one `analyze` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub metadata: ReportMetadata,
    pub summary: Summary,
    pub patterns: Patterns,
    /// Absent when the dataset has fewer than 7 records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PredictionSection>,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a previously serialized result
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_time_hours() {
        let record = UsageRecord {
            date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            total_screen_time_ms: 14_400_000,
            app_count: 12,
            day_of_week: 3,
            is_weekend: false,
            top_app_package: None,
            top_app_time_ms: None,
            hour: None,
        };
        assert!((record.screen_time_hours() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_quality_bins() {
        assert_eq!(FitQuality::from_r2(0.9), FitQuality::Good);
        assert_eq!(FitQuality::from_r2(0.5), FitQuality::Fair);
        assert_eq!(FitQuality::from_r2(0.21), FitQuality::Fair);
        assert_eq!(FitQuality::from_r2(0.2), FitQuality::Poor);
        assert_eq!(FitQuality::from_r2(-3.0), FitQuality::Poor);
    }

    #[test]
    fn test_unavailable_predictions_serialize_as_error_object() {
        let section = PredictionSection::Unavailable {
            error: "Forecasting backend is not enabled".to_string(),
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["error"], "Forecasting backend is not enabled");

        let parsed: PredictionSection = serde_json::from_value(json).unwrap();
        assert!(parsed.forecast().is_none());
    }

    #[test]
    fn test_trend_serialization() {
        let report = TrendReport::insufficient();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["trend"], "insufficient_data");
        assert!(json.get("slope").is_none());
    }
}
