//! Pipeline orchestration
//!
//! This module provides the public analysis API. It runs a validated dataset
//! through every stage and assembles the result document.
//!
//! Stages: summary → weekday/weekend split → daily averages → trend →
//! behavior class → forecast → recommendations

use crate::config::AnalyzerConfig;
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::forecast::{Forecaster, MIN_FORECAST_RECORDS};
use crate::patterns::{classify_behavior, daily_averages, weekday_vs_weekend};
use crate::recommendations::RecommendationEngine;
use crate::summary::Summarizer;
use crate::trend::TrendEstimator;
use crate::types::{AnalysisResult, Patterns, PredictionSection, ReportMetadata};
use crate::{HABITGUARD_VERSION, PRODUCER_NAME};
use chrono::{Local, NaiveDate, Utc};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Analyze CSV text with the default configuration.
///
/// # Example
/// ```ignore
/// let result = analyze_usage_csv(&std::fs::read_to_string("usage.csv")?)?;
/// println!("{}", result.to_json()?);
/// ```
pub fn analyze_usage_csv(csv: &str) -> Result<AnalysisResult, AnalysisError> {
    UsageAnalyzer::default().analyze_csv(csv)
}

/// Screen time analyzer.
///
/// Holds no mutable state, so one instance can serve any number of datasets
/// and threads.
pub struct UsageAnalyzer {
    config: AnalyzerConfig,
    trend: TrendEstimator,
    forecaster: Forecaster,
}

impl Default for UsageAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl UsageAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let trend = TrendEstimator::new(config.capabilities.trend_fitting);
        let forecaster = Forecaster::new(config.forecast.clone(), config.capabilities.forecaster);
        Self {
            config,
            trend,
            forecaster,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze with forecasts starting at today's local date
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_at(dataset, Local::now().date_naive())
    }

    /// Analyze with forecasts starting at `today`
    pub fn analyze_at(
        &self,
        dataset: &Dataset,
        today: NaiveDate,
    ) -> Result<AnalysisResult, AnalysisError> {
        let summary = Summarizer::summarize(dataset)?;
        debug!(days = summary.total_days, "Summary computed");

        let split = weekday_vs_weekend(dataset);
        let trends = self.trend.estimate(dataset);
        let behavior = classify_behavior(summary.avg_daily_screen_time);

        let predictions = if dataset.len() < MIN_FORECAST_RECORDS {
            debug!(records = dataset.len(), "Skipping forecast");
            None
        } else {
            match self.forecaster.forecast(dataset, today) {
                Ok(forecast) => Some(PredictionSection::Forecast(forecast)),
                Err(e) => {
                    warn!(error = %e, "Forecast unavailable");
                    Some(PredictionSection::Unavailable {
                        error: e.to_string(),
                    })
                }
            }
        };

        let recommendations = RecommendationEngine::generate(behavior, &split, trends.trend);

        info!(
            days = summary.total_days,
            behavior = behavior.as_str(),
            trend = trends.trend.as_str(),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            metadata: new_metadata(),
            summary,
            patterns: Patterns {
                weekday_vs_weekend: split,
                daily_averages: daily_averages(dataset),
                trends,
                behavior_classification: behavior,
            },
            predictions,
            recommendations,
        })
    }

    /// Parse and analyze CSV text
    pub fn analyze_csv(&self, csv: &str) -> Result<AnalysisResult, AnalysisError> {
        let dataset = Dataset::from_csv_str(csv)?;
        self.analyze(&dataset)
    }

    /// Load and analyze a CSV file
    pub fn analyze_path(&self, path: impl AsRef<Path>) -> Result<AnalysisResult, AnalysisError> {
        let dataset = Dataset::from_path(path)?;
        self.analyze(&dataset)
    }
}

fn new_metadata() -> ReportMetadata {
    ReportMetadata {
        report_id: Uuid::new_v4(),
        producer: PRODUCER_NAME.to_string(),
        version: HABITGUARD_VERSION.to_string(),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capabilities;
    use crate::dataset::SAMPLE_CSV;
    use crate::recommendations::{TRENDING_UP, WEEKEND_HEAVY};
    use crate::types::{BehaviorClass, Trend, TrendMethod};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 8).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_csv_str(SAMPLE_CSV).unwrap()
    }

    #[test]
    fn test_smoke_dataset_end_to_end() {
        let result = UsageAnalyzer::default().analyze_at(&sample(), today()).unwrap();

        assert_eq!(result.summary.total_days, 7);
        assert!((result.summary.avg_daily_screen_time - 35.5 / 7.0).abs() < 1e-9);
        assert_eq!(result.patterns.behavior_classification, BehaviorClass::HeavyUser);
        assert_eq!(result.patterns.trends.trend, Trend::Increasing);

        assert_eq!(result.recommendations.len(), 5);
        assert_eq!(result.recommendations[3], WEEKEND_HEAVY);
        assert_eq!(result.recommendations[4], TRENDING_UP);

        let forecast = result.predictions.as_ref().and_then(|p| p.forecast()).unwrap();
        assert_eq!(forecast.next_7_days.len(), 7);
        assert_eq!(forecast.next_7_days[0].date, today());
        assert!(forecast
            .next_7_days
            .iter()
            .all(|d| d.predicted_screen_time_hours >= 0.0));
        assert!(!forecast.model_performance.held_out_evaluation);

        assert_eq!(result.metadata.producer, PRODUCER_NAME);
        assert_eq!(result.metadata.version, HABITGUARD_VERSION);
    }

    #[test]
    fn test_no_predictions_below_seven_records() {
        let csv: String = SAMPLE_CSV.lines().take(6).collect::<Vec<_>>().join("\n");
        let dataset = Dataset::from_csv_str(&csv).unwrap();
        assert_eq!(dataset.len(), 5);

        let result = UsageAnalyzer::default().analyze_at(&dataset, today()).unwrap();
        assert_eq!(result.predictions, None);
        assert!(!result.recommendations.is_empty());

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert!(json.get("predictions").is_none());
    }

    #[test]
    fn test_disabled_forecaster_is_recorded_not_fatal() {
        let config = AnalyzerConfig::default().with_capabilities(Capabilities {
            forecaster: false,
            ..Capabilities::default()
        });
        let result = UsageAnalyzer::new(config).analyze_at(&sample(), today()).unwrap();

        match result.predictions {
            Some(PredictionSection::Unavailable { error }) => {
                assert_eq!(error, AnalysisError::ForecasterUnavailable.to_string());
            }
            other => panic!("expected unavailable predictions, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_capabilities_use_half_split() {
        let config = AnalyzerConfig::default().with_capabilities(Capabilities::minimal());
        let result = UsageAnalyzer::new(config).analyze_at(&sample(), today()).unwrap();
        assert_eq!(result.patterns.trends.method, Some(TrendMethod::HalfSplit));
    }

    #[test]
    fn test_json_round_trip() {
        let result = UsageAnalyzer::default().analyze_at(&sample(), today()).unwrap();
        let json = result.to_json().unwrap();
        let parsed = AnalysisResult::from_json(&json).unwrap();

        assert_eq!(parsed.summary.total_days, result.summary.total_days);
        assert!(
            (parsed.summary.avg_daily_screen_time - result.summary.avg_daily_screen_time).abs()
                < 1e-9
        );
        assert_eq!(parsed.recommendations, result.recommendations);
        assert_eq!(parsed.metadata.report_id, result.metadata.report_id);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["totalDays"], 7);
        assert_eq!(value["patterns"]["behaviorClassification"], "heavy_user");
        assert_eq!(
            value["predictions"]["next_7_days"].as_array().map(|d| d.len()),
            Some(7)
        );
    }

    #[test]
    fn test_unsorted_input_matches_sorted() {
        let mut lines: Vec<&str> = SAMPLE_CSV.lines().collect();
        let header = lines.remove(0);
        lines.reverse();
        let shuffled = std::iter::once(header)
            .chain(lines)
            .collect::<Vec<_>>()
            .join("\n");

        let analyzer = UsageAnalyzer::default();
        let a = analyzer.analyze_at(&sample(), today()).unwrap();
        let b = analyzer
            .analyze_at(&Dataset::from_csv_str(&shuffled).unwrap(), today())
            .unwrap();

        assert_eq!(a.summary, b.summary);
        assert_eq!(a.patterns, b.patterns);
        assert_eq!(a.recommendations, b.recommendations);
        assert_eq!(a.predictions, b.predictions);
    }

    #[test]
    fn test_analyzer_is_deterministic() {
        let analyzer = UsageAnalyzer::default();
        let a = analyzer.analyze_at(&sample(), today()).unwrap();
        let b = analyzer.analyze_at(&sample(), today()).unwrap();
        assert_eq!(a.predictions, b.predictions);
        assert_ne!(a.metadata.report_id, b.metadata.report_id);
    }

    #[test]
    fn test_analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UsageAnalyzer>();
    }

    #[test]
    fn test_missing_columns_surface_as_error() {
        let result = analyze_usage_csv("date,appCount\n2025-10-01,3");
        assert!(matches!(result, Err(AnalysisError::MissingColumns(_))));
    }
}
