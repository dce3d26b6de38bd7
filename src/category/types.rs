//! Category usage types
//!
//! Types for the per-category hours vector, the three coaching actions, and the
//! classifier's outputs.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of usage categories, which is also the model input width
pub const CATEGORY_COUNT: usize = 10;

/// Number of coaching actions, which is also the model output width
pub const ACTION_COUNT: usize = 3;

/// Closed set of app usage categories, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageCategory {
    SocialMedia,
    Entertainment,
    Gaming,
    Browsing,
    Education,
    Productivity,
    Communication,
    Shopping,
    HealthFitness,
    News,
}

impl UsageCategory {
    pub const ALL: [UsageCategory; CATEGORY_COUNT] = [
        UsageCategory::SocialMedia,
        UsageCategory::Entertainment,
        UsageCategory::Gaming,
        UsageCategory::Browsing,
        UsageCategory::Education,
        UsageCategory::Productivity,
        UsageCategory::Communication,
        UsageCategory::Shopping,
        UsageCategory::HealthFitness,
        UsageCategory::News,
    ];

    /// Position in [`UsageCategory::ALL`] and in the feature vector
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UsageCategory::SocialMedia => "social_media",
            UsageCategory::Entertainment => "entertainment",
            UsageCategory::Gaming => "gaming",
            UsageCategory::Browsing => "browsing",
            UsageCategory::Education => "education",
            UsageCategory::Productivity => "productivity",
            UsageCategory::Communication => "communication",
            UsageCategory::Shopping => "shopping",
            UsageCategory::HealthFitness => "health_fitness",
            UsageCategory::News => "news",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UsageCategory::SocialMedia => "Social Media",
            UsageCategory::Entertainment => "Entertainment",
            UsageCategory::Gaming => "Gaming",
            UsageCategory::Browsing => "Browsing",
            UsageCategory::Education => "Education",
            UsageCategory::Productivity => "Productivity",
            UsageCategory::Communication => "Communication",
            UsageCategory::Shopping => "Shopping",
            UsageCategory::HealthFitness => "Health & Fitness",
            UsageCategory::News => "News",
        }
    }
}

/// Hours spent per category over one day.
///
/// Missing keys deserialize as 0. Every value must be finite and
/// non-negative; [`CategoryUsage::from_json`] enforces this. The total is not
/// bounded by the length of a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryUsage {
    pub social_media_hours: f64,
    pub entertainment_hours: f64,
    pub gaming_hours: f64,
    pub browsing_hours: f64,
    pub education_hours: f64,
    pub productivity_hours: f64,
    pub communication_hours: f64,
    pub shopping_hours: f64,
    pub health_fitness_hours: f64,
    pub news_hours: f64,
}

impl CategoryUsage {
    /// Build from a feature row in canonical order; missing entries are 0
    pub fn from_features(features: &[f64]) -> Self {
        let mut usage = Self::default();
        for (category, hours) in UsageCategory::ALL.iter().zip(features) {
            usage.set(*category, *hours);
        }
        usage
    }

    pub fn get(&self, category: UsageCategory) -> f64 {
        match category {
            UsageCategory::SocialMedia => self.social_media_hours,
            UsageCategory::Entertainment => self.entertainment_hours,
            UsageCategory::Gaming => self.gaming_hours,
            UsageCategory::Browsing => self.browsing_hours,
            UsageCategory::Education => self.education_hours,
            UsageCategory::Productivity => self.productivity_hours,
            UsageCategory::Communication => self.communication_hours,
            UsageCategory::Shopping => self.shopping_hours,
            UsageCategory::HealthFitness => self.health_fitness_hours,
            UsageCategory::News => self.news_hours,
        }
    }

    pub fn set(&mut self, category: UsageCategory, hours: f64) {
        let slot = match category {
            UsageCategory::SocialMedia => &mut self.social_media_hours,
            UsageCategory::Entertainment => &mut self.entertainment_hours,
            UsageCategory::Gaming => &mut self.gaming_hours,
            UsageCategory::Browsing => &mut self.browsing_hours,
            UsageCategory::Education => &mut self.education_hours,
            UsageCategory::Productivity => &mut self.productivity_hours,
            UsageCategory::Communication => &mut self.communication_hours,
            UsageCategory::Shopping => &mut self.shopping_hours,
            UsageCategory::HealthFitness => &mut self.health_fitness_hours,
            UsageCategory::News => &mut self.news_hours,
        };
        *slot = hours;
    }

    /// Parse a usage object and reject negative or non-finite hours
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let usage: Self = serde_json::from_str(json)?;
        usage.validate()?;
        Ok(usage)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for category in UsageCategory::ALL {
            let hours = self.get(category);
            if !hours.is_finite() || hours < 0.0 {
                return Err(AnalysisError::InvalidUsage(format!(
                    "{} hours must be a non-negative number, got {hours}",
                    category.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn total_hours(&self) -> f64 {
        UsageCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Category with the most hours; ties go to the earliest canonical category
    pub fn top_category(&self) -> (UsageCategory, f64) {
        UsageCategory::ALL
            .iter()
            .map(|c| (*c, self.get(*c)))
            .fold((UsageCategory::SocialMedia, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            })
    }

    /// Feature row in canonical category order
    pub fn as_features(&self) -> Vec<f64> {
        UsageCategory::ALL.iter().map(|c| self.get(*c)).collect()
    }
}

/// Coaching action predicted for a usage vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    NoChange,
    TakeBreaks,
    ReduceUsage,
}

impl UsageAction {
    pub const ALL: [UsageAction; ACTION_COUNT] = [
        UsageAction::NoChange,
        UsageAction::TakeBreaks,
        UsageAction::ReduceUsage,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            UsageAction::NoChange => "no_change",
            UsageAction::TakeBreaks => "take_breaks",
            UsageAction::ReduceUsage => "reduce_usage",
        }
    }
}

/// Templated advice attached to a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub message: String,
    pub tips: Vec<String>,
}

/// Output of [`crate::category::CategoryClassifier::predict`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub class_index: usize,
    pub action: UsageAction,
    pub confidence: f64,
    pub probabilities: BTreeMap<UsageAction, f64>,
    pub suggestion: Suggestion,
    /// Set when the deterministic baseline rule produced the result
    pub baseline: bool,
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub samples: usize,
    pub epochs: usize,
    pub final_loss: f64,
    pub accuracy: f64,
}

/// Result of loading a persisted model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
}
