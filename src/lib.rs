//! HabitGuard - Screen time analytics engine
//!
//! HabitGuard turns a daily device-usage export into a usage report through a
//! deterministic pipeline: dataset validation → summary → patterns and trend
//! → forecast → recommendations.
//!
//! ## Modules
//!
//! - **Usage Pipeline**: Analyze a CSV time series into an [`AnalysisResult`]
//! - **Category Module**: Classify per-category usage into coaching actions
//!   and check it against the student usage policy

pub mod category;
pub mod config;
pub mod dataset;
pub mod error;
pub mod forecast;
pub mod patterns;
pub mod pipeline;
pub mod policy;
pub mod recommendations;
pub mod report;
pub mod sample;
pub mod summary;
pub mod trend;
pub mod types;

pub use config::{AnalyzerConfig, Capabilities};
pub use dataset::Dataset;
pub use error::AnalysisError;
pub use pipeline::{analyze_usage_csv, UsageAnalyzer};
pub use types::AnalysisResult;

// Category exports
pub use category::{CategoryClassifier, CategoryUsage, ClassificationResult, UsageAction};
pub use policy::{PolicyCheck, PolicyChecker};

/// HabitGuard version embedded in every report
pub const HABITGUARD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report metadata
pub const PRODUCER_NAME: &str = "habitguard";
