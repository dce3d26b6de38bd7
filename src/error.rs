//! Error types for HabitGuard

use thiserror::Error;

/// Errors that can occur while loading, analyzing, or persisting usage data
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No data available for analysis")]
    EmptyDataset,

    #[error("Insufficient data: need at least {required} records, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Forecasting backend is not enabled")]
    ForecasterUnavailable,

    #[error("Invalid category usage: {0}")]
    InvalidUsage(String),

    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),

    #[error("Model error: {0}")]
    ModelError(String),
}
