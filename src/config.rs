//! Analyzer configuration
//!
//! Optional components are switched on and off explicitly here instead of being
//! detected at runtime. A config can be built in code or loaded from TOML.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the persisted category model
pub const DEFAULT_MODEL_PATH: &str = "habitguard_category_model.json";

/// Default seed for every randomized step (split, bootstrap, synthetic data)
pub const DEFAULT_SEED: u64 = 42;

/// Default number of trees in the forecast ensemble
pub const DEFAULT_ESTIMATORS: usize = 100;

/// Default line budget per page of the paginated report
pub const DEFAULT_PAGE_LINES: usize = 40;

/// Which optional components are available to the analyzer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Capabilities {
    /// Least-squares trend fitting; when off the half-split heuristic is used
    pub trend_fitting: bool,
    /// Random-forest forecaster
    pub forecaster: bool,
    /// Learned category classifier; when off predictions use the baseline rule
    pub category_model: bool,
    /// Paginated document renderer
    pub paged_report: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            trend_fitting: true,
            forecaster: true,
            category_model: true,
            paged_report: true,
        }
    }
}

impl Capabilities {
    /// Every optional component disabled
    pub fn minimal() -> Self {
        Self {
            trend_fitting: false,
            forecaster: false,
            category_model: false,
            paged_report: false,
        }
    }
}

/// Forecaster tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForecastConfig {
    pub seed: u64,
    pub estimators: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            estimators: DEFAULT_ESTIMATORS,
        }
    }
}

/// Top-level analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub capabilities: Capabilities,
    pub forecast: ForecastConfig,
    /// Where the category model is loaded from and saved to
    pub model_path: PathBuf,
    /// Lines per page for the paginated report
    pub page_lines: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            forecast: ForecastConfig::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            page_lines: DEFAULT_PAGE_LINES,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, AnalysisError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Builder-style override of the model location
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Builder-style override of the capability set
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let config = AnalyzerConfig::default();
        assert!(config.capabilities.trend_fitting);
        assert!(config.capabilities.forecaster);
        assert_eq!(config.forecast.estimators, 100);
        assert_eq!(config.forecast.seed, 42);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyzerConfig::from_toml(
            r#"
            model_path = "/tmp/model.json"

            [capabilities]
            forecaster = false
            "#,
        )
        .unwrap();

        assert!(!config.capabilities.forecaster);
        assert!(config.capabilities.trend_fitting);
        assert_eq!(config.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(config.forecast.estimators, DEFAULT_ESTIMATORS);
        assert_eq!(config.page_lines, DEFAULT_PAGE_LINES);
    }

    #[test]
    fn test_invalid_toml() {
        let result = AnalyzerConfig::from_toml("capabilities = 3");
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }
}
