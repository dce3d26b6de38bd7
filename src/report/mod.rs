//! Report rendering
//!
//! Renders an [`AnalysisResult`] as JSON, plain text, or a paginated text
//! document. Renderers only read the result.

pub mod paged;
pub mod text;

pub use paged::{paginate, render_paged};
pub use text::{render_text, text_lines};

use crate::error::AnalysisError;
use crate::types::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Json,
    Text,
    Paged,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
            ReportFormat::Paged => "paged",
        }
    }

    /// File suffix appended to a report base name
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ReportFormat::Json => ".json",
            ReportFormat::Text => ".txt",
            ReportFormat::Paged => ".pages.txt",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            "paged" | "pages" => Ok(ReportFormat::Paged),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

/// Render a result in the given format
pub fn render(
    result: &AnalysisResult,
    format: ReportFormat,
    page_lines: usize,
) -> Result<String, AnalysisError> {
    Ok(match format {
        ReportFormat::Json => result.to_json()?,
        ReportFormat::Text => render_text(result),
        ReportFormat::Paged => render_paged(result, page_lines),
    })
}

/// Render into any writer
pub fn write_report<W: Write>(
    result: &AnalysisResult,
    format: ReportFormat,
    page_lines: usize,
    mut writer: W,
) -> Result<(), AnalysisError> {
    let rendered = render(result, format, page_lines)?;
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write `<base><suffix>` and return the path written
pub fn save_report(
    result: &AnalysisResult,
    format: ReportFormat,
    page_lines: usize,
    base: &Path,
) -> Result<PathBuf, AnalysisError> {
    let mut name = base.as_os_str().to_owned();
    name.push(format.file_suffix());
    let path = PathBuf::from(name);

    let file = fs::File::create(&path)?;
    write_report(result, format, page_lines, file)?;
    info!(path = %path.display(), format = format.as_str(), "Report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, SAMPLE_CSV};
    use crate::pipeline::UsageAnalyzer;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_result() -> AnalysisResult {
        let dataset = Dataset::from_csv_str(SAMPLE_CSV).unwrap();
        UsageAnalyzer::default()
            .analyze_at(&dataset, NaiveDate::from_ymd_opt(2025, 10, 8).unwrap())
            .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("TXT".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert_eq!("paged".parse::<ReportFormat>(), Ok(ReportFormat::Paged));
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_json_render_parses_back() {
        let result = sample_result();
        let json = render(&result, ReportFormat::Json, 40).unwrap();
        let parsed = AnalysisResult::from_json(&json).unwrap();
        assert_eq!(parsed.recommendations, result.recommendations);
    }

    #[test]
    fn test_save_report_writes_each_format() {
        let result = sample_result();
        let dir = tempdir().unwrap();
        let base = dir.path().join("habitguard_report");

        for format in [ReportFormat::Json, ReportFormat::Text, ReportFormat::Paged] {
            let path = save_report(&result, format, 40, &base).unwrap();
            assert!(path.to_string_lossy().ends_with(format.file_suffix()));
            let written = fs::read_to_string(&path).unwrap();
            assert_eq!(written, render(&result, format, 40).unwrap());
        }
    }

    #[test]
    fn test_write_failure_is_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let result = sample_result();
        assert!(matches!(
            write_report(&result, ReportFormat::Text, 40, Broken),
            Err(AnalysisError::Io(_))
        ));
    }
}
