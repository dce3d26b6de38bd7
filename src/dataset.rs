//! Usage dataset loading and validation
//!
//! Parses the app's daily CSV export into typed [`UsageRecord`]s. Required
//! columns are checked up front; rows whose numeric fields cannot be coerced
//! are dropped and counted rather than failing the whole load.

use crate::error::AnalysisError;
use crate::types::UsageRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every usage export must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "date",
    "totalScreenTime",
    "appCount",
    "dayOfWeek",
    "isWeekend",
];

/// Counters describing what happened during a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub invalid_rows: usize,
    pub duplicate_rows: usize,
}

/// A validated single-user time series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<UsageRecord>,
    stats: LoadStats,
}

impl Dataset {
    /// Build a dataset from already-typed records.
    ///
    /// Later records whose date was already seen are dropped (keep-first).
    pub fn from_records(records: Vec<UsageRecord>) -> Self {
        let rows_read = records.len();
        let mut seen = HashSet::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        let mut duplicate_rows = 0;

        for record in records {
            if seen.insert(record.date) {
                kept.push(record);
            } else {
                warn!(date = %record.date, "Dropping duplicate date (first row wins)");
                duplicate_rows += 1;
            }
        }

        Self {
            records: kept,
            stats: LoadStats {
                rows_read,
                invalid_rows: 0,
                duplicate_rows,
            },
        }
    }

    /// Parse CSV text
    pub fn from_csv_str(csv: &str) -> Result<Self, AnalysisError> {
        Self::from_reader(csv.as_bytes())
    }

    /// Parse a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading usage data");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV from any reader. A header row is required.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = ColumnIndex::resolve(&headers)?;

        let mut records = Vec::new();
        let mut rows_read = 0;
        let mut invalid_rows = 0;

        for result in rdr.records() {
            let row = result?;
            rows_read += 1;
            match columns.parse_row(&row) {
                Some(record) => records.push(record),
                None => {
                    debug!(line = rows_read + 1, "Dropping row with invalid values");
                    invalid_rows += 1;
                }
            }
        }

        let mut dataset = Self::from_records(records);
        dataset.stats.rows_read = rows_read;
        dataset.stats.invalid_rows = invalid_rows;

        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        info!(
            records = dataset.len(),
            invalid = invalid_rows,
            duplicates = dataset.stats.duplicate_rows,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by ascending date
    pub fn sorted_by_date(&self) -> Vec<&UsageRecord> {
        let mut sorted: Vec<&UsageRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.date);
        sorted
    }

    /// Earliest date in the dataset
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).min()
    }

    /// Mean app count, 0 for an empty dataset
    pub fn mean_app_count(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.records.iter().map(|r| r.app_count as f64).sum();
        sum / self.records.len() as f64
    }
}

/// Positions of the known columns inside a header row
struct ColumnIndex {
    date: usize,
    total_screen_time: usize,
    app_count: usize,
    day_of_week: usize,
    is_weekend: usize,
    top_app_package: Option<usize>,
    top_app_time: Option<usize>,
    hour: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, AnalysisError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingColumns(missing));
        }

        let required = |name: &str| {
            find(name).ok_or_else(|| AnalysisError::MissingColumns(vec![name.to_string()]))
        };

        Ok(Self {
            date: required("date")?,
            total_screen_time: required("totalScreenTime")?,
            app_count: required("appCount")?,
            day_of_week: required("dayOfWeek")?,
            is_weekend: required("isWeekend")?,
            top_app_package: find("topAppPackage"),
            top_app_time: find("topAppTime"),
            hour: find("hour"),
        })
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<UsageRecord> {
        let date = parse_date(row.get(self.date)?)?;
        let total_screen_time_ms = parse_count(row.get(self.total_screen_time)?)?;
        let app_count = u32::try_from(parse_count(row.get(self.app_count)?)?).ok()?;

        let day_of_week = row
            .get(self.day_of_week)
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|d| *d <= 6)?;

        let is_weekend = row
            .get(self.is_weekend)
            .and_then(parse_bool)
            .unwrap_or(day_of_week == 0 || day_of_week == 6);

        let top_app_package = self
            .top_app_package
            .and_then(|i| row.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let top_app_time_ms = self
            .top_app_time
            .and_then(|i| row.get(i))
            .and_then(parse_count);
        let hour = self
            .hour
            .and_then(|i| row.get(i))
            .and_then(|v| v.parse::<u8>().ok());

        Some(UsageRecord {
            date,
            total_screen_time_ms,
            app_count,
            day_of_week,
            is_weekend,
            top_app_package,
            top_app_time_ms,
            hour,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component
fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split(['T', ' ']).next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Non-negative integer, tolerating float notation such as `14400000.0`
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 {
        Some(f.round() as u64)
    } else {
        None
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}

/// The seven-day export used as the smoke-test dataset
pub const SAMPLE_CSV: &str = "date,hour,totalScreenTime,topAppPackage,topAppTime,appCount,dayOfWeek,isWeekend
2025-10-01,10,14400000,com.instagram.android,7200000,12,2,false
2025-10-02,11,16200000,com.whatsapp,8100000,15,3,false
2025-10-03,12,10800000,com.google.android.youtube,5400000,8,4,false
2025-10-04,13,19800000,com.android.chrome,9900000,18,5,false
2025-10-05,14,25200000,com.instagram.android,12600000,22,6,true
2025-10-06,15,28800000,com.spotify.music,14400000,25,0,true
2025-10-07,16,12600000,com.whatsapp,6300000,10,1,false";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample() {
        let dataset = Dataset::from_csv_str(SAMPLE_CSV).unwrap();
        assert_eq!(dataset.len(), 7);
        assert_eq!(dataset.stats().rows_read, 7);
        assert_eq!(dataset.stats().invalid_rows, 0);

        let first = &dataset.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(first.total_screen_time_ms, 14_400_000);
        assert_eq!(first.top_app_package.as_deref(), Some("com.instagram.android"));
        assert_eq!(first.top_app_time_ms, Some(7_200_000));
        assert_eq!(first.hour, Some(10));
        assert!(dataset.records()[4].is_weekend);
    }

    #[test]
    fn test_missing_columns_are_named() {
        let csv = "date,totalScreenTime,dayOfWeek\n2025-10-01,1000,2";
        match Dataset::from_csv_str(csv) {
            Err(AnalysisError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["appCount".to_string(), "isWeekend".to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numeric_rows_dropped() {
        let csv = "date,totalScreenTime,appCount,dayOfWeek,isWeekend
2025-10-01,abc,12,3,false
2025-10-02,3600000,,4,false
2025-10-03,7200000,9,5,false
2025-10-04,-5,9,6,true";
        let dataset = Dataset::from_csv_str(csv).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.stats().invalid_rows, 3);
        assert_eq!(dataset.records()[0].app_count, 9);
    }

    #[test]
    fn test_all_rows_invalid_is_empty_error() {
        let csv = "date,totalScreenTime,appCount,dayOfWeek,isWeekend\n2025-10-01,x,y,3,false";
        assert!(matches!(
            Dataset::from_csv_str(csv),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn test_duplicate_dates_keep_first() {
        let csv = "date,totalScreenTime,appCount,dayOfWeek,isWeekend
2025-10-01,3600000,5,3,false
2025-10-01,7200000,9,3,false
2025-10-02,3600000,5,4,false";
        let dataset = Dataset::from_csv_str(csv).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.stats().duplicate_rows, 1);
        assert_eq!(dataset.records()[0].total_screen_time_ms, 3_600_000);
    }

    #[test]
    fn test_weekend_flag_fallback_to_day_of_week() {
        let csv = "date,totalScreenTime,appCount,dayOfWeek,isWeekend
2025-10-05,3600000,5,0,maybe
2025-10-06,3600000,5,1,";
        let dataset = Dataset::from_csv_str(csv).unwrap();
        assert!(dataset.records()[0].is_weekend);
        assert!(!dataset.records()[1].is_weekend);
    }

    #[test]
    fn test_sorted_by_date_and_helpers() {
        let csv = "date,totalScreenTime,appCount,dayOfWeek,isWeekend
2025-10-03,3600000,4,5,false
2025-10-01,3600000,8,3,false
2025-10-02,3600000,6,4,false";
        let dataset = Dataset::from_csv_str(csv).unwrap();
        let sorted = dataset.sorted_by_date();
        assert_eq!(sorted[0].date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(sorted[2].date, NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
        assert_eq!(dataset.start_date(), NaiveDate::from_ymd_opt(2025, 10, 1));
        assert!((dataset.mean_app_count() - 6.0).abs() < 1e-12);
    }
}
