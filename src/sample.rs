//! Synthetic usage exports
//!
//! Generates plausible daily usage for demos and manual testing, and writes
//! records back out in the app's CSV export layout.

use crate::error::AnalysisError;
use crate::forecast::sunday_based_weekday;
use crate::types::{UsageRecord, MS_PER_HOUR};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::Write;

const SAMPLE_APPS: [&str; 5] = [
    "com.instagram.android",
    "com.whatsapp",
    "com.google.android.youtube",
    "com.android.chrome",
    "com.spotify.music",
];

/// Column order of the export
pub const CSV_HEADER: [&str; 8] = [
    "date",
    "hour",
    "totalScreenTime",
    "topAppPackage",
    "topAppTime",
    "appCount",
    "dayOfWeek",
    "isWeekend",
];

/// `days` consecutive days ending the day before `today`.
///
/// Base usage is a whole number of hours in 2..=8, scaled by 1.2-1.8 on
/// weekends. The top app takes 20-40% of the day's screen time.
pub fn generate_sample_records(days: usize, today: NaiveDate, seed: u64) -> Vec<UsageRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = today - Duration::days(days as i64);

    (0..days as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let day_of_week = sunday_based_weekday(date);
            let is_weekend = day_of_week == 0 || day_of_week == 6;

            let mut total = rng.gen_range(2..=8u32) as f64 * MS_PER_HOUR;
            if is_weekend {
                total *= rng.gen_range(1.2..1.8);
            }
            let total_screen_time_ms = total as u64;
            let app_count = rng.gen_range(5..=20u32);
            let top_app_time_ms = (total * rng.gen_range(0.2..0.4)) as u64;
            let top_app_package = SAMPLE_APPS.choose(&mut rng).map(|s| s.to_string());

            UsageRecord {
                date,
                total_screen_time_ms,
                app_count,
                day_of_week,
                is_weekend,
                top_app_package,
                top_app_time_ms: Some(top_app_time_ms),
                hour: Some(rng.gen_range(9..=23u8)),
            }
        })
        .collect()
}

/// Write records in the export layout, header first
pub fn write_csv<W: Write>(records: &[UsageRecord], writer: W) -> Result<(), AnalysisError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for r in records {
        wtr.write_record([
            r.date.to_string(),
            r.hour.map(|h| h.to_string()).unwrap_or_default(),
            r.total_screen_time_ms.to_string(),
            r.top_app_package.clone().unwrap_or_default(),
            r.top_app_time_ms.map(|t| t.to_string()).unwrap_or_default(),
            r.app_count.to_string(),
            r.day_of_week.to_string(),
            r.is_weekend.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
