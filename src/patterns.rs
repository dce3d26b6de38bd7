//! Usage pattern extraction and behavior classification

use crate::dataset::Dataset;
use crate::summary::mean;
use crate::types::{BehaviorClass, DailyAverage, WeekdayWeekend, DAY_NAMES};

/// Upper bound (exclusive) of the light tier in hours/day
const LIGHT_MAX_HOURS: f64 = 2.0;
/// Upper bound (exclusive) of the moderate tier
const MODERATE_MAX_HOURS: f64 = 4.0;
/// Upper bound (exclusive) of the heavy tier
const HEAVY_MAX_HOURS: f64 = 6.0;

/// Map mean daily hours to a usage tier.
///
/// Bins are left-closed/right-open with no hysteresis, so a mean sitting on a
/// boundary flips tier on any small change.
pub fn classify_behavior(avg_hours: f64) -> BehaviorClass {
    if avg_hours < LIGHT_MAX_HOURS {
        BehaviorClass::LightUser
    } else if avg_hours < MODERATE_MAX_HOURS {
        BehaviorClass::ModerateUser
    } else if avg_hours < HEAVY_MAX_HOURS {
        BehaviorClass::HeavyUser
    } else {
        BehaviorClass::ExcessiveUser
    }
}

/// Mean hours on weekdays and on weekends, using each record's `is_weekend` flag
pub fn weekday_vs_weekend(dataset: &Dataset) -> WeekdayWeekend {
    let mut weekend = Vec::new();
    let mut weekday = Vec::new();
    for record in dataset.records() {
        if record.is_weekend {
            weekend.push(record.screen_time_hours());
        } else {
            weekday.push(record.screen_time_hours());
        }
    }

    WeekdayWeekend {
        weekday: mean(&weekday),
        weekend: mean(&weekend),
    }
}

/// Mean hours per day of week, Sunday first, only for days present in the data
pub fn daily_averages(dataset: &Dataset) -> Vec<DailyAverage> {
    let mut buckets: [Vec<f64>; 7] = Default::default();
    for record in dataset.records() {
        if let Some(bucket) = buckets.get_mut(record.day_of_week as usize) {
            bucket.push(record.screen_time_hours());
        }
    }

    buckets
        .iter()
        .enumerate()
        .filter_map(|(day, hours)| {
            mean(hours).map(|avg| DailyAverage {
                day: DAY_NAMES[day].to_string(),
                day_of_week: day as u8,
                avg_screen_time_hours: avg,
            })
        })
        .collect()
}
