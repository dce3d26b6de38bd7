//! Rule-based coaching recommendations
//!
//! A fixed rule table keyed by behavior tier, weekday/weekend ratio and trend.
//! Output order: tier lines, then the weekday/weekend line, then the trend
//! line, truncated to [`MAX_RECOMMENDATIONS`].

use crate::types::{BehaviorClass, Trend, WeekdayWeekend};
use tracing::warn;

/// Upper bound on the recommendation list
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Ratio above which one side of the week is flagged as dominant
const WEEK_SPLIT_RATIO: f64 = 1.5;

const EXCESSIVE_TIER: &[&str] = &[
    "🚨 Your screen time is very high. Consider setting app time limits.",
    "📱 Try the 20-20-20 rule: Every 20 minutes, look at something 20 feet away for 20 seconds.",
    "🛌 Establish a phone-free bedtime routine to improve sleep quality.",
    "🎯 Set a daily screen time goal and track your progress.",
];

const HEAVY_TIER: &[&str] = &[
    "⚠️ Your screen time is above average. Consider reducing by 30 minutes daily.",
    "📵 Try implementing 'phone-free' periods during meals and family time.",
    "🔔 Review your notification settings to reduce unnecessary interruptions.",
];

const MODERATE_TIER: &[&str] = &[
    "✅ Your usage is moderate. Focus on mindful usage quality over quantity.",
    "🎯 Try batching similar activities to reduce context switching.",
    "⏰ Use focus modes during work or study periods.",
];

const LIGHT_TIER: &[&str] = &[
    "🌟 Great job maintaining low screen time!",
    "📚 Consider using your extra time for offline activities you enjoy.",
    "👥 Share your digital wellness tips with friends and family.",
];

pub const WEEKEND_HEAVY: &str =
    "📅 Your weekend usage is significantly higher. Plan offline weekend activities.";
pub const WEEKDAY_HEAVY: &str =
    "💼 High weekday usage detected. Consider work-life balance and productivity apps.";
pub const TRENDING_UP: &str =
    "📈 Your usage is trending upward. Now might be a good time to set boundaries.";
pub const TRENDING_DOWN: &str =
    "📉 Great progress! Your usage is decreasing. Keep up the good habits.";

/// Fixed wording for a behavior tier
pub fn tier_lines(behavior: BehaviorClass) -> &'static [&'static str] {
    match behavior {
        BehaviorClass::ExcessiveUser => EXCESSIVE_TIER,
        BehaviorClass::HeavyUser => HEAVY_TIER,
        BehaviorClass::ModerateUser => MODERATE_TIER,
        BehaviorClass::LightUser => LIGHT_TIER,
    }
}

/// Recommendation generator
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Build the recommendation list.
    ///
    /// Never fails: on invalid input a single error line is returned, which
    /// callers treat as "recommendations unavailable".
    pub fn generate(behavior: BehaviorClass, split: &WeekdayWeekend, trend: Trend) -> Vec<String> {
        match Self::try_generate(behavior, split, trend) {
            Ok(lines) => lines,
            Err(reason) => {
                warn!(%reason, "Recommendation rules failed");
                vec![format!("Error generating recommendations: {reason}")]
            }
        }
    }

    fn try_generate(
        behavior: BehaviorClass,
        split: &WeekdayWeekend,
        trend: Trend,
    ) -> Result<Vec<String>, String> {
        let mut lines: Vec<String> = tier_lines(behavior).iter().map(|s| s.to_string()).collect();

        if let (Some(weekday), Some(weekend)) = (split.weekday, split.weekend) {
            if !weekday.is_finite() || !weekend.is_finite() {
                return Err(format!(
                    "non-finite weekday/weekend averages ({weekday}, {weekend})"
                ));
            }
            if weekend > weekday * WEEK_SPLIT_RATIO {
                lines.push(WEEKEND_HEAVY.to_string());
            } else if weekday > weekend * WEEK_SPLIT_RATIO {
                lines.push(WEEKDAY_HEAVY.to_string());
            }
        }

        match trend {
            Trend::Increasing => lines.push(TRENDING_UP.to_string()),
            Trend::Decreasing => lines.push(TRENDING_DOWN.to_string()),
            Trend::Stable | Trend::InsufficientData => {}
        }

        lines.truncate(MAX_RECOMMENDATIONS);
        Ok(lines)
    }
}
