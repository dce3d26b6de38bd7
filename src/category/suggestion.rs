//! Suggestion templates per coaching action

use crate::category::types::{CategoryUsage, Suggestion, UsageAction};

/// Smallest daily limit ever suggested, in hours
const MIN_SUGGESTED_LIMIT: f64 = 1.0;

/// Share of current top-category hours suggested as the new limit
const LIMIT_FACTOR: f64 = 0.7;

/// Suggested daily limit for the top category
pub fn suggested_limit(top_hours: f64) -> f64 {
    (top_hours * LIMIT_FACTOR).max(MIN_SUGGESTED_LIMIT)
}

pub fn build_suggestion(action: UsageAction, usage: &CategoryUsage) -> Suggestion {
    let total = usage.total_hours();
    let (top, top_hours) = usage.top_category();
    let top_name = top.display_name();

    match action {
        UsageAction::NoChange => Suggestion {
            title: "Healthy balance".to_string(),
            message: format!(
                "You spent {total:.1}h on your phone, most of it on {top_name} ({top_hours:.1}h). \
                 Your usage looks balanced."
            ),
            tips: vec![
                "Keep your current routine going".to_string(),
                "Check in on your usage once a week".to_string(),
            ],
        },
        UsageAction::TakeBreaks => Suggestion {
            title: "Time for regular breaks".to_string(),
            message: format!(
                "You spent {total:.1}h on your phone and {top_hours:.1}h of it on {top_name}. \
                 Short breaks will help you stay in control."
            ),
            tips: vec![
                "Take a 5 minute break every 30 minutes".to_string(),
                "Set a reminder when one app session passes 30 minutes".to_string(),
                "Keep your phone out of reach while studying".to_string(),
            ],
        },
        UsageAction::ReduceUsage => {
            let limit = suggested_limit(top_hours);
            Suggestion {
                title: format!("Cut back on {top_name}"),
                message: format!(
                    "You spent {total:.1}h on your phone, including {top_hours:.1}h on {top_name}. \
                     Try a daily limit of {limit:.1}h for {top_name}."
                ),
                tips: vec![
                    format!("Set a daily app timer of {limit:.1}h"),
                    "Turn off non-essential notifications".to_string(),
                    "Replace one screen session a day with an offline activity".to_string(),
                    "Keep the phone out of the bedroom at night".to_string(),
                ],
            }
        }
    }
}
