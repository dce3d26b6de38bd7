//! Student usage policy checks
//!
//! Compares a category usage vector against fixed daily limits and derives
//! violations, an overall severity, and a list of apps to block.

use crate::category::{CategoryUsage, UsageCategory};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Daily limits in hours, checked in this order
pub const STUDENT_LIMITS: [(UsageCategory, f64); 4] = [
    (UsageCategory::SocialMedia, 2.0),
    (UsageCategory::Entertainment, 3.0),
    (UsageCategory::Gaming, 1.5),
    (UsageCategory::Browsing, 2.0),
];

/// Apps blocked when social media is over the limit
const SOCIAL_MEDIA_APPS: &[&str] = &[
    "Instagram",
    "Facebook",
    "TikTok",
    "Snapchat",
    "Twitter",
    "Reddit",
];

/// Apps blocked when gaming is over the limit
const GAMING_APPS: &[&str] = &[
    "PUBG Mobile",
    "Free Fire",
    "Call of Duty Mobile",
    "Clash of Clans",
    "Candy Crush",
    "Subway Surfers",
];

/// Maximum number of blocked apps reported
pub const MAX_BLOCKED: usize = 10;

pub const NOT_APPLICABLE: &str = "Usage policy does not apply to this profile";
pub const WITHIN_LIMITS: &str = "Usage is within healthy limits";

/// Severity of a single violation or of the whole check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// `high` above 2h excess, `medium` from 1h, else `low`
    fn from_excess(excess: f64) -> Self {
        if excess > 2.0 {
            Severity::High
        } else if excess >= 1.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// `high` for 3+ violations, `medium` for 2, `low` for 1
    fn from_count(count: usize) -> Self {
        match count {
            0 | 1 => Severity::Low,
            2 => Severity::Medium,
            _ => Severity::High,
        }
    }
}

/// One category over its limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub category: UsageCategory,
    pub actual: f64,
    pub limit: f64,
    pub excess: f64,
    pub severity: Severity,
}

/// Result of a policy check.
///
/// Restricted checks carry violations, severity, advice and blocked apps.
/// Unrestricted checks carry a message and, when the policy applied, a
/// productivity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCheck {
    pub restricted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity_score: Option<f64>,
}

impl PolicyCheck {
    fn unrestricted(message: &str, productivity_score: Option<f64>) -> Self {
        Self {
            restricted: false,
            message: Some(message.to_string()),
            violations: Vec::new(),
            severity: None,
            recommendations: Vec::new(),
            blocked_categories: Vec::new(),
            productivity_score,
        }
    }
}

/// Policy checker for the student profile
pub struct PolicyChecker;

impl PolicyChecker {
    pub fn check(usage: &CategoryUsage, policy_applies: bool) -> PolicyCheck {
        if !policy_applies {
            return PolicyCheck::unrestricted(NOT_APPLICABLE, None);
        }

        let violations: Vec<Violation> = STUDENT_LIMITS
            .iter()
            .filter_map(|&(category, limit)| {
                let actual = usage.get(category);
                (actual > limit).then(|| {
                    let excess = actual - limit;
                    Violation {
                        category,
                        actual,
                        limit,
                        excess,
                        severity: Severity::from_excess(excess),
                    }
                })
            })
            .collect();

        if violations.is_empty() {
            let score = productivity_score(usage);
            debug!(score, "Usage within student limits");
            return PolicyCheck::unrestricted(WITHIN_LIMITS, Some(score));
        }

        let severity = Severity::from_count(violations.len());
        debug!(count = violations.len(), ?severity, "Student limits exceeded");

        PolicyCheck {
            restricted: true,
            message: None,
            recommendations: violations.iter().map(violation_advice).collect(),
            blocked_categories: blocked_apps(&violations),
            severity: Some(severity),
            violations,
            productivity_score: None,
        }
    }
}

/// Share of total hours spent on education and productivity, 0-100
pub fn productivity_score(usage: &CategoryUsage) -> f64 {
    let total = usage.total_hours();
    if total <= 0.0 {
        return 0.0;
    }
    let useful = usage.get(UsageCategory::Education) + usage.get(UsageCategory::Productivity);
    (100.0 * useful / total).clamp(0.0, 100.0)
}

fn violation_advice(violation: &Violation) -> String {
    format!(
        "Reduce {} by {:.1}h to stay within the {:.1}h daily limit",
        violation.category.display_name().to_lowercase(),
        violation.excess,
        violation.limit
    )
}

/// Apps for violated categories in violation order, deduplicated and capped
fn blocked_apps(violations: &[Violation]) -> Vec<String> {
    let mut blocked: Vec<String> = Vec::new();
    for violation in violations {
        let apps = match violation.category {
            UsageCategory::SocialMedia => SOCIAL_MEDIA_APPS,
            UsageCategory::Gaming => GAMING_APPS,
            _ => continue,
        };
        for app in apps {
            if !blocked.iter().any(|b| b == app) {
                blocked.push(app.to_string());
            }
        }
    }
    blocked.truncate(MAX_BLOCKED);
    blocked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(pairs: &[(UsageCategory, f64)]) -> CategoryUsage {
        let mut usage = CategoryUsage::default();
        for &(category, hours) in pairs {
            usage.set(category, hours);
        }
        usage
    }

    #[test]
    fn test_single_social_media_violation() {
        let check = PolicyChecker::check(&usage(&[(UsageCategory::SocialMedia, 3.0)]), true);
        assert!(check.restricted);
        assert_eq!(check.violations.len(), 1);

        let violation = &check.violations[0];
        assert_eq!(violation.category, UsageCategory::SocialMedia);
        assert!((violation.excess - 1.0).abs() < 1e-9);
        assert_eq!(violation.severity, Severity::Medium);

        assert_eq!(check.severity, Some(Severity::Low));
        assert!(check.blocked_categories.contains(&"Instagram".to_string()));
        assert_eq!(check.recommendations.len(), 1);
        assert_eq!(check.productivity_score, None);
    }

    #[test]
    fn test_small_excess_is_low() {
        let check = PolicyChecker::check(&usage(&[(UsageCategory::SocialMedia, 2.5)]), true);
        assert_eq!(check.violations[0].severity, Severity::Low);
    }

    #[test]
    fn test_severity_from_excess_bins() {
        assert_eq!(Severity::from_excess(0.5), Severity::Low);
        assert_eq!(Severity::from_excess(0.99), Severity::Low);
        assert_eq!(Severity::from_excess(1.0), Severity::Medium);
        assert_eq!(Severity::from_excess(2.0), Severity::Medium);
        assert_eq!(Severity::from_excess(2.5), Severity::High);
    }

    #[test]
    fn test_overall_severity_by_count() {
        let two = usage(&[(UsageCategory::SocialMedia, 2.5), (UsageCategory::Gaming, 2.0)]);
        assert_eq!(PolicyChecker::check(&two, true).severity, Some(Severity::Medium));

        let three = usage(&[
            (UsageCategory::SocialMedia, 2.5),
            (UsageCategory::Gaming, 2.0),
            (UsageCategory::Browsing, 2.1),
        ]);
        let check = PolicyChecker::check(&three, true);
        assert_eq!(check.severity, Some(Severity::High));

        let order: Vec<UsageCategory> = check.violations.iter().map(|v| v.category).collect();
        assert_eq!(
            order,
            vec![UsageCategory::SocialMedia, UsageCategory::Gaming, UsageCategory::Browsing]
        );
    }

    #[test]
    fn test_blocked_apps_deduplicated_and_capped() {
        let heavy = usage(&[
            (UsageCategory::SocialMedia, 6.0),
            (UsageCategory::Gaming, 5.0),
            (UsageCategory::Entertainment, 6.0),
        ]);
        let blocked = PolicyChecker::check(&heavy, true).blocked_categories;
        assert!(blocked.len() <= MAX_BLOCKED);
        assert!(blocked.contains(&"TikTok".to_string()));
        assert!(blocked.contains(&"PUBG Mobile".to_string()));

        let mut unique = blocked.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), blocked.len());
    }

    #[test]
    fn test_entertainment_only_blocks_nothing() {
        let check = PolicyChecker::check(&usage(&[(UsageCategory::Entertainment, 4.0)]), true);
        assert!(check.restricted);
        assert!(check.blocked_categories.is_empty());
    }

    #[test]
    fn test_limits_are_inclusive() {
        let at_limits = usage(&[
            (UsageCategory::SocialMedia, 2.0),
            (UsageCategory::Entertainment, 3.0),
            (UsageCategory::Gaming, 1.5),
            (UsageCategory::Browsing, 2.0),
            (UsageCategory::Education, 1.5),
        ]);
        let check = PolicyChecker::check(&at_limits, true);
        assert!(!check.restricted);
        assert_eq!(check.message.as_deref(), Some(WITHIN_LIMITS));

        let score = check.productivity_score.unwrap();
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_usage_scores_zero() {
        assert_eq!(productivity_score(&CategoryUsage::default()), 0.0);
    }

    #[test]
    fn test_policy_not_applicable() {
        let check = PolicyChecker::check(&usage(&[(UsageCategory::Gaming, 9.0)]), false);
        assert!(!check.restricted);
        assert_eq!(check.message.as_deref(), Some(NOT_APPLICABLE));
        assert!(check.violations.is_empty());
        assert_eq!(check.productivity_score, None);
    }

    #[test]
    fn test_serialized_shape() {
        let check = PolicyChecker::check(&usage(&[(UsageCategory::Gaming, 2.0)]), true);
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["restricted"], true);
        assert_eq!(json["severity"], "low");
        assert_eq!(json["violations"][0]["category"], "gaming");
        assert!(json["blockedCategories"].is_array());
        assert!(json.get("productivityScore").is_none());
    }
}
