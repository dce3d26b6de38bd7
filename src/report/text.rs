//! Plain-text report

use crate::types::{AnalysisResult, PredictionSection, TrendReport, WeekdayWeekend};

/// Title line shared by the text and paginated renderers
pub const REPORT_TITLE: &str = "HabitGuard Screen Time Report";

/// Report body as individual lines, without trailing newlines
pub fn text_lines(result: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(REPORT_TITLE.to_string());
    lines.push("=".repeat(REPORT_TITLE.len()));
    lines.push(format!("Report ID: {}", result.metadata.report_id));
    lines.push(format!(
        "Generated: {} by {} {}",
        result.metadata.generated_at.format("%Y-%m-%d %H:%M UTC"),
        result.metadata.producer,
        result.metadata.version
    ));

    let summary = &result.summary;
    section(&mut lines, "Summary");
    lines.push(format!("Days analyzed:              {}", summary.total_days));
    lines.push(format!(
        "Average daily screen time:  {:.1} h",
        summary.avg_daily_screen_time
    ));
    lines.push(format!(
        "Highest / lowest day:       {:.1} h / {:.1} h",
        summary.max_daily_screen_time, summary.min_daily_screen_time
    ));
    lines.push(format!("Average apps per day:       {:.0}", summary.avg_apps_per_day));
    lines.push(format!(
        "Total screen time:          {:.1} h",
        summary.total_screen_time_hours
    ));

    let patterns = &result.patterns;
    section(&mut lines, "Patterns");
    lines.push(format!(
        "Behavior classification:    {}",
        patterns.behavior_classification.display_name()
    ));
    lines.push(trend_line(&patterns.trends));
    lines.push(split_line(&patterns.weekday_vs_weekend));
    if !patterns.daily_averages.is_empty() {
        lines.push("Average by day:".to_string());
        for day in &patterns.daily_averages {
            lines.push(format!("  {:<10} {:>5.1} h", day.day, day.avg_screen_time_hours));
        }
    }

    section(&mut lines, "Predictions (next 7 days)");
    match &result.predictions {
        None => lines.push("Not enough data: at least 7 days are needed.".to_string()),
        Some(PredictionSection::Unavailable { error }) => {
            lines.push(format!("Unavailable: {error}"));
        }
        Some(PredictionSection::Forecast(forecast)) => {
            for day in &forecast.next_7_days {
                let kind = if day.is_weekend { "weekend" } else { "weekday" };
                lines.push(format!(
                    "  {} ({})  {:>5.1} h",
                    day.date, kind, day.predicted_screen_time_hours
                ));
            }
            lines.push(format!(
                "Predicted weekly total:     {:.1} h",
                forecast.weekly_prediction
            ));
            let perf = &forecast.model_performance;
            let evaluation = if perf.held_out_evaluation {
                "held-out"
            } else {
                "in-sample"
            };
            lines.push(format!(
                "Model accuracy:             {} (R² {:.2}, MAE {:.2} h, {evaluation})",
                perf.accuracy.as_str(),
                perf.r2_score,
                perf.mean_absolute_error_hours
            ));
        }
    }

    section(&mut lines, "Recommendations");
    for (i, rec) in result.recommendations.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, rec));
    }

    lines
}

/// Full plain-text report, newline terminated
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = text_lines(result).join("\n");
    out.push('\n');
    out
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_uppercase());
    lines.push("-".repeat(title.chars().count()));
}

fn trend_line(trend: &TrendReport) -> String {
    let mut line = format!("Usage trend:                {}", trend.trend.as_str());
    if let Some(slope) = trend.slope {
        line.push_str(&format!(" ({slope:+.2} h/day)"));
    }
    line
}

fn split_line(split: &WeekdayWeekend) -> String {
    let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |h| format!("{h:.1} h"));
    format!(
        "Weekday / weekend average:  {} / {}",
        fmt(split.weekday),
        fmt(split.weekend)
    )
}
