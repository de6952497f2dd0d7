//! Sleep analyzer

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::mean;
use crate::types::{Insight, InsightCategory, Severity, TrendDirection};

pub const SLEEP_DECLINE: RuleSpec = RuleSpec {
    key: "sleep_decline",
    title: "Declining Sleep Duration",
    severity: Severity::Attention,
    category: InsightCategory::Sleep,
    analyzer: "sleep",
};

pub const INSUFFICIENT_SLEEP: RuleSpec = RuleSpec {
    key: "insufficient_sleep",
    title: "Insufficient Sleep",
    severity: Severity::Warning,
    category: InsightCategory::Sleep,
    analyzer: "sleep",
};

/// Sleep duration analyzer
pub struct SleepAnalyzer;

impl InsightAnalyzer for SleepAnalyzer {
    fn name(&self) -> &'static str {
        "sleep"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let mut insights = Vec::new();

        if let Some(sleep) = ctx.trends.sleep.as_ref().filter(|s| {
            s.direction == TrendDirection::Decreasing && s.percent_change.abs() > t.sleep_decline_pct
        }) {
            insights.push(
                SLEEP_DECLINE
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You have been sleeping {:.0}% less than usual over the last {} days.",
                        sleep.percent_change.abs(),
                        ctx.config.windows.recent_days
                    ))
                    .with_factors([format!(
                        "Average {:.1} h per night vs {:.1} h baseline",
                        sleep.current_average, sleep.baseline_average
                    )])
                    .with_recommendations([
                        "Keep a consistent bedtime, even on weekends",
                        "Avoid screens for an hour before bed",
                        "Limit caffeine after midday",
                    ]),
            );
        }

        let week: Vec<f64> = ctx
            .metrics_within(ctx.config.windows.short_days)
            .filter_map(|m| m.sleep_hours)
            .collect();

        if let Some(avg) = mean(&week).filter(|avg| *avg < t.min_sleep_hours) {
            insights.push(
                INSUFFICIENT_SLEEP
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You averaged {:.1} hours of sleep over the last {} days, below the {:.0} \
                         hours most adults need.",
                        avg, ctx.config.windows.short_days, t.min_sleep_hours
                    ))
                    .with_factors([format!("{} nights logged", week.len())])
                    .with_recommendations([
                        "Aim for 7 to 9 hours of sleep",
                        "Move bedtime earlier by 15 minutes each night",
                    ]),
            );
        }

        insights
    }
}
