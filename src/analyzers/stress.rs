//! Stress analyzer

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::types::{Insight, InsightCategory, Severity};

pub const CHRONIC_STRESS: RuleSpec = RuleSpec {
    key: "chronic_stress",
    title: "Chronic High Stress",
    severity: Severity::Critical,
    category: InsightCategory::Stress,
    analyzer: "stress",
};

pub const ELEVATED_STRESS: RuleSpec = RuleSpec {
    key: "elevated_stress",
    title: "Elevated Stress Levels",
    severity: Severity::Warning,
    category: InsightCategory::Stress,
    analyzer: "stress",
};

/// High-stress day counter
pub struct StressAnalyzer;

impl InsightAnalyzer for StressAnalyzer {
    fn name(&self) -> &'static str {
        "stress"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.recent_days;

        let high_days = ctx
            .metrics_within(window)
            .filter(|m| m.stress_level.is_some_and(|s| s >= t.high_stress_level))
            .count();

        let factor = format!(
            "{high_days} of the last {window} days logged stress at {} or above",
            t.high_stress_level
        );

        if high_days >= t.chronic_stress_days {
            vec![CHRONIC_STRESS
                .insight(ctx.as_of)
                .with_explanation(format!(
                    "You have reported high stress on {high_days} days in the last {window} days. \
                     Sustained stress affects sleep, mood and recovery."
                ))
                .with_factors([factor])
                .with_recommendations([
                    "Try 10 minutes of breathing exercises or meditation daily",
                    "Protect time for rest and activities you enjoy",
                    "Consider talking to a mental health professional",
                ])]
        } else if high_days >= t.elevated_stress_days {
            vec![ELEVATED_STRESS
                .insight(ctx.as_of)
                .with_explanation(format!(
                    "Stress has been high on {high_days} days recently."
                ))
                .with_factors([factor])
                .with_recommendations([
                    "Notice what triggers your high-stress days",
                    "Take short breaks and get outside during the day",
                ])]
        } else {
            Vec::new()
        }
    }
}
