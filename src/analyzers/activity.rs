//! Exercise consistency analyzer

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::within_range;
use crate::types::{Insight, InsightCategory, Severity};

pub const EXERCISE_GAP: RuleSpec = RuleSpec {
    key: "exercise_gap",
    title: "Exercise Gap Detected",
    severity: Severity::Attention,
    category: InsightCategory::Activity,
    analyzer: "activity",
};

pub const EXERCISE_CONSISTENCY: RuleSpec = RuleSpec {
    key: "exercise_consistency",
    title: "Great Exercise Consistency",
    severity: Severity::Info,
    category: InsightCategory::Activity,
    analyzer: "activity",
};

/// Workout frequency analyzer
pub struct ActivityAnalyzer;

impl InsightAnalyzer for ActivityAnalyzer {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let w = &ctx.config.windows;

        let recent = ctx.workouts_within(w.recent_days).count();
        let prior = ctx
            .workouts
            .iter()
            .filter(|wk| within_range(ctx.as_of, wk.date, w.recent_days, w.gap_lookback_days))
            .count();

        let mut insights = Vec::new();

        if recent == 0 && prior > 0 {
            insights.push(
                EXERCISE_GAP
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You haven't logged a workout in the last {} days, after {prior} in the \
                         two weeks before.",
                        w.recent_days
                    ))
                    .with_factors([format!(
                        "0 workouts in the last {} days",
                        w.recent_days
                    )])
                    .with_recommendations([
                        "Restart with a short, easy session",
                        "Put your next workout in your calendar",
                        "Pick an activity you enjoy to rebuild the habit",
                    ]),
            );
        }

        if recent >= t.consistency_workouts {
            insights.push(
                EXERCISE_CONSISTENCY
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You completed {recent} workouts in the last {} days. Keep it up!",
                        w.recent_days
                    ))
                    .with_factors([format!("{recent} workouts in {} days", w.recent_days)])
                    .with_recommendations([
                        "Mix in rest days to let your body recover",
                        "Vary intensity across the week",
                    ]),
            );
        }

        insights
    }
}
