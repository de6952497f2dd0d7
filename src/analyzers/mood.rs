//! Mood analyzer
//!
//! Both low-mood rules are evaluated independently and may fire together.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::types::{Insight, InsightCategory, MoodSample, Severity};

pub const PERSISTENT_LOW_MOOD: RuleSpec = RuleSpec {
    key: "persistent_low_mood",
    title: "Persistent Low Mood",
    severity: Severity::Critical,
    category: InsightCategory::Mood,
    analyzer: "mood",
};

pub const LOW_MOOD_PATTERN: RuleSpec = RuleSpec {
    key: "low_mood_pattern",
    title: "Low Mood Pattern",
    severity: Severity::Attention,
    category: InsightCategory::Mood,
    analyzer: "mood",
};

/// Mood check-in analyzer
pub struct MoodAnalyzer;

impl InsightAnalyzer for MoodAnalyzer {
    fn name(&self) -> &'static str {
        "mood"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.short_days;
        let week: Vec<&MoodSample> = ctx.moods_within(window).collect();

        let very_low = week
            .iter()
            .filter(|m| m.is_labelled("terrible") || m.intensity <= t.persistent_low_mood_intensity)
            .count();
        let low = week
            .iter()
            .filter(|m| {
                m.is_labelled("bad")
                    || m.is_labelled("terrible")
                    || m.intensity <= t.low_mood_intensity
            })
            .count();

        let mut insights = Vec::new();

        if very_low >= t.low_mood_entries {
            insights.push(
                PERSISTENT_LOW_MOOD
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You have logged {very_low} very low mood entries in the last {window} days."
                    ))
                    .with_factors([format!("{very_low} of {} check-ins were very low", week.len())])
                    .with_recommendations([
                        "Reach out to someone you trust about how you are feeling",
                        "Consider speaking with a mental health professional",
                        "If you are in crisis, contact a local support line",
                    ]),
            );
        }

        if low >= t.low_mood_entries {
            insights.push(
                LOW_MOOD_PATTERN
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "Your mood has been low on {low} check-ins in the last {window} days."
                    ))
                    .with_factors([format!("{low} of {} check-ins were low", week.len())])
                    .with_recommendations([
                        "Spend some time outdoors or move your body",
                        "Keep regular sleep and meal times",
                        "Note what was happening on your low days",
                    ]),
            );
        }

        insights
    }
}
