//! Exercise and mood correlation
//!
//! Splits the days with mood check-ins into workout days and rest days and
//! compares the average mood intensity of the two groups.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::mean;
use crate::types::{Insight, InsightCategory, Severity};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

pub const EXERCISE_MOOD_BOOST: RuleSpec = RuleSpec {
    key: "exercise_mood_boost",
    title: "Exercise Boosts Your Mood",
    severity: Severity::Info,
    category: InsightCategory::Mood,
    analyzer: "exercise_mood",
};

/// Workout-day versus rest-day mood comparison
pub struct ExerciseMoodAnalyzer;

impl InsightAnalyzer for ExerciseMoodAnalyzer {
    fn name(&self) -> &'static str {
        "exercise_mood"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.correlation_days;

        let moods: Vec<_> = ctx.moods_within(window).collect();
        let workout_days: HashSet<NaiveDate> = ctx
            .workouts_within(window)
            .map(|w| w.date.date_naive())
            .collect();
        let workout_count = ctx.workouts_within(window).count();

        if moods.len() < t.min_mood_entries_for_correlation
            || workout_count < t.min_workouts_for_correlation
        {
            return Vec::new();
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for m in &moods {
            by_day
                .entry(m.timestamp.date_naive())
                .or_default()
                .push(f64::from(m.intensity));
        }

        let mut active = Vec::new();
        let mut rest = Vec::new();
        for (day, values) in &by_day {
            let Some(day_mean) = mean(values) else { continue };
            if workout_days.contains(day) {
                active.push(day_mean);
            } else {
                rest.push(day_mean);
            }
        }

        if active.len() < t.min_days_per_group || rest.len() < t.min_days_per_group {
            return Vec::new();
        }

        let (Some(active_avg), Some(rest_avg)) = (mean(&active), mean(&rest)) else {
            return Vec::new();
        };
        let lift = active_avg - rest_avg;

        if lift <= t.mood_lift_points {
            return Vec::new();
        }

        vec![EXERCISE_MOOD_BOOST
            .insight(ctx.as_of)
            .with_explanation(format!(
                "On days you work out, your mood averages {active_avg:.1} compared to \
                 {rest_avg:.1} on rest days."
            ))
            .with_factors([
                format!("{} workout days with mood logged", active.len()),
                format!("{} rest days with mood logged", rest.len()),
                format!("Mood lift of {lift:.1} points"),
            ])
            .with_recommendations([
                "On low days, a short workout may help lift your mood",
                "Keep moving regularly to maintain the benefit",
            ])]
    }
}
