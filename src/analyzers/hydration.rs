//! Hydration analyzer
//!
//! Hydration is judged against fixed daily intake levels rather than a
//! personal baseline: drinks are summed per calendar day and the daily totals
//! averaged over the recent window.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::TrendCalculator;
use crate::types::{Insight, InsightCategory, Severity};

pub const LOW_HYDRATION_HIGH_ACTIVITY: RuleSpec = RuleSpec {
    key: "low_hydration_high_activity",
    title: "Low Hydration with High Activity",
    severity: Severity::Attention,
    category: InsightCategory::Hydration,
    analyzer: "hydration",
};

pub const DEHYDRATION_RISK: RuleSpec = RuleSpec {
    key: "dehydration_risk",
    title: "Dehydration Risk",
    severity: Severity::Warning,
    category: InsightCategory::Hydration,
    analyzer: "hydration",
};

/// Daily water intake analyzer
pub struct HydrationAnalyzer;

impl InsightAnalyzer for HydrationAnalyzer {
    fn name(&self) -> &'static str {
        "hydration"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let points: Vec<_> = ctx
            .hydration
            .iter()
            .map(|h| (h.timestamp, h.amount_ml))
            .collect();

        let Some(daily_ml) =
            TrendCalculator::daily_total_average(&points, ctx.as_of, ctx.config.windows.recent_days)
        else {
            return Vec::new();
        };

        let t = &ctx.config.thresholds;
        let workouts_per_week = ctx
            .trends
            .workout_frequency
            .as_ref()
            .map_or(0.0, |w| w.current_average);

        let mut insights = Vec::new();

        if daily_ml < t.hydration_active_ml && workouts_per_week > t.active_workouts_per_week {
            insights.push(
                LOW_HYDRATION_HIGH_ACTIVITY
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You are training {:.1} times per week but drinking only {:.0} ml per day \
                         on average.",
                        workouts_per_week, daily_ml
                    ))
                    .with_factors([
                        format!("Average intake {daily_ml:.0} ml/day"),
                        format!("{workouts_per_week:.1} workouts per week"),
                    ])
                    .with_recommendations([
                        "Drink 500 ml of water in the two hours before a workout",
                        "Replace fluids after training, more in hot weather",
                        "Keep a water bottle in your gym bag",
                    ]),
            );
        }

        if daily_ml < t.dehydration_ml {
            insights.push(
                DEHYDRATION_RISK
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "Your average daily water intake is {:.0} ml, below the {:.0} ml minimum.",
                        daily_ml, t.dehydration_ml
                    ))
                    .with_factors([format!("Average intake {daily_ml:.0} ml/day")])
                    .with_recommendations([
                        "Aim for at least 2 litres of water per day",
                        "Set reminders to drink throughout the day",
                        "Eat water-rich foods such as fruit and vegetables",
                    ]),
            );
        }

        insights
    }
}
