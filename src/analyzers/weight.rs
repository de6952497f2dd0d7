//! Weight analyzer
//!
//! Compares the recent weight trend against the baseline and, for weight gain,
//! against the workout frequency trend.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::types::{Insight, InsightCategory, Severity, TrendDirection};

pub const WEIGHT_GAIN_LOW_ACTIVITY: RuleSpec = RuleSpec {
    key: "weight_gain_low_activity",
    title: "Weight Gain with Reduced Activity",
    severity: Severity::Attention,
    category: InsightCategory::Weight,
    analyzer: "weight",
};

pub const RAPID_WEIGHT_LOSS: RuleSpec = RuleSpec {
    key: "rapid_weight_loss",
    title: "Rapid Weight Loss",
    severity: Severity::Warning,
    category: InsightCategory::Weight,
    analyzer: "weight",
};

/// Weight trend analyzer
pub struct WeightAnalyzer;

impl InsightAnalyzer for WeightAnalyzer {
    fn name(&self) -> &'static str {
        "weight"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(weight) = &ctx.trends.weight else {
            return Vec::new();
        };
        let t = &ctx.config.thresholds;
        let mut insights = Vec::new();

        if weight.direction == TrendDirection::Increasing && weight.percent_change > t.weight_gain_pct
        {
            if let Some(activity) = ctx
                .trends
                .workout_frequency
                .as_ref()
                .filter(|a| a.direction == TrendDirection::Decreasing)
            {
                insights.push(
                    WEIGHT_GAIN_LOW_ACTIVITY
                        .insight(ctx.as_of)
                        .with_explanation(format!(
                            "Your weight has risen {:.1}% above your usual level while your \
                             workouts dropped from {:.1} to {:.1} per week.",
                            weight.percent_change,
                            activity.baseline_average,
                            activity.current_average
                        ))
                        .with_factors([
                            format!(
                                "Average weight {:.1} kg vs {:.1} kg baseline",
                                weight.current_average, weight.baseline_average
                            ),
                            format!(
                                "Workout frequency down {:.0}%",
                                activity.percent_change.abs()
                            ),
                        ])
                        .with_recommendations([
                            "Schedule two or three short workouts this week",
                            "Add a daily walk to rebuild your routine",
                            "Review portion sizes while activity is lower",
                        ]),
                );
            }
        }

        if weight.direction == TrendDirection::Decreasing
            && weight.percent_change.abs() > t.rapid_weight_loss_pct
        {
            insights.push(
                RAPID_WEIGHT_LOSS
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "Your weight has dropped {:.1}% compared to your usual level.",
                        weight.percent_change.abs()
                    ))
                    .with_factors([format!(
                        "Average weight {:.1} kg vs {:.1} kg baseline",
                        weight.current_average, weight.baseline_average
                    )])
                    .with_recommendations([
                        "Make sure you are eating enough to match your activity",
                        "Talk to a healthcare provider if the loss is unintentional",
                    ]),
            );
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn with_weights(fixture: &mut Fixture, recent: f64, baseline: f64) {
        for day in [1, 4, 8, 12] {
            let mut m = metric(day);
            m.weight = Some(recent);
            fixture.input.health_metrics.push(m);
        }
        for day in [20, 35, 50, 70] {
            let mut m = metric(day);
            m.weight = Some(baseline);
            fixture.input.health_metrics.push(m);
        }
    }

    #[test]
    fn test_weight_gain_with_reduced_activity() {
        let mut fixture = Fixture::default();
        // +5%
        with_weights(&mut fixture, 84.0, 80.0);
        // 1 workout/week recently vs ~3/week before
        fixture.input.workouts = vec![workout(3), workout(10)];
        for day in (15..90).step_by(2) {
            fixture.input.workouts.push(workout(day));
        }

        let insights = WeightAnalyzer.analyze(&fixture.ctx());
        assert_eq!(keys(&insights), vec!["weight_gain_low_activity"]);
        assert_eq!(insights[0].severity, Severity::Attention);
        assert_eq!(insights[0].category, InsightCategory::Weight);
    }

    #[test]
    fn test_weight_gain_after_workouts_stop() {
        let mut fixture = Fixture::default();
        with_weights(&mut fixture, 84.0, 80.0);
        // About 4/week before the recent window, none since
        fixture.input.workouts = (15..=90).filter(|d| d % 7 < 4).map(workout).collect();

        let ctx = fixture.ctx();
        let activity = ctx.trends.workout_frequency.as_ref().unwrap();
        assert_eq!(activity.current_average, 0.0);
        assert_eq!(activity.direction, TrendDirection::Decreasing);

        let insights = WeightAnalyzer.analyze(&ctx);
        assert_eq!(keys(&insights), vec!["weight_gain_low_activity"]);
    }

    #[test]
    fn test_weight_gain_with_steady_activity_is_silent() {
        let mut fixture = Fixture::default();
        with_weights(&mut fixture, 84.0, 80.0);
        fixture.input.workouts = vec![workout(3), workout(10)];

        assert!(WeightAnalyzer.analyze(&fixture.ctx()).is_empty());
    }

    #[test]
    fn test_small_weight_gain_is_silent() {
        let mut fixture = Fixture::default();
        // +2.5%: increasing, but below the 3% rule threshold
        with_weights(&mut fixture, 82.0, 80.0);
        fixture.input.workouts = vec![workout(3)];
        for day in (15..90).step_by(2) {
            fixture.input.workouts.push(workout(day));
        }

        assert!(WeightAnalyzer.analyze(&fixture.ctx()).is_empty());
    }

    #[test]
    fn test_rapid_weight_loss() {
        let mut fixture = Fixture::default();
        // -7.5%
        with_weights(&mut fixture, 74.0, 80.0);

        let insights = WeightAnalyzer.analyze(&fixture.ctx());
        assert_eq!(keys(&insights), vec!["rapid_weight_loss"]);
        assert_eq!(insights[0].severity, Severity::Warning);
    }

    #[test]
    fn test_moderate_weight_loss_is_silent() {
        let mut fixture = Fixture::default();
        // -3.75%
        with_weights(&mut fixture, 77.0, 80.0);
        assert!(WeightAnalyzer.analyze(&fixture.ctx()).is_empty());
    }
}
