//! Recovery analyzer
//!
//! Flags a heavy training week that coincides with low energy or high stress.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::types::{Insight, InsightCategory, Severity};

pub const OVERTRAINING_RISK: RuleSpec = RuleSpec {
    key: "overtraining_risk",
    title: "Overtraining Risk",
    severity: Severity::Warning,
    category: InsightCategory::Recovery,
    analyzer: "recovery",
};

/// Training load versus recovery analyzer
pub struct RecoveryAnalyzer;

impl InsightAnalyzer for RecoveryAnalyzer {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.short_days;

        let workouts = ctx.workouts_within(window).count();
        if workouts < t.overtraining_workouts {
            return Vec::new();
        }

        let low_energy_days = ctx
            .metrics_within(window)
            .filter(|m| m.energy_level.is_some_and(|e| e <= t.low_energy_level))
            .count();
        let high_stress_days = ctx
            .metrics_within(window)
            .filter(|m| m.stress_level.is_some_and(|s| s >= t.recovery_stress_level))
            .count();

        if low_energy_days < t.recovery_flag_days && high_stress_days < t.recovery_flag_days {
            return Vec::new();
        }

        let mut factors = vec![format!("{workouts} workouts in the last {window} days")];
        if low_energy_days > 0 {
            factors.push(format!("{low_energy_days} low-energy days"));
        }
        if high_stress_days > 0 {
            factors.push(format!("{high_stress_days} high-stress days"));
        }

        vec![OVERTRAINING_RISK
            .insight(ctx.as_of)
            .with_explanation(
                "You are training hard while your energy is low or stress is high. Your body \
                 may not be recovering between sessions.",
            )
            .with_factors(factors)
            .with_recommendations([
                "Take one or two full rest days this week",
                "Swap a hard session for stretching or an easy walk",
                "Prioritise sleep and nutrition for recovery",
            ])]
    }
}
