//! Menstrual cycle regularity analyzer
//!
//! Cycle lengths are the gaps between consecutive start dates. Gaps outside
//! the plausible range are treated as missed logs and skipped.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::mean;
use crate::types::{Insight, InsightCategory, Severity};
use chrono::{DateTime, Utc};

pub const IRREGULAR_CYCLE: RuleSpec = RuleSpec {
    key: "irregular_cycle",
    title: "Irregular Menstrual Cycle",
    severity: Severity::Attention,
    category: InsightCategory::Menstrual,
    analyzer: "menstrual",
};

/// Cycle length variability analyzer
pub struct MenstrualAnalyzer;

impl InsightAnalyzer for MenstrualAnalyzer {
    fn name(&self) -> &'static str {
        "menstrual"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(cycles) = ctx.period_cycles else {
            return Vec::new();
        };
        let t = &ctx.config.thresholds;

        let completed = cycles.iter().filter(|c| c.end_date.is_some()).count();
        if completed < 2 {
            return Vec::new();
        }

        let mut starts: Vec<DateTime<Utc>> = cycles.iter().map(|c| c.start_date).collect();
        starts.sort();

        let gaps: Vec<f64> = starts
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days())
            .filter(|gap| (t.min_cycle_gap_days..=t.max_cycle_gap_days).contains(gap))
            .map(|gap| gap as f64)
            .collect();

        if gaps.len() < 2 {
            return Vec::new();
        }

        let Some(avg) = mean(&gaps) else {
            return Vec::new();
        };
        let deviations: Vec<f64> = gaps.iter().map(|g| (g - avg).abs()).collect();
        let Some(variability) = mean(&deviations) else {
            return Vec::new();
        };

        if variability <= t.cycle_deviation_days {
            return Vec::new();
        }

        let shortest = gaps.iter().copied().fold(f64::INFINITY, f64::min);
        let longest = gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        vec![IRREGULAR_CYCLE
            .insight(ctx.as_of)
            .with_explanation(format!(
                "Your cycle length varies by about {variability:.0} days around an average of \
                 {avg:.0} days."
            ))
            .with_factors([
                format!("{} cycles compared", gaps.len()),
                format!("Cycle lengths from {shortest:.0} to {longest:.0} days"),
            ])
            .with_recommendations([
                "Keep logging start and end dates to track the pattern",
                "Stress, sleep and weight changes can affect cycle length",
                "Discuss persistent irregularity with a healthcare provider",
            ])]
    }
}
