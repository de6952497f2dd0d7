//! Insight generation
//!
//! This module provides the public API for Healthlog Insights. It checks that
//! enough history exists, runs every analyzer over the caller's series and
//! aggregates the result into an `InsightReport`.
//!
//! Generation is pure: the same series and `as_of` always yield the same report.

use crate::aggregator::{aggregate, days_of_data};
use crate::analyzers::{default_analyzers, AnalysisContext, InsightAnalyzer, INSUFFICIENT_DATA};
use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::types::{
    FoodLogSample, HealthMetricSample, HydrationSample, InsightInput, InsightReport, MoodSample,
    PeriodCycle, WorkoutSample,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Generate insights with the default configuration.
///
/// # Arguments
/// * `health_metrics` - Daily health metric entries
/// * `workouts` - Logged workouts
/// * `hydration` - Individual drinks
/// * `moods` - Mood check-ins
/// * `food` - Food log entries
/// * `period_cycles` - Menstrual cycles; menstrual analysis is skipped when `None`
/// * `as_of` - Reference instant for every window
///
/// # Example
/// ```ignore
/// let report = generate_insights(&metrics, &workouts, &drinks, &moods, &food, None, Utc::now());
/// for insight in report.urgent() {
///     println!("{}: {}", insight.title, insight.explanation);
/// }
/// ```
#[allow(clippy::too_many_arguments)]
pub fn generate_insights(
    health_metrics: &[HealthMetricSample],
    workouts: &[WorkoutSample],
    hydration: &[HydrationSample],
    moods: &[MoodSample],
    food: &[FoodLogSample],
    period_cycles: Option<&[PeriodCycle]>,
    as_of: DateTime<Utc>,
) -> InsightReport {
    InsightsEngine::new().generate(
        health_metrics,
        workouts,
        hydration,
        moods,
        food,
        period_cycles,
        as_of,
    )
}

/// Configured insight engine.
///
/// Holds no per-user state; one instance can serve any number of calls.
pub struct InsightsEngine {
    config: InsightConfig,
    analyzers: Vec<Box<dyn InsightAnalyzer>>,
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightsEngine {
    /// Create an engine with the default rule set and thresholds
    pub fn new() -> Self {
        Self {
            config: InsightConfig::default(),
            analyzers: default_analyzers(),
        }
    }

    /// Create an engine with custom thresholds and windows
    pub fn with_config(config: InsightConfig) -> Result<Self, InsightError> {
        config.validate()?;
        Ok(Self {
            config,
            analyzers: default_analyzers(),
        })
    }

    /// Replace the analyzer set
    pub fn with_analyzers(mut self, analyzers: Vec<Box<dyn InsightAnalyzer>>) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Names of the registered analyzers, in run order
    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Generate insights from an input bundle
    pub fn generate_from_input(&self, input: &InsightInput, as_of: DateTime<Utc>) -> InsightReport {
        let ctx = AnalysisContext::from_input(input, as_of, &self.config);
        self.run(&ctx, input.earliest_timestamp())
    }

    /// Generate insights from individual series
    #[allow(clippy::too_many_arguments)]
    pub fn generate(
        &self,
        health_metrics: &[HealthMetricSample],
        workouts: &[WorkoutSample],
        hydration: &[HydrationSample],
        moods: &[MoodSample],
        food: &[FoodLogSample],
        period_cycles: Option<&[PeriodCycle]>,
        as_of: DateTime<Utc>,
    ) -> InsightReport {
        let ctx = AnalysisContext::new(
            health_metrics,
            workouts,
            hydration,
            moods,
            food,
            period_cycles,
            as_of,
            &self.config,
        );
        let earliest = earliest_record(&ctx);
        self.run(&ctx, earliest)
    }

    fn run(&self, ctx: &AnalysisContext<'_>, earliest: Option<DateTime<Utc>>) -> InsightReport {
        let days = days_of_data(earliest, ctx.as_of);

        if days < self.config.min_days_of_data {
            debug!(
                days_of_data = days,
                required = self.config.min_days_of_data,
                "not enough history, skipping analyzers"
            );
            let notice = INSUFFICIENT_DATA
                .insight(ctx.as_of)
                .with_explanation(format!(
                    "Keep logging for at least {} days to unlock personalised insights.",
                    self.config.min_days_of_data
                ))
                .with_factors([format!("{days} days of data available")])
                .with_recommendations([
                    "Log your sleep, mood and water intake daily",
                    "Record workouts and meals as you go",
                ]);
            return aggregate(vec![notice], days, ctx.as_of, Vec::new());
        }

        let mut insights = Vec::new();
        for analyzer in &self.analyzers {
            let found = analyzer.analyze(ctx);
            debug!(
                analyzer = analyzer.name(),
                insights = found.len(),
                "analyzer finished"
            );
            insights.extend(found);
        }

        let report = aggregate(insights, days, ctx.as_of, ctx.trends.to_vec());
        debug!(
            report_id = %report.report_id,
            insights = report.insights.len(),
            urgent = report.has_urgent_insights(),
            "insight report generated"
        );
        report
    }
}

fn earliest_record(ctx: &AnalysisContext<'_>) -> Option<DateTime<Utc>> {
    let cycles = ctx.period_cycles.unwrap_or_default();

    ctx.health_metrics
        .iter()
        .map(|m| m.date)
        .chain(ctx.workouts.iter().map(|w| w.date))
        .chain(ctx.hydration.iter().map(|h| h.timestamp))
        .chain(ctx.moods.iter().map(|m| m.timestamp))
        .chain(ctx.food.iter().map(|f| f.timestamp))
        .chain(cycles.iter().map(|c| c.start_date))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{as_of, days_ago, metric, mood, workout};
    use crate::types::{Insight, InsightCategory, Severity};
    use pretty_assertions::assert_eq;

    fn ids(report: &InsightReport) -> Vec<&str> {
        report.insights.iter().map(|i| i.id.as_str()).collect()
    }

    fn stressed_fortnight() -> Vec<HealthMetricSample> {
        (0..14)
            .map(|day| {
                let mut m = metric(day);
                m.stress_level = Some(9);
                m
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_insufficient() {
        let report = generate_insights(&[], &[], &[], &[], &[], None, as_of());

        assert_eq!(ids(&report), vec!["insufficient_data"]);
        assert_eq!(report.insights[0].severity, Severity::Info);
        assert_eq!(report.days_of_data, 0);
        assert!(!report.is_sufficient());
        assert!(report.trends.is_empty());
    }

    #[test]
    fn test_short_history_is_insufficient() {
        // Two days of severe stress is not enough history to analyze
        let metrics: Vec<_> = (0..2)
            .map(|day| {
                let mut m = metric(day);
                m.stress_level = Some(10);
                m
            })
            .collect();
        let moods = vec![mood(1, "terrible", 1), mood(2, "terrible", 1)];

        let report = generate_insights(&metrics, &[], &[], &moods, &[], None, as_of());
        assert_eq!(ids(&report), vec!["insufficient_data"]);
        assert_eq!(report.days_of_data, 2);
    }

    #[test]
    fn test_three_days_is_enough() {
        let metrics = vec![metric(3)];
        let report = generate_insights(&metrics, &[], &[], &[], &[], None, as_of());
        assert!(report.is_sufficient());
        assert!(report.insights.is_empty());
        assert_eq!(report.days_of_data, 3);
    }

    #[test]
    fn test_chronic_stress_report() {
        let metrics = stressed_fortnight();
        let report = generate_insights(&metrics, &[], &[], &[], &[], None, as_of());

        let chronic: Vec<&Insight> = report
            .insights
            .iter()
            .filter(|i| i.title == "Chronic High Stress")
            .collect();
        assert_eq!(chronic.len(), 1);
        assert_eq!(chronic[0].severity, Severity::Critical);
        assert_eq!(ids(&report), vec!["chronic_stress"]);
        assert_eq!(report.count_by_category(InsightCategory::Stress), 1);
        assert!(report.has_urgent_insights());
    }

    #[test]
    fn test_dehydration_without_high_activity() {
        let drinks: Vec<HydrationSample> = (0..14)
            .map(|day| HydrationSample {
                timestamp: days_ago(day),
                amount_ml: 1000.0,
            })
            .collect();

        let report = generate_insights(&[], &[], &drinks, &[], &[], None, as_of());
        let found = ids(&report);

        assert!(found.contains(&"dehydration_risk"));
        assert!(!found.contains(&"low_hydration_high_activity"));
        let insight = report
            .insights
            .iter()
            .find(|i| i.title == "Dehydration Risk")
            .unwrap();
        assert_eq!(insight.severity, Severity::Warning);
    }

    #[test]
    fn test_exercise_gap_report() {
        let workouts = vec![workout(20)];
        let report = generate_insights(&[], &workouts, &[], &[], &[], None, as_of());

        let gap = report
            .insights
            .iter()
            .find(|i| i.title == "Exercise Gap Detected")
            .unwrap();
        assert_eq!(gap.severity, Severity::Attention);
        assert_eq!(report.days_of_data, 20);
    }

    #[test]
    fn test_report_is_sorted_by_severity() {
        let metrics = stressed_fortnight();
        let workouts = vec![workout(20)];
        let moods = vec![mood(1, "bad", 4), mood(2, "bad", 4), mood(3, "bad", 4)];

        let report = generate_insights(&metrics, &workouts, &[], &moods, &[], None, as_of());
        assert_eq!(
            ids(&report),
            vec!["chronic_stress", "low_mood_pattern", "exercise_gap"]
        );

        let mut resorted = report.insights.clone();
        crate::aggregator::sort_by_severity(&mut resorted);
        assert_eq!(resorted, report.insights);
    }

    #[test]
    fn test_same_input_same_report() {
        let metrics = stressed_fortnight();
        let workouts = vec![workout(20)];

        let first = generate_insights(&metrics, &workouts, &[], &[], &[], None, as_of());
        let second = generate_insights(&metrics, &workouts, &[], &[], &[], None, as_of());
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_from_input_matches_slices() {
        let input = InsightInput {
            health_metrics: stressed_fortnight(),
            workouts: vec![workout(20)],
            ..Default::default()
        };
        let engine = InsightsEngine::new();

        let from_input = engine.generate_from_input(&input, as_of());
        let from_slices = engine.generate(
            &input.health_metrics,
            &input.workouts,
            &[],
            &[],
            &[],
            None,
            as_of(),
        );
        assert_eq!(from_input, from_slices);
    }

    #[test]
    fn test_report_carries_trends() {
        let metrics = stressed_fortnight();
        let report = generate_insights(&metrics, &[], &[], &[], &[], None, as_of());

        assert_eq!(report.trends.len(), 1);
        assert_eq!(report.trends[0].metric, "stress_level");
        assert_eq!(report.trends[0].current_average, 9.0);
    }

    #[test]
    fn test_custom_config() {
        let mut config = InsightConfig::default();
        config.thresholds.chronic_stress_days = 20;
        config.thresholds.elevated_stress_days = 10;
        let engine = InsightsEngine::with_config(config).unwrap();

        let metrics = stressed_fortnight();
        let report = engine.generate(&metrics, &[], &[], &[], &[], None, as_of());
        assert_eq!(ids(&report), vec!["elevated_stress"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = InsightConfig::default().with_windows(0, 90);
        assert!(InsightsEngine::with_config(config).is_err());
    }

    #[test]
    fn test_custom_analyzer_set() {
        let engine = InsightsEngine::new()
            .with_analyzers(vec![Box::new(crate::analyzers::ActivityAnalyzer)]);
        assert_eq!(engine.analyzer_names(), vec!["activity"]);

        let metrics = stressed_fortnight();
        let report = engine.generate(&metrics, &[workout(20)], &[], &[], &[], None, as_of());
        assert_eq!(ids(&report), vec!["exercise_gap"]);
    }
}
