//! Per-dimension analyzers
//!
//! Each analyzer inspects the series it cares about and emits zero or more
//! insights. Analyzers are independent of each other; the engine runs them in
//! registration order and concatenates their output.

mod activity;
mod correlation;
mod hydration;
mod menstrual;
mod mood;
mod nutrition;
mod recovery;
mod sleep;
mod stress;
mod symptoms;
mod weight;

pub use activity::{ActivityAnalyzer, EXERCISE_CONSISTENCY, EXERCISE_GAP};
pub use correlation::{ExerciseMoodAnalyzer, EXERCISE_MOOD_BOOST};
pub use hydration::{HydrationAnalyzer, DEHYDRATION_RISK, LOW_HYDRATION_HIGH_ACTIVITY};
pub use menstrual::{MenstrualAnalyzer, IRREGULAR_CYCLE};
pub use mood::{MoodAnalyzer, LOW_MOOD_PATTERN, PERSISTENT_LOW_MOOD};
pub use nutrition::{NutritionAnalyzer, BREAKFAST_SKIPPING, LOW_CALORIE_INTAKE, LOW_PROTEIN};
pub use recovery::{RecoveryAnalyzer, OVERTRAINING_RISK};
pub use sleep::{SleepAnalyzer, INSUFFICIENT_SLEEP, SLEEP_DECLINE};
pub use stress::{StressAnalyzer, CHRONIC_STRESS, ELEVATED_STRESS};
pub use symptoms::{
    SymptomAnalyzer, SYMPTOM_RISK_CRITICAL, SYMPTOM_RISK_HIGH, SYMPTOM_RISK_LOW,
    SYMPTOM_RISK_MODERATE,
};
pub use weight::{WeightAnalyzer, RAPID_WEIGHT_LOSS, WEIGHT_GAIN_LOW_ACTIVITY};

use crate::config::InsightConfig;
use crate::trend::TrendCalculator;
use crate::types::{
    FoodLogSample, HealthMetricSample, HydrationSample, Insight, InsightCategory, InsightInput,
    MetricTrend, MoodSample, PeriodCycle, Severity, WorkoutSample,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Static description of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleSpec {
    /// Insight id emitted when the rule fires
    pub key: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub category: InsightCategory,
    /// Analyzer that owns the rule
    pub analyzer: &'static str,
}

impl RuleSpec {
    /// Start an insight carrying this rule's identity
    pub fn insight(&self, generated_at: DateTime<Utc>) -> Insight {
        Insight::new(
            self.key,
            self.title,
            self.severity,
            self.category,
            generated_at,
        )
    }
}

/// Emitted instead of running analyzers when history is too short
pub const INSUFFICIENT_DATA: RuleSpec = RuleSpec {
    key: "insufficient_data",
    title: "Not Enough Data Yet",
    severity: Severity::Info,
    category: InsightCategory::General,
    analyzer: "engine",
};

/// Every rule the engine can emit, in analyzer order
pub const RULES: &[RuleSpec] = &[
    WEIGHT_GAIN_LOW_ACTIVITY,
    RAPID_WEIGHT_LOSS,
    SLEEP_DECLINE,
    INSUFFICIENT_SLEEP,
    LOW_HYDRATION_HIGH_ACTIVITY,
    DEHYDRATION_RISK,
    CHRONIC_STRESS,
    ELEVATED_STRESS,
    PERSISTENT_LOW_MOOD,
    LOW_MOOD_PATTERN,
    LOW_CALORIE_INTAKE,
    LOW_PROTEIN,
    BREAKFAST_SKIPPING,
    EXERCISE_GAP,
    EXERCISE_CONSISTENCY,
    OVERTRAINING_RISK,
    EXERCISE_MOOD_BOOST,
    IRREGULAR_CYCLE,
    SYMPTOM_RISK_CRITICAL,
    SYMPTOM_RISK_HIGH,
    SYMPTOM_RISK_MODERATE,
    SYMPTOM_RISK_LOW,
    INSUFFICIENT_DATA,
];

/// Look up a rule by its key
pub fn rule(key: &str) -> Option<&'static RuleSpec> {
    RULES.iter().find(|r| r.key == key)
}

/// Trends shared by several analyzers and reported alongside the insights
#[derive(Debug, Clone, Default)]
pub struct TrendSet {
    pub weight: Option<MetricTrend>,
    pub sleep: Option<MetricTrend>,
    pub stress: Option<MetricTrend>,
    pub energy: Option<MetricTrend>,
    pub workout_frequency: Option<MetricTrend>,
}

impl TrendSet {
    /// Compute all shared trends for one call
    pub fn compute(
        health_metrics: &[HealthMetricSample],
        workouts: &[WorkoutSample],
        as_of: DateTime<Utc>,
        config: &InsightConfig,
    ) -> Self {
        let calc = TrendCalculator::from_config(&config.windows);
        let continuous = config.thresholds.continuous_direction_pct;

        let series = |extract: fn(&HealthMetricSample) -> Option<f64>| {
            health_metrics
                .iter()
                .map(|m| (m.date, extract(m)))
                .collect::<Vec<_>>()
        };

        let workout_dates: Vec<DateTime<Utc>> = workouts.iter().map(|w| w.date).collect();

        Self {
            weight: calc.value_trend("weight", &series(|m| m.weight), as_of, continuous),
            sleep: calc.value_trend("sleep_hours", &series(|m| m.sleep_hours), as_of, continuous),
            stress: calc.value_trend(
                "stress_level",
                &series(|m| m.stress_level.map(f64::from)),
                as_of,
                continuous,
            ),
            energy: calc.value_trend(
                "energy_level",
                &series(|m| m.energy_level.map(f64::from)),
                as_of,
                continuous,
            ),
            workout_frequency: calc.count_trend(
                "workout_frequency",
                &workout_dates,
                as_of,
                config.thresholds.count_direction_pct,
            ),
        }
    }

    /// Present trends in a fixed order
    pub fn to_vec(&self) -> Vec<MetricTrend> {
        [
            &self.weight,
            &self.sleep,
            &self.stress,
            &self.energy,
            &self.workout_frequency,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

/// Read-only view over one user's data for a single generation call
pub struct AnalysisContext<'a> {
    pub health_metrics: &'a [HealthMetricSample],
    pub workouts: &'a [WorkoutSample],
    pub hydration: &'a [HydrationSample],
    pub moods: &'a [MoodSample],
    pub food: &'a [FoodLogSample],
    pub period_cycles: Option<&'a [PeriodCycle]>,
    /// Reference instant for every window
    pub as_of: DateTime<Utc>,
    pub config: &'a InsightConfig,
    pub trends: TrendSet,
}

impl<'a> AnalysisContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        health_metrics: &'a [HealthMetricSample],
        workouts: &'a [WorkoutSample],
        hydration: &'a [HydrationSample],
        moods: &'a [MoodSample],
        food: &'a [FoodLogSample],
        period_cycles: Option<&'a [PeriodCycle]>,
        as_of: DateTime<Utc>,
        config: &'a InsightConfig,
    ) -> Self {
        let trends = TrendSet::compute(health_metrics, workouts, as_of, config);
        Self {
            health_metrics,
            workouts,
            hydration,
            moods,
            food,
            period_cycles,
            as_of,
            config,
            trends,
        }
    }

    pub fn from_input(
        input: &'a InsightInput,
        as_of: DateTime<Utc>,
        config: &'a InsightConfig,
    ) -> Self {
        Self::new(
            &input.health_metrics,
            &input.workouts,
            &input.hydration,
            &input.moods,
            &input.food,
            input.period_cycles.as_deref(),
            as_of,
            config,
        )
    }

    /// Health metric entries from the trailing `days`
    pub fn metrics_within(&self, days: i64) -> impl Iterator<Item = &'a HealthMetricSample> + '_ {
        let as_of = self.as_of;
        self.health_metrics
            .iter()
            .filter(move |m| crate::trend::within_days(as_of, m.date, days))
    }

    /// Workouts from the trailing `days`
    pub fn workouts_within(&self, days: i64) -> impl Iterator<Item = &'a WorkoutSample> + '_ {
        let as_of = self.as_of;
        self.workouts
            .iter()
            .filter(move |w| crate::trend::within_days(as_of, w.date, days))
    }

    /// Mood entries from the trailing `days`
    pub fn moods_within(&self, days: i64) -> impl Iterator<Item = &'a MoodSample> + '_ {
        let as_of = self.as_of;
        self.moods
            .iter()
            .filter(move |m| crate::trend::within_days(as_of, m.timestamp, days))
    }
}

/// Trait for per-dimension analyzers
pub trait InsightAnalyzer: Send + Sync {
    /// Short analyzer name used in logs and the rule catalogue
    fn name(&self) -> &'static str;

    /// Inspect the context and emit insights for every rule that fires
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

/// The standard analyzer set, in the order their output is concatenated
pub fn default_analyzers() -> Vec<Box<dyn InsightAnalyzer>> {
    vec![
        Box::new(WeightAnalyzer),
        Box::new(SleepAnalyzer),
        Box::new(HydrationAnalyzer),
        Box::new(StressAnalyzer),
        Box::new(MoodAnalyzer),
        Box::new(NutritionAnalyzer),
        Box::new(ActivityAnalyzer),
        Box::new(RecoveryAnalyzer),
        Box::new(ExerciseMoodAnalyzer),
        Box::new(MenstrualAnalyzer),
        Box::new(SymptomAnalyzer),
    ]
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_keys_are_unique() {
        let keys: HashSet<&str> = RULES.iter().map(|r| r.key).collect();
        assert_eq!(keys.len(), RULES.len());
    }

    #[test]
    fn test_rule_lookup() {
        let spec = rule("chronic_stress").unwrap();
        assert_eq!(spec.title, "Chronic High Stress");
        assert_eq!(spec.severity, Severity::Critical);
        assert!(rule("no_such_rule").is_none());
    }

    #[test]
    fn test_every_analyzer_owns_a_rule() {
        for analyzer in default_analyzers() {
            assert!(
                RULES.iter().any(|r| r.analyzer == analyzer.name()),
                "analyzer {} has no rules",
                analyzer.name()
            );
        }
    }

    #[test]
    fn test_analyzers_are_silent_on_empty_input() {
        let fixture = Fixture::default();
        let ctx = fixture.ctx();
        for analyzer in default_analyzers() {
            assert!(analyzer.analyze(&ctx).is_empty(), "{}", analyzer.name());
        }
    }

    #[test]
    fn test_trend_set_order() {
        let mut fixture = Fixture::default();
        for day in 0..10 {
            let mut m = metric(day);
            m.weight = Some(70.0);
            m.stress_level = Some(4);
            fixture.input.health_metrics.push(m);
        }
        fixture.input.workouts.push(workout(2));

        let ctx = fixture.ctx();
        let metrics: Vec<String> = ctx.trends.to_vec().into_iter().map(|t| t.metric).collect();
        assert_eq!(metrics, vec!["weight", "stress_level", "workout_frequency"]);
    }
}
