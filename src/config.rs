//! Engine configuration
//!
//! Window lengths and rule thresholds are policy constants. The defaults below
//! reproduce the reference rule set; hosts may override any of them from JSON.

use crate::error::InsightError;
use serde::{Deserialize, Serialize};

/// Default recent window in days
pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 14;

/// Default total baseline span in days
pub const DEFAULT_BASELINE_WINDOW_DAYS: i64 = 90;

/// Minimum whole days of history before analyzers run
pub const DEFAULT_MIN_DAYS_OF_DATA: u32 = 3;

/// Window lengths, all in days relative to `as_of`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Recent window: records with age <= `recent_days`
    pub recent_days: i64,
    /// Baseline window: records with `recent_days` < age <= `baseline_days`
    pub baseline_days: i64,
    /// Short window used by weekly rules (sleep, mood, nutrition, recovery)
    pub short_days: i64,
    /// Lookback for the exercise gap rule
    pub gap_lookback_days: i64,
    /// Window for the exercise/mood correlation
    pub correlation_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            recent_days: DEFAULT_RECENT_WINDOW_DAYS,
            baseline_days: DEFAULT_BASELINE_WINDOW_DAYS,
            short_days: 7,
            gap_lookback_days: 28,
            correlation_days: 30,
        }
    }
}

/// Rule thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Direction threshold for continuous metrics (percent)
    pub continuous_direction_pct: f64,
    /// Direction threshold for count-based metrics (percent)
    pub count_direction_pct: f64,

    pub weight_gain_pct: f64,
    pub rapid_weight_loss_pct: f64,

    pub sleep_decline_pct: f64,
    pub min_sleep_hours: f64,

    pub hydration_active_ml: f64,
    pub dehydration_ml: f64,
    pub active_workouts_per_week: f64,

    pub high_stress_level: u8,
    pub chronic_stress_days: usize,
    pub elevated_stress_days: usize,

    pub persistent_low_mood_intensity: u8,
    pub low_mood_intensity: u8,
    pub low_mood_entries: usize,

    pub min_food_entries: usize,
    pub min_daily_calories: f64,
    pub min_daily_protein_g: f64,

    pub consistency_workouts: usize,

    pub overtraining_workouts: usize,
    pub low_energy_level: u8,
    pub recovery_stress_level: u8,
    pub recovery_flag_days: usize,

    pub min_mood_entries_for_correlation: usize,
    pub min_workouts_for_correlation: usize,
    pub min_days_per_group: usize,
    pub mood_lift_points: f64,

    pub min_cycle_gap_days: i64,
    pub max_cycle_gap_days: i64,
    pub cycle_deviation_days: f64,

    pub symptom_critical_count: usize,
    pub symptom_critical_severity: u8,
    pub symptom_high_count: usize,
    pub symptom_high_mean_severity: f64,
    pub symptom_moderate_count: usize,
    pub symptom_moderate_mean_severity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            continuous_direction_pct: 2.0,
            count_direction_pct: 15.0,

            weight_gain_pct: 3.0,
            rapid_weight_loss_pct: 5.0,

            sleep_decline_pct: 10.0,
            min_sleep_hours: 6.0,

            hydration_active_ml: 1500.0,
            dehydration_ml: 1200.0,
            active_workouts_per_week: 2.0,

            high_stress_level: 8,
            chronic_stress_days: 5,
            elevated_stress_days: 3,

            persistent_low_mood_intensity: 2,
            low_mood_intensity: 3,
            low_mood_entries: 3,

            min_food_entries: 5,
            min_daily_calories: 1200.0,
            min_daily_protein_g: 40.0,

            consistency_workouts: 6,

            overtraining_workouts: 6,
            low_energy_level: 3,
            recovery_stress_level: 7,
            recovery_flag_days: 2,

            min_mood_entries_for_correlation: 7,
            min_workouts_for_correlation: 3,
            min_days_per_group: 3,
            mood_lift_points: 1.0,

            min_cycle_gap_days: 1,
            max_cycle_gap_days: 59,
            cycle_deviation_days: 7.0,

            symptom_critical_count: 5,
            symptom_critical_severity: 8,
            symptom_high_count: 3,
            symptom_high_mean_severity: 6.0,
            symptom_moderate_count: 2,
            symptom_moderate_mean_severity: 4.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub windows: WindowConfig,
    pub thresholds: Thresholds,
    /// Below this many days of history only the insufficient-data notice is emitted
    pub min_days_of_data: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            windows: WindowConfig::default(),
            thresholds: Thresholds::default(),
            min_days_of_data: DEFAULT_MIN_DAYS_OF_DATA,
        }
    }
}

impl InsightConfig {
    /// Load configuration from JSON; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, InsightError> {
        serde_json::to_string_pretty(self).map_err(|e| InsightError::EncodingError(e.to_string()))
    }

    /// Override the recent and baseline windows
    pub fn with_windows(mut self, recent_days: i64, baseline_days: i64) -> Self {
        self.windows.recent_days = recent_days;
        self.windows.baseline_days = baseline_days;
        self
    }

    /// Check window lengths and thresholds for consistency
    pub fn validate(&self) -> Result<(), InsightError> {
        let w = &self.windows;

        for (name, days) in [
            ("recent_days", w.recent_days),
            ("baseline_days", w.baseline_days),
            ("short_days", w.short_days),
            ("gap_lookback_days", w.gap_lookback_days),
            ("correlation_days", w.correlation_days),
        ] {
            if days <= 0 {
                return Err(InsightError::InvalidConfig(format!(
                    "{name} must be positive, got {days}"
                )));
            }
        }

        if w.baseline_days <= w.recent_days {
            return Err(InsightError::InvalidConfig(format!(
                "baseline_days ({}) must exceed recent_days ({})",
                w.baseline_days, w.recent_days
            )));
        }

        if w.gap_lookback_days <= w.recent_days {
            return Err(InsightError::InvalidConfig(format!(
                "gap_lookback_days ({}) must exceed recent_days ({})",
                w.gap_lookback_days, w.recent_days
            )));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("continuous_direction_pct", t.continuous_direction_pct),
            ("count_direction_pct", t.count_direction_pct),
            ("weight_gain_pct", t.weight_gain_pct),
            ("rapid_weight_loss_pct", t.rapid_weight_loss_pct),
            ("sleep_decline_pct", t.sleep_decline_pct),
            ("min_sleep_hours", t.min_sleep_hours),
            ("hydration_active_ml", t.hydration_active_ml),
            ("dehydration_ml", t.dehydration_ml),
            ("active_workouts_per_week", t.active_workouts_per_week),
            ("min_daily_calories", t.min_daily_calories),
            ("min_daily_protein_g", t.min_daily_protein_g),
            ("mood_lift_points", t.mood_lift_points),
            ("cycle_deviation_days", t.cycle_deviation_days),
            ("symptom_high_mean_severity", t.symptom_high_mean_severity),
            ("symptom_moderate_mean_severity", t.symptom_moderate_mean_severity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InsightError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if t.min_cycle_gap_days > t.max_cycle_gap_days {
            return Err(InsightError::InvalidConfig(format!(
                "cycle gap range is empty ({}..={})",
                t.min_cycle_gap_days, t.max_cycle_gap_days
            )));
        }

        if t.symptom_moderate_count > t.symptom_high_count
            || t.symptom_high_count > t.symptom_critical_count
        {
            return Err(InsightError::InvalidConfig(
                "symptom counts must rise from moderate to high to critical".to_string(),
            ));
        }

        if t.elevated_stress_days > t.chronic_stress_days {
            return Err(InsightError::InvalidConfig(
                "elevated_stress_days must not exceed chronic_stress_days".to_string(),
            ));
        }

        Ok(())
    }
}
