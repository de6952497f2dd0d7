//! Core types for Healthlog Insights
//!
//! This module defines the data that flows through the engine: the health log
//! series supplied by the caller, the trend statistics derived from them, and
//! the insights and report handed back.

use crate::error::InsightError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Parse a timestamp given either as RFC 3339 or as a plain `YYYY-MM-DD` date.
///
/// Plain dates resolve to midnight UTC.
pub fn parse_flexible_datetime(s: &str) -> Result<DateTime<Utc>, InsightError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(InsightError::DateParseError(format!(
        "'{s}' is not 'YYYY-MM-DD' or an RFC 3339 timestamp"
    )))
}

fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_flexible_datetime(&s).map_err(serde::de::Error::custom)
}

fn deserialize_optional_flexible_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| parse_flexible_datetime(&s).map_err(serde::de::Error::custom))
        .transpose()
}

// ============================================================================
// Input series
// ============================================================================

/// Daily health metric entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthMetricSample {
    /// Day this entry describes
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub date: DateTime<Utc>,
    /// Body weight (kg)
    #[serde(default)]
    pub weight: Option<f64>,
    /// Sleep duration (hours)
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    /// Free-form mood label
    #[serde(default)]
    pub mood: Option<String>,
    /// Stress level (1-10)
    #[serde(default)]
    pub stress_level: Option<u8>,
    /// Energy level (1-10)
    #[serde(default)]
    pub energy_level: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Whether this was a period day
    #[serde(default)]
    pub is_period_day: bool,
    #[serde(default)]
    pub flow_intensity: Option<String>,
    #[serde(default)]
    pub cycle_day: Option<u32>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Symptom name to severity (1-10)
    #[serde(default)]
    pub symptom_severity: HashMap<String, u8>,
}

/// A logged workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSample {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub date: DateTime<Utc>,
    pub activity_type: String,
    /// Duration (minutes)
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default)]
    pub intensity: Option<String>,
}

/// A single drink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationSample {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub timestamp: DateTime<Utc>,
    /// Amount (ml)
    pub amount_ml: f64,
}

/// A mood check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSample {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub timestamp: DateTime<Utc>,
    /// Mood label, e.g. "great", "good", "okay", "bad", "terrible"
    pub mood: String,
    /// Intensity (1-10, higher is better)
    pub intensity: u8,
}

impl MoodSample {
    /// Case-insensitive label comparison
    pub fn is_labelled(&self, label: &str) -> bool {
        self.mood.trim().eq_ignore_ascii_case(label)
    }
}

/// Meal classification for food logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[serde(other)]
    Other,
}

/// A food log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogSample {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub timestamp: DateTime<Utc>,
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

/// A menstrual cycle record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCycle {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    /// Cycle length (days), when the host already knows it
    #[serde(default)]
    pub cycle_length: Option<u32>,
}

/// All series for one user, as handed over by the host application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightInput {
    /// Reference instant for window calculations
    #[serde(default, deserialize_with = "deserialize_optional_flexible_datetime")]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    pub health_metrics: Vec<HealthMetricSample>,
    #[serde(default)]
    pub workouts: Vec<WorkoutSample>,
    #[serde(default)]
    pub hydration: Vec<HydrationSample>,
    #[serde(default)]
    pub moods: Vec<MoodSample>,
    #[serde(default)]
    pub food: Vec<FoodLogSample>,
    #[serde(default)]
    pub period_cycles: Option<Vec<PeriodCycle>>,
}

impl InsightInput {
    /// Decode an input bundle from JSON
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of records across every series
    pub fn record_count(&self) -> usize {
        self.health_metrics.len()
            + self.workouts.len()
            + self.hydration.len()
            + self.moods.len()
            + self.food.len()
            + self.period_cycles.as_ref().map_or(0, Vec::len)
    }

    /// Earliest timestamp found in any series
    pub fn earliest_timestamp(&self) -> Option<DateTime<Utc>> {
        let cycles = self.period_cycles.as_deref().unwrap_or_default();

        self.health_metrics
            .iter()
            .map(|m| m.date)
            .chain(self.workouts.iter().map(|w| w.date))
            .chain(self.hydration.iter().map(|h| h.timestamp))
            .chain(self.moods.iter().map(|m| m.timestamp))
            .chain(self.food.iter().map(|f| f.timestamp))
            .chain(cycles.iter().map(|c| c.start_date))
            .min()
    }
}

// ============================================================================
// Derived entities
// ============================================================================

/// Qualitative direction of a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a percent change against a direction threshold (in percent)
    pub fn from_percent_change(percent_change: f64, threshold_pct: f64) -> Self {
        if percent_change.abs() < threshold_pct {
            TrendDirection::Stable
        } else if percent_change > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Recent-versus-baseline statistics for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric: String,
    /// Mean over the recent window
    pub current_average: f64,
    /// Mean over the baseline window (recent mean when the baseline is empty)
    pub baseline_average: f64,
    pub percent_change: f64,
    pub direction: TrendDirection,
    /// Samples used across both windows
    pub sample_count: usize,
}

/// Ordinal severity: info < warning < attention < critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Attention,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Attention => "attention",
            Severity::Critical => "critical",
        }
    }

    /// Critical and warning findings count as urgent
    pub fn is_urgent(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Warning)
    }
}

/// Health dimension an insight belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Weight,
    Activity,
    Sleep,
    Hydration,
    Stress,
    Mood,
    Nutrition,
    Menstrual,
    Cardiovascular,
    Recovery,
    /// Engine-level notices such as the insufficient-data sentinel
    General,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Weight => "weight",
            InsightCategory::Activity => "activity",
            InsightCategory::Sleep => "sleep",
            InsightCategory::Hydration => "hydration",
            InsightCategory::Stress => "stress",
            InsightCategory::Mood => "mood",
            InsightCategory::Nutrition => "nutrition",
            InsightCategory::Menstrual => "menstrual",
            InsightCategory::Cardiovascular => "cardiovascular",
            InsightCategory::Recovery => "recovery",
            InsightCategory::General => "general",
        }
    }
}

/// A single finding emitted by an analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Rule key, unique within one report
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub category: InsightCategory,
    pub explanation: String,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        id: &str,
        title: &str,
        severity: Severity,
        category: InsightCategory,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            severity,
            category,
            explanation: String::new(),
            factors: Vec::new(),
            recommendations: Vec::new(),
            generated_at,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = factors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendations<I, S>(mut self, recommendations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations = recommendations.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of one insight generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    /// Deterministic identifier derived from `generated_at` and the insight ids
    pub report_id: Uuid,
    /// Insights ordered critical first, info last
    pub insights: Vec<Insight>,
    /// Whole days between the earliest record and `generated_at`
    pub days_of_data: u32,
    pub generated_at: DateTime<Utc>,
    /// Trend statistics computed along the way
    pub trends: Vec<MetricTrend>,
    /// Number of insights per category
    pub category_breakdown: BTreeMap<InsightCategory, usize>,
}
