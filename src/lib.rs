//! Healthlog Insights - rule-based health insight engine
//!
//! Turns a user's personal health log (daily metrics, workouts, hydration,
//! moods, food and menstrual cycles) into a ranked list of insights through a
//! deterministic pipeline: data sufficiency check → shared trend computation →
//! per-dimension analyzers → severity-ordered report.
//!
//! ## Modules
//!
//! - **Trends**: Recent-versus-baseline statistics over trailing windows
//! - **Analyzers**: One rule set per health dimension
//! - **Engine**: Runs the analyzers and aggregates the report

pub mod aggregator;
pub mod analyzers;
pub mod config;
pub mod engine;
pub mod error;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::InsightConfig;
pub use engine::{generate_insights, InsightsEngine};
pub use error::InsightError;
pub use types::{
    FoodLogSample, HealthMetricSample, HydrationSample, Insight, InsightCategory, InsightInput,
    InsightReport, MealType, MetricTrend, MoodSample, PeriodCycle, Severity, TrendDirection,
    WorkoutSample,
};

/// Engine version embedded in CLI and FFI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "healthlog-insights";
