//! Windowing and trend calculation
//!
//! Every series is split relative to `as_of` into a recent window
//! (age <= recent days) and a baseline window (recent days < age <= baseline
//! days). Trends compare the mean of the two windows.

use crate::config::WindowConfig;
use crate::types::{MetricTrend, TrendDirection};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Whole days between `timestamp` and `now` (negative for future records)
pub fn age_in_days(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> i64 {
    (now - timestamp).num_days()
}

/// True when the record falls within the trailing `days` window
pub fn within_days(now: DateTime<Utc>, timestamp: DateTime<Utc>, days: i64) -> bool {
    age_in_days(now, timestamp) <= days
}

/// True when `after_days < age <= through_days`
pub fn within_range(
    now: DateTime<Utc>,
    timestamp: DateTime<Utc>,
    after_days: i64,
    through_days: i64,
) -> bool {
    let age = age_in_days(now, timestamp);
    age > after_days && age <= through_days
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Percent change from baseline; zero when the baseline is exactly zero
pub fn percent_change(current: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    ((current - baseline) / baseline) * 100.0
}

/// Computes `MetricTrend`s over a recent and a baseline window
#[derive(Debug, Clone, Copy)]
pub struct TrendCalculator {
    recent_days: i64,
    baseline_days: i64,
}

impl Default for TrendCalculator {
    fn default() -> Self {
        Self::from_config(&WindowConfig::default())
    }
}

impl TrendCalculator {
    pub fn new(recent_days: i64, baseline_days: i64) -> Self {
        Self {
            recent_days,
            baseline_days,
        }
    }

    pub fn from_config(windows: &WindowConfig) -> Self {
        Self::new(windows.recent_days, windows.baseline_days)
    }

    /// Trend of a value series. Absent values are dropped.
    ///
    /// Returns `None` when the recent window has no values. An empty baseline
    /// falls back to the recent mean, giving a stable 0% trend.
    pub fn value_trend(
        &self,
        metric: &str,
        points: &[(DateTime<Utc>, Option<f64>)],
        now: DateTime<Utc>,
        threshold_pct: f64,
    ) -> Option<MetricTrend> {
        let mut recent = Vec::new();
        let mut baseline = Vec::new();

        for &(date, value) in points {
            let Some(value) = value else { continue };
            if within_days(now, date, self.recent_days) {
                recent.push(value);
            } else if within_range(now, date, self.recent_days, self.baseline_days) {
                baseline.push(value);
            }
        }

        let current_average = mean(&recent)?;
        let baseline_average = mean(&baseline).unwrap_or(current_average);

        Some(Self::build_trend(
            metric,
            current_average,
            baseline_average,
            recent.len() + baseline.len(),
            threshold_pct,
        ))
    }

    /// Trend of event frequency, expressed as events per week in each window.
    ///
    /// A recent window without events is a rate of zero, not missing data.
    /// Returns `None` only when neither window has an event.
    pub fn count_trend(
        &self,
        metric: &str,
        timestamps: &[DateTime<Utc>],
        now: DateTime<Utc>,
        threshold_pct: f64,
    ) -> Option<MetricTrend> {
        let recent_count = timestamps
            .iter()
            .filter(|&&ts| within_days(now, ts, self.recent_days))
            .count();
        let baseline_count = timestamps
            .iter()
            .filter(|&&ts| within_range(now, ts, self.recent_days, self.baseline_days))
            .count();
        if recent_count == 0 && baseline_count == 0 {
            return None;
        }

        let recent_weeks = self.recent_days as f64 / 7.0;
        let baseline_weeks = (self.baseline_days - self.recent_days) as f64 / 7.0;

        let current_average = recent_count as f64 / recent_weeks;
        let baseline_average = if baseline_count == 0 || baseline_weeks <= 0.0 {
            current_average
        } else {
            baseline_count as f64 / baseline_weeks
        };

        Some(Self::build_trend(
            metric,
            current_average,
            baseline_average,
            recent_count + baseline_count,
            threshold_pct,
        ))
    }

    /// Mean of per-day totals over the trailing `window_days`.
    ///
    /// Only days with at least one record contribute to the mean.
    pub fn daily_total_average(
        points: &[(DateTime<Utc>, f64)],
        now: DateTime<Utc>,
        window_days: i64,
    ) -> Option<f64> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for &(ts, amount) in points {
            if within_days(now, ts, window_days) {
                *totals.entry(ts.date_naive()).or_insert(0.0) += amount;
            }
        }

        let daily: Vec<f64> = totals.into_values().collect();
        mean(&daily)
    }

    fn build_trend(
        metric: &str,
        current_average: f64,
        baseline_average: f64,
        sample_count: usize,
        threshold_pct: f64,
    ) -> MetricTrend {
        let percent_change = percent_change(current_average, baseline_average);

        MetricTrend {
            metric: metric.to_string(),
            current_average,
            baseline_average,
            percent_change,
            direction: TrendDirection::from_percent_change(percent_change, threshold_pct),
            sample_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    #[test]
    fn test_window_boundaries() {
        assert!(within_days(now(), days_ago(14), 14));
        assert!(!within_days(now(), days_ago(15), 14));
        assert!(within_range(now(), days_ago(15), 14, 90));
        assert!(within_range(now(), days_ago(90), 14, 90));
        assert!(!within_range(now(), days_ago(91), 14, 90));
        assert!(!within_range(now(), days_ago(14), 14, 90));
    }

    #[test]
    fn test_empty_recent_window_gives_no_trend() {
        let calc = TrendCalculator::default();
        let points = vec![(days_ago(30), Some(70.0)), (days_ago(40), Some(71.0))];
        assert!(calc.value_trend("weight", &points, now(), 2.0).is_none());

        // Recent records without values do not count either
        let points = vec![(days_ago(1), None), (days_ago(30), Some(70.0))];
        assert!(calc.value_trend("weight", &points, now(), 2.0).is_none());
    }

    #[test]
    fn test_empty_baseline_is_stable() {
        let calc = TrendCalculator::default();
        let points = vec![(days_ago(1), Some(80.0)), (days_ago(3), Some(82.0))];
        let trend = calc.value_trend("weight", &points, now(), 2.0).unwrap();

        assert_eq!(trend.current_average, 81.0);
        assert_eq!(trend.baseline_average, 81.0);
        assert_eq!(trend.percent_change, 0.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.sample_count, 2);
    }

    #[test]
    fn test_increasing_trend() {
        let calc = TrendCalculator::default();
        let points = vec![
            (days_ago(2), Some(77.0)),
            (days_ago(5), Some(79.0)),
            (days_ago(30), Some(74.0)),
            (days_ago(60), Some(76.0)),
            // Outside the baseline window
            (days_ago(120), Some(10.0)),
        ];
        let trend = calc.value_trend("weight", &points, now(), 2.0).unwrap();

        assert_eq!(trend.current_average, 78.0);
        assert_eq!(trend.baseline_average, 75.0);
        assert!((trend.percent_change - 4.0).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.sample_count, 4);
    }

    #[test]
    fn test_small_change_is_stable() {
        let calc = TrendCalculator::default();
        let points = vec![(days_ago(2), Some(101.0)), (days_ago(30), Some(100.0))];
        let trend = calc.value_trend("sleep", &points, now(), 2.0).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_zero_baseline_guard() {
        let calc = TrendCalculator::default();
        let points = vec![(days_ago(2), Some(3.0)), (days_ago(30), Some(0.0))];
        let trend = calc.value_trend("stress", &points, now(), 2.0).unwrap();

        assert_eq!(trend.percent_change, 0.0);
        assert!(trend.percent_change.is_finite());
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_count_trend_weekly_rates() {
        let calc = TrendCalculator::default();
        // 2 workouts in the recent 14 days = 1/week
        // 38 workouts in the 76 baseline days = 3.5/week
        let mut timestamps = vec![days_ago(1), days_ago(8)];
        for i in 0..38 {
            timestamps.push(days_ago(15 + (i * 2 % 75)));
        }

        let trend = calc
            .count_trend("workout_frequency", &timestamps, now(), 15.0)
            .unwrap();
        assert!((trend.current_average - 1.0).abs() < 1e-9);
        assert!((trend.baseline_average - 3.5).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert_eq!(trend.sample_count, 40);
    }

    #[test]
    fn test_count_trend_without_events() {
        let calc = TrendCalculator::default();
        assert!(calc
            .count_trend("workout_frequency", &[], now(), 15.0)
            .is_none());

        // Events older than the baseline window do not count
        assert!(calc
            .count_trend("workout_frequency", &[days_ago(120)], now(), 15.0)
            .is_none());
    }

    #[test]
    fn test_count_trend_drop_to_zero() {
        let calc = TrendCalculator::default();
        // 19 workouts over the 76 baseline days = 1.75/week, none recently
        let timestamps: Vec<_> = (0..19).map(|i| days_ago(15 + i * 4)).collect();

        let trend = calc
            .count_trend("workout_frequency", &timestamps, now(), 15.0)
            .unwrap();
        assert_eq!(trend.current_average, 0.0);
        assert!((trend.baseline_average - 1.75).abs() < 1e-9);
        assert!((trend.percent_change + 100.0).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert_eq!(trend.sample_count, 19);
    }

    #[test]
    fn test_daily_total_average() {
        let day1 = Utc.with_ymd_and_hms(2024, 6, 29, 8, 0, 0).unwrap();
        let day1_late = Utc.with_ymd_and_hms(2024, 6, 29, 18, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 6, 27, 9, 0, 0).unwrap();
        let old = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        let points = vec![
            (day1, 500.0),
            (day1_late, 700.0),
            (day2, 800.0),
            (old, 5000.0),
        ];

        let avg = TrendCalculator::daily_total_average(&points, now(), 14).unwrap();
        // (1200 + 800) / 2
        assert!((avg - 1000.0).abs() < 1e-9);

        assert!(TrendCalculator::daily_total_average(&[(old, 100.0)], now(), 14).is_none());
    }

    #[test]
    fn test_mean_and_percent_change() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert!((percent_change(110.0, 100.0) - 10.0).abs() < 1e-9);
        assert!((percent_change(90.0, 100.0) + 10.0).abs() < 1e-9);
        assert_eq!(percent_change(5.0, 0.0), 0.0);
    }
}
