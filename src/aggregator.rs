//! Insight aggregation
//!
//! Collects analyzer output into an `InsightReport`: severity ordering,
//! history span, category breakdown and a deterministic report id.

use crate::error::InsightError;
use crate::types::{Insight, InsightCategory, InsightReport, MetricTrend, Severity};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Namespace for report ids (UUID v5)
pub const REPORT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9b7d_4e55_8a01_2f4c_d9e3_b710);

/// Sort critical first and info last; equal severities keep analyzer order
pub fn sort_by_severity(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
}

/// Whole days between the earliest record and `as_of` (0 without records)
pub fn days_of_data(earliest: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> u32 {
    earliest
        .map(|e| (as_of - e).num_days().clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Number of insights per category
pub fn category_breakdown(insights: &[Insight]) -> BTreeMap<InsightCategory, usize> {
    let mut counts = BTreeMap::new();
    for insight in insights {
        *counts.entry(insight.category).or_insert(0) += 1;
    }
    counts
}

/// Identifier that depends only on `as_of` and the emitted insight ids
pub fn report_id(as_of: DateTime<Utc>, insights: &[Insight]) -> Uuid {
    let mut name = as_of.to_rfc3339();
    for insight in insights {
        name.push('/');
        name.push_str(&insight.id);
    }
    Uuid::new_v5(&REPORT_ID_NAMESPACE, name.as_bytes())
}

/// Build the final report from raw analyzer output
pub fn aggregate(
    mut insights: Vec<Insight>,
    days_of_data: u32,
    as_of: DateTime<Utc>,
    trends: Vec<MetricTrend>,
) -> InsightReport {
    sort_by_severity(&mut insights);

    InsightReport {
        report_id: report_id(as_of, &insights),
        category_breakdown: category_breakdown(&insights),
        insights,
        days_of_data,
        generated_at: as_of,
        trends,
    }
}

impl InsightReport {
    /// Insights of exactly the given severity
    pub fn by_severity(&self, severity: Severity) -> Vec<&Insight> {
        self.insights
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Critical and warning insights
    pub fn urgent(&self) -> Vec<&Insight> {
        self.insights
            .iter()
            .filter(|i| i.severity.is_urgent())
            .collect()
    }

    pub fn has_urgent_insights(&self) -> bool {
        self.insights.iter().any(|i| i.severity.is_urgent())
    }

    pub fn count_by_category(&self, category: InsightCategory) -> usize {
        self.category_breakdown.get(&category).copied().unwrap_or(0)
    }

    /// Number of insights per severity, most severe first
    pub fn count_by_severity(&self) -> Vec<(Severity, usize)> {
        [
            Severity::Critical,
            Severity::Attention,
            Severity::Warning,
            Severity::Info,
        ]
        .into_iter()
        .map(|s| (s, self.insights.iter().filter(|i| i.severity == s).count()))
        .collect()
    }

    /// False when the report is only the insufficient-data notice
    pub fn is_sufficient(&self) -> bool {
        !(self.insights.len() == 1
            && self.insights[0].id == crate::analyzers::INSUFFICIENT_DATA.key)
    }

    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    /// Serialize the report to JSON
    pub fn to_json(&self) -> Result<String, InsightError> {
        serde_json::to_string(self).map_err(|e| InsightError::EncodingError(e.to_string()))
    }

    /// Serialize the report to indented JSON
    pub fn to_json_pretty(&self) -> Result<String, InsightError> {
        serde_json::to_string_pretty(self).map_err(|e| InsightError::EncodingError(e.to_string()))
    }
}
