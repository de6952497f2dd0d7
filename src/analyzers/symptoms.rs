//! Symptom risk analyzer
//!
//! Symptoms from the daily entries in the recent window are pooled by name,
//! keeping the highest severity logged for each. The pool is graded into one
//! of four risk tiers, and each symptom is matched against body-system
//! patterns to name the likely systems involved. When the leading system is
//! cardiovascular, or chest pain was logged, the insight moves from the
//! `general` category to `cardiovascular`.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::config::Thresholds;
use crate::types::{Insight, InsightCategory, Severity};
use std::collections::BTreeMap;

pub const SYMPTOM_RISK_CRITICAL: RuleSpec = RuleSpec {
    key: "symptom_risk_critical",
    title: "Symptoms Need Urgent Attention",
    severity: Severity::Critical,
    category: InsightCategory::General,
    analyzer: "symptoms",
};

pub const SYMPTOM_RISK_HIGH: RuleSpec = RuleSpec {
    key: "symptom_risk_high",
    title: "Significant Symptoms",
    severity: Severity::Attention,
    category: InsightCategory::General,
    analyzer: "symptoms",
};

pub const SYMPTOM_RISK_MODERATE: RuleSpec = RuleSpec {
    key: "symptom_risk_moderate",
    title: "Recurring Symptoms",
    severity: Severity::Warning,
    category: InsightCategory::General,
    analyzer: "symptoms",
};

pub const SYMPTOM_RISK_LOW: RuleSpec = RuleSpec {
    key: "symptom_risk_low",
    title: "Mild Symptoms Logged",
    severity: Severity::Info,
    category: InsightCategory::General,
    analyzer: "symptoms",
};

const CARDIOVASCULAR: &str = "Cardiovascular";

/// Body systems and the symptom names that point to them. A symptom counts
/// toward the first system with a matching pattern only.
const BODY_SYSTEMS: &[(&str, &[&str])] = &[
    (
        CARDIOVASCULAR,
        &[
            "chest pain",
            "shortness of breath",
            "irregular heartbeat",
            "palpitations",
            "dizziness",
            "fainting",
        ],
    ),
    (
        "Respiratory",
        &[
            "cough",
            "shortness of breath",
            "wheezing",
            "chest tightness",
            "difficulty breathing",
        ],
    ),
    (
        "Gastrointestinal",
        &[
            "nausea",
            "vomiting",
            "diarrhea",
            "abdominal pain",
            "bloating",
            "constipation",
            "heartburn",
        ],
    ),
    (
        "Neurological",
        &[
            "headache",
            "migraine",
            "dizziness",
            "numbness",
            "tingling",
            "confusion",
            "memory loss",
        ],
    ),
    (
        "Musculoskeletal",
        &["joint pain", "muscle pain", "back pain", "stiffness", "swelling"],
    ),
    (
        "Endocrine/Metabolic",
        &[
            "fatigue",
            "weight changes",
            "excessive thirst",
            "frequent urination",
            "hot flashes",
            "cold intolerance",
        ],
    ),
    (
        "Mental Health",
        &[
            "anxiety",
            "depression",
            "mood swings",
            "insomnia",
            "stress",
            "panic attacks",
        ],
    ),
    (
        "Gynecological",
        &[
            "irregular periods",
            "heavy bleeding",
            "pelvic pain",
            "cramps",
            "spotting",
        ],
    ),
    (
        "Dermatological",
        &["rash", "itching", "skin changes", "hives", "acne"],
    ),
    (
        "General/Systemic",
        &[
            "fever",
            "chills",
            "night sweats",
            "fatigue",
            "weakness",
            "loss of appetite",
        ],
    ),
];

/// First body system whose patterns contain, or are contained in, the symptom
fn body_system(symptom: &str) -> Option<usize> {
    BODY_SYSTEMS.iter().position(|(_, patterns)| {
        patterns
            .iter()
            .any(|p| p.contains(symptom) || symptom.contains(*p))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RiskTier {
    Critical,
    High,
    Moderate,
    Low,
}

impl RiskTier {
    fn grade(
        count: usize,
        max_severity: u8,
        mean_severity: f64,
        chest_pain: bool,
        t: &Thresholds,
    ) -> Self {
        if count >= t.symptom_critical_count
            || max_severity >= t.symptom_critical_severity
            || chest_pain
        {
            RiskTier::Critical
        } else if count >= t.symptom_high_count || mean_severity >= t.symptom_high_mean_severity {
            RiskTier::High
        } else if count >= t.symptom_moderate_count
            || mean_severity >= t.symptom_moderate_mean_severity
        {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    fn rule(self) -> &'static RuleSpec {
        match self {
            RiskTier::Critical => &SYMPTOM_RISK_CRITICAL,
            RiskTier::High => &SYMPTOM_RISK_HIGH,
            RiskTier::Moderate => &SYMPTOM_RISK_MODERATE,
            RiskTier::Low => &SYMPTOM_RISK_LOW,
        }
    }

    fn recommendations(self) -> [&'static str; 2] {
        match self {
            RiskTier::Critical => [
                "Seek immediate medical attention",
                "Call emergency services if symptoms are severe or getting worse",
            ],
            RiskTier::High => [
                "Schedule an appointment within the next 24-48 hours",
                "Keep logging each symptom and its severity",
            ],
            RiskTier::Moderate => [
                "Book a checkup with your healthcare provider within a week",
                "Note when symptoms start and what eases them",
            ],
            RiskTier::Low => [
                "Keep tracking your symptoms",
                "Seek care if they get worse or new ones appear",
            ],
        }
    }
}

/// Symptom analyzer over daily health entries
pub struct SymptomAnalyzer;

impl SymptomAnalyzer {
    /// Distinct symptom names (lowercase) with the highest severity logged
    fn pool(ctx: &AnalysisContext<'_>, window: i64) -> BTreeMap<String, u8> {
        let mut pool: BTreeMap<String, u8> = BTreeMap::new();

        for m in ctx.metrics_within(window) {
            let mut severities: BTreeMap<String, u8> = BTreeMap::new();
            for (name, &sev) in &m.symptom_severity {
                let entry = severities.entry(name.trim().to_lowercase()).or_insert(0);
                *entry = (*entry).max(sev);
            }

            let names = m
                .symptoms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .chain(severities.keys().cloned());

            for name in names {
                if name.is_empty() {
                    continue;
                }
                let severity = severities.get(&name).copied().unwrap_or(0);
                let entry = pool.entry(name).or_insert(0);
                *entry = (*entry).max(severity);
            }
        }

        pool
    }
}

impl InsightAnalyzer for SymptomAnalyzer {
    fn name(&self) -> &'static str {
        "symptoms"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.recent_days;

        let pool = Self::pool(ctx, window);
        if pool.is_empty() {
            return Vec::new();
        }

        let count = pool.len();
        let max_severity = pool.values().copied().max().unwrap_or(0);
        let mean_severity = pool.values().map(|&s| f64::from(s)).sum::<f64>() / count as f64;
        let chest_pain = pool.keys().any(|name| name.contains("chest pain"));

        let mut scores = vec![0u32; BODY_SYSTEMS.len()];
        for (name, &severity) in &pool {
            if let Some(system) = body_system(name) {
                scores[system] += u32::from(severity);
            }
        }
        let mut ranked: Vec<(usize, u32)> = scores
            .into_iter()
            .enumerate()
            .filter(|&(_, score)| score > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let leading: Vec<&str> = ranked
            .iter()
            .take(3)
            .map(|&(system, _)| BODY_SYSTEMS[system].0)
            .collect();

        let tier = RiskTier::grade(count, max_severity, mean_severity, chest_pain, t);

        let mut factors = vec![
            format!("{count} distinct symptoms in the last {window} days"),
            format!("Highest severity {max_severity}/10, average {mean_severity:.1}/10"),
        ];
        if chest_pain {
            factors.push("Chest pain reported".to_string());
        }
        if leading.is_empty() {
            factors.push("No specific pattern; general symptoms".to_string());
        } else {
            factors.push(format!("Possible patterns: {}", leading.join(", ")));
        }

        let symptom_list: Vec<&str> = pool.keys().map(String::as_str).collect();
        let mut insight = tier
            .rule()
            .insight(ctx.as_of)
            .with_explanation(format!(
                "You logged {} recently. These symptoms may need a healthcare provider's \
                 evaluation.",
                symptom_list.join(", ")
            ))
            .with_factors(factors)
            .with_recommendations(tier.recommendations());

        if chest_pain || leading.first() == Some(&CARDIOVASCULAR) {
            insight.category = InsightCategory::Cardiovascular;
        }

        vec![insight]
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn logged(fixture: &mut Fixture, day: i64, symptoms: &[(&str, u8)]) {
        let mut m = metric(day);
        for &(name, severity) in symptoms {
            m.symptoms.push(name.to_string());
            m.symptom_severity.insert(name.to_string(), severity);
        }
        fixture.input.health_metrics.push(m);
    }

    fn analyze(fixture: &Fixture) -> Vec<Insight> {
        SymptomAnalyzer.analyze(&fixture.ctx())
    }

    #[test]
    fn test_no_symptoms_is_silent() {
        let mut fixture = Fixture::default();
        fixture.input.health_metrics = (0..10).map(metric).collect();
        assert!(analyze(&fixture).is_empty());
    }

    #[test]
    fn test_critical_by_symptom_count() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("headache", 2), ("nausea", 2), ("rash", 2)]);
        logged(&mut fixture, 3, &[("cough", 2), ("back pain", 2)]);

        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_critical"]);
        assert_eq!(insights[0].severity, Severity::Critical);
        // Respiratory leads on a tie, so the category stays general
        assert_eq!(insights[0].category, InsightCategory::General);
    }

    #[test]
    fn test_critical_by_max_severity() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 2, &[("migraine", 8)]);

        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_critical"]);
        assert!(insights[0]
            .factors
            .contains(&"Possible patterns: Neurological".to_string()));
    }

    #[test]
    fn test_chest_pain_is_critical_and_cardiovascular() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("Chest Pain", 3)]);

        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_critical"]);
        assert_eq!(insights[0].category, InsightCategory::Cardiovascular);
        assert!(insights[0].factors.contains(&"Chest pain reported".to_string()));
    }

    #[test]
    fn test_high_tier() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("headache", 2), ("nausea", 2), ("rash", 2)]);
        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_high"]);
        assert_eq!(insights[0].severity, Severity::Attention);

        // A single symptom at average severity 6
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("joint pain", 6)]);
        assert_eq!(keys(&analyze(&fixture)), vec!["symptom_risk_high"]);
    }

    #[test]
    fn test_moderate_tier() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("bloating", 1), ("acne", 1)]);
        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_moderate"]);
        assert_eq!(insights[0].severity, Severity::Warning);

        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("fever", 4)]);
        assert_eq!(keys(&analyze(&fixture)), vec!["symptom_risk_moderate"]);
    }

    #[test]
    fn test_low_tier() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("itching", 2)]);

        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_low"]);
        assert_eq!(insights[0].severity, Severity::Info);
        assert_eq!(insights[0].category, InsightCategory::General);
    }

    #[test]
    fn test_cardiovascular_pattern_sets_category() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("palpitations", 5), ("dizziness", 5)]);

        let insights = analyze(&fixture);
        assert_eq!(keys(&insights), vec!["symptom_risk_moderate"]);
        assert_eq!(insights[0].category, InsightCategory::Cardiovascular);
        assert!(insights[0]
            .factors
            .contains(&"Possible patterns: Cardiovascular".to_string()));
    }

    #[test]
    fn test_repeated_symptom_counts_once_at_highest_severity() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 1, &[("Headache", 3)]);
        logged(&mut fixture, 2, &[("headache", 5)]);
        logged(&mut fixture, 3, &[(" headache ", 4)]);

        let insights = analyze(&fixture);
        // One symptom at severity 5: moderate, not high by count
        assert_eq!(keys(&insights), vec!["symptom_risk_moderate"]);
        assert!(insights[0]
            .factors
            .contains(&"1 distinct symptoms in the last 14 days".to_string()));
    }

    #[test]
    fn test_symptoms_outside_window_are_ignored() {
        let mut fixture = Fixture::default();
        logged(&mut fixture, 30, &[("chest pain", 9)]);
        logged(&mut fixture, 1, &[("itching", 1)]);

        assert_eq!(keys(&analyze(&fixture)), vec!["symptom_risk_low"]);
    }

    #[test]
    fn test_unrated_and_severity_only_symptoms() {
        let mut fixture = Fixture::default();
        let mut m = metric(1);
        m.symptoms.push("cough".to_string());
        m.symptom_severity.insert("fatigue".to_string(), 1);
        fixture.input.health_metrics.push(m);

        let insights = analyze(&fixture);
        // Two distinct symptoms, average severity 0.5
        assert_eq!(keys(&insights), vec!["symptom_risk_moderate"]);
    }
}
