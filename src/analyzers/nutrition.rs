//! Nutrition analyzer
//!
//! Daily figures are averaged over the days that have at least one food log,
//! so unlogged days do not drag the averages down.

use super::{AnalysisContext, InsightAnalyzer, RuleSpec};
use crate::trend::within_days;
use crate::types::{FoodLogSample, Insight, InsightCategory, MealType, Severity};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const LOW_CALORIE_INTAKE: RuleSpec = RuleSpec {
    key: "low_calorie_intake",
    title: "Low Calorie Intake",
    severity: Severity::Warning,
    category: InsightCategory::Nutrition,
    analyzer: "nutrition",
};

pub const LOW_PROTEIN: RuleSpec = RuleSpec {
    key: "low_protein",
    title: "Low Protein Intake",
    severity: Severity::Attention,
    category: InsightCategory::Nutrition,
    analyzer: "nutrition",
};

pub const BREAKFAST_SKIPPING: RuleSpec = RuleSpec {
    key: "breakfast_skipping",
    title: "Frequent Breakfast Skipping",
    severity: Severity::Info,
    category: InsightCategory::Nutrition,
    analyzer: "nutrition",
};

#[derive(Debug, Default)]
struct DayIntake {
    calories: f64,
    protein_g: f64,
    had_breakfast: bool,
}

/// Food log analyzer
pub struct NutritionAnalyzer;

impl InsightAnalyzer for NutritionAnalyzer {
    fn name(&self) -> &'static str {
        "nutrition"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = &ctx.config.thresholds;
        let window = ctx.config.windows.short_days;

        let entries: Vec<&FoodLogSample> = ctx
            .food
            .iter()
            .filter(|f| within_days(ctx.as_of, f.timestamp, window))
            .collect();

        if entries.len() < t.min_food_entries {
            return Vec::new();
        }

        let mut days: BTreeMap<NaiveDate, DayIntake> = BTreeMap::new();
        for entry in &entries {
            let day = days.entry(entry.timestamp.date_naive()).or_default();
            day.calories += entry.calories;
            day.protein_g += entry.protein_g;
            day.had_breakfast |= entry.meal_type == MealType::Breakfast;
        }

        let logged_days = days.len();
        let avg_calories = days.values().map(|d| d.calories).sum::<f64>() / logged_days as f64;
        let avg_protein = days.values().map(|d| d.protein_g).sum::<f64>() / logged_days as f64;
        let breakfast_days = days.values().filter(|d| d.had_breakfast).count();

        let mut insights = Vec::new();

        if avg_calories < t.min_daily_calories {
            insights.push(
                LOW_CALORIE_INTAKE
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You logged an average of {avg_calories:.0} kcal per day, which may not \
                         cover your body's needs."
                    ))
                    .with_factors([format!(
                        "{} entries over {logged_days} days",
                        entries.len()
                    )])
                    .with_recommendations([
                        "Eat regular meals with a balance of carbohydrates, protein and fats",
                        "Add nutrient-dense snacks such as nuts, yoghurt or fruit",
                        "Talk to a dietitian before following a low-calorie plan",
                    ]),
            );
        }

        if avg_protein < t.min_daily_protein_g {
            insights.push(
                LOW_PROTEIN
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "Your protein intake averaged {avg_protein:.0} g per day."
                    ))
                    .with_factors([format!("Average protein {avg_protein:.0} g/day")])
                    .with_recommendations([
                        "Include a protein source in every meal",
                        "Try eggs, legumes, fish, tofu or lean meat",
                    ]),
            );
        }

        if breakfast_days * 2 < logged_days {
            insights.push(
                BREAKFAST_SKIPPING
                    .insight(ctx.as_of)
                    .with_explanation(format!(
                        "You logged breakfast on {breakfast_days} of {logged_days} days."
                    ))
                    .with_factors([format!("Breakfast on {breakfast_days}/{logged_days} days")])
                    .with_recommendations([
                        "A simple breakfast helps steady energy through the morning",
                        "Prepare overnight oats or fruit the evening before",
                    ]),
            );
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use chrono::Duration;

    fn meal(days: i64, hour: i64, meal_type: MealType, calories: f64, protein_g: f64) -> FoodLogSample {
        FoodLogSample {
            // as_of is noon, so this keeps the entry on the same calendar day
            timestamp: days_ago(days) - Duration::hours(12) + Duration::hours(hour),
            meal_type,
            calories,
            protein_g,
            carbs_g: 0.0,
            fat_g: 0.0,
        }
    }

    #[test]
    fn test_requires_minimum_entries() {
        let mut fixture = Fixture::default();
        fixture.input.food = (0..4)
            .map(|d| meal(d, 13, MealType::Lunch, 300.0, 5.0))
            .collect();

        assert!(NutritionAnalyzer.analyze(&fixture.ctx()).is_empty());
    }

    #[test]
    fn test_low_calories_and_protein() {
        let mut fixture = Fixture::default();
        fixture.input.food = (0..5)
            .flat_map(|d| {
                [
                    meal(d, 8, MealType::Breakfast, 300.0, 10.0),
                    meal(d, 19, MealType::Dinner, 600.0, 20.0),
                ]
            })
            .collect();

        let insights = NutritionAnalyzer.analyze(&fixture.ctx());
        assert_eq!(keys(&insights), vec!["low_calorie_intake", "low_protein"]);
    }

    #[test]
    fn test_breakfast_skipping() {
        let mut fixture = Fixture::default();
        let mut food = vec![meal(0, 8, MealType::Breakfast, 500.0, 30.0)];
        for d in 0..4 {
            food.push(meal(d, 13, MealType::Lunch, 900.0, 35.0));
            food.push(meal(d, 19, MealType::Dinner, 900.0, 35.0));
        }
        fixture.input.food = food;

        let insights = NutritionAnalyzer.analyze(&fixture.ctx());
        assert_eq!(keys(&insights), vec!["breakfast_skipping"]);
        assert_eq!(insights[0].severity, Severity::Info);
    }

    #[test]
    fn test_breakfast_on_half_the_days_is_fine() {
        let mut fixture = Fixture::default();
        let mut food = Vec::new();
        for d in 0..4 {
            if d % 2 == 0 {
                food.push(meal(d, 8, MealType::Breakfast, 400.0, 20.0));
            }
            food.push(meal(d, 13, MealType::Lunch, 900.0, 30.0));
            food.push(meal(d, 19, MealType::Dinner, 900.0, 30.0));
        }
        fixture.input.food = food;

        assert!(NutritionAnalyzer.analyze(&fixture.ctx()).is_empty());
    }
}
