//! # Target-Calorie Food Plan
//!
//! Greedy walk over the catalog that fills a calorie budget with whole units,
//! respecting each food's daily unit cap.

use crate::catalog::FoodCatalogEntry;
use crate::errors::AppResult;
use crate::nutrients::{round_to, Nutrient};
use crate::validation::validate_calorie_target;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One food chosen for the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFood {
    pub food: String,
    pub quantity: u32,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub pros: Option<String>,
    pub cons: Option<String>,
}

/// Macro totals of a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A list of foods approaching a calorie target from below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPlan {
    pub target_calories: f64,
    pub recommended_foods: Vec<PlannedFood>,
    pub total_nutrition: PlanNutrition,
}

/// Build a plan in catalog order until the calorie budget is spent
///
/// Foods without a positive calorie value are skipped. Each food contributes
/// `min(floor(remaining / calories), max_units_per_day or 1)` units.
pub fn recommend_for_target(
    target_calories: f64,
    entries: &[FoodCatalogEntry],
) -> AppResult<FoodPlan> {
    let target_calories = validate_calorie_target(target_calories)?;

    let mut remaining = target_calories;
    let mut plan = Vec::new();
    let mut total = PlanNutrition::default();

    for entry in entries {
        if remaining <= 0.0 {
            break;
        }

        let calories_per_unit = match entry.nutrients.get(Nutrient::Calories) {
            Some(calories) if calories > 0.0 => calories,
            _ => continue,
        };

        let max_units = entry.max_units_per_day.filter(|max| *max > 0).unwrap_or(1);
        let affordable = (remaining / calories_per_unit).floor() as u32;
        let units = affordable.min(max_units);

        if units == 0 {
            debug!(food = %entry.name_singular, calories_per_unit, remaining, "Food does not fit remaining budget");
            continue;
        }

        let per_unit = |nutrient| entry.nutrients.get(nutrient).unwrap_or(0.0);
        let quantity = units as f64;
        let calories = quantity * calories_per_unit;
        let protein = quantity * per_unit(Nutrient::Protein);
        let carbs = quantity * per_unit(Nutrient::Carbs);
        let fat = quantity * per_unit(Nutrient::Fat);

        plan.push(PlannedFood {
            food: entry.name_singular.clone(),
            quantity: units,
            calories: round_to(calories, 1),
            protein: round_to(protein, 1),
            carbs: round_to(carbs, 1),
            fat: round_to(fat, 1),
            pros: entry.pros.clone(),
            cons: entry.cons.clone(),
        });

        total.calories += calories;
        total.protein += protein;
        total.carbs += carbs;
        total.fat += fat;
        remaining -= calories;
    }

    info!(
        target_calories,
        foods = plan.len(),
        planned_calories = total.calories,
        "Built food plan for target"
    );

    Ok(FoodPlan {
        target_calories: round_to(target_calories, 1),
        recommended_foods: plan,
        total_nutrition: PlanNutrition {
            calories: round_to(total.calories, 1),
            protein: round_to(total.protein, 1),
            carbs: round_to(total.carbs, 1),
            fat: round_to(total.fat, 1),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::nutrients::NutrientVector;

    fn food(name: &str, calories: f64, protein: f64, max_units: Option<u32>) -> FoodCatalogEntry {
        let entry = FoodCatalogEntry::new(name, name).with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, calories)
                .with(Nutrient::Protein, protein),
        );
        match max_units {
            Some(max) => entry.with_max_units_per_day(max),
            None => entry,
        }
    }

    #[test]
    fn test_rejects_non_positive_target() {
        assert!(matches!(
            recommend_for_target(0.0, &[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_greedy_plan_respects_caps_and_budget() {
        let entries = vec![
            food("idli", 52.0, 2.0, Some(4)),
            food("water", 0.0, 0.0, Some(10)),
            food("rice", 130.0, 2.7, None),
            food("egg", 78.0, 6.3, Some(3)),
        ];
        let plan = recommend_for_target(400.0, &entries).unwrap();

        // idli: min(floor(400 / 52), 4) = 4 -> 208, remaining 192
        // rice: cap defaults to 1 -> 130, remaining 62
        // egg: floor(62 / 78) = 0 -> skipped
        assert_eq!(plan.recommended_foods.len(), 2);
        assert_eq!(plan.recommended_foods[0].food, "idli");
        assert_eq!(plan.recommended_foods[0].quantity, 4);
        assert_eq!(plan.recommended_foods[1].food, "rice");
        assert_eq!(plan.recommended_foods[1].quantity, 1);
        assert_eq!(plan.total_nutrition.calories, 338.0);
        assert_eq!(plan.total_nutrition.protein, 10.7);
    }

    #[test]
    fn test_planned_foods_carry_catalog_notes() {
        let entries = vec![
            food("banana", 105.0, 1.3, Some(2)).with_pros_and_cons("Potassium", "Sugary"),
            food("egg", 78.0, 6.3, Some(1)),
        ];
        let plan = recommend_for_target(300.0, &entries).unwrap();

        assert_eq!(plan.recommended_foods[0].pros.as_deref(), Some("Potassium"));
        assert_eq!(plan.recommended_foods[0].cons.as_deref(), Some("Sugary"));
        assert_eq!(plan.recommended_foods[1].pros, None);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["recommended_foods"][0]["cons"], "Sugary");
        assert!(json["recommended_foods"][1]["pros"].is_null());
    }

    #[test]
    fn test_stops_once_budget_is_spent() {
        let entries = vec![food("dosa", 100.0, 3.0, Some(2)), food("egg", 78.0, 6.3, Some(3))];
        let plan = recommend_for_target(200.0, &entries).unwrap();
        assert_eq!(plan.recommended_foods.len(), 1);
        assert_eq!(plan.total_nutrition.calories, 200.0);
    }
}
