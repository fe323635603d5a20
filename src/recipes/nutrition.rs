use serde::Serialize;

use super::model::{Nutrient, Recipe};
use super::scaling::round_amount;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

impl NutrientTotals {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::ProteinG => self.protein_g,
            Nutrient::CarbsG => self.carbs_g,
            Nutrient::FatG => self.fat_g,
            Nutrient::FiberG => self.fiber_g,
            Nutrient::SugarG => self.sugar_g,
            Nutrient::SodiumMg => self.sodium_mg,
        }
    }

    fn slot(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::ProteinG => &mut self.protein_g,
            Nutrient::CarbsG => &mut self.carbs_g,
            Nutrient::FatG => &mut self.fat_g,
            Nutrient::FiberG => &mut self.fiber_g,
            Nutrient::SugarG => &mut self.sugar_g,
            Nutrient::SodiumMg => &mut self.sodium_mg,
        }
    }
}

/// Totals for a whole recipe and for one serving of it.
///
/// `incomplete_nutrients` lists every total that was summed over at least one
/// ingredient with no value for it; such totals are lower bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub per_recipe: NutrientTotals,
    pub per_serving: NutrientTotals,
    pub incomplete: bool,
    pub incomplete_nutrients: Vec<Nutrient>,
}

pub fn compute_nutrition_totals(recipe: &Recipe) -> NutritionSummary {
    let servings = f64::from(recipe.servings.max(1));
    let mut per_recipe = NutrientTotals::default();
    let mut per_serving = NutrientTotals::default();
    let mut incomplete_nutrients = Vec::new();

    for nutrient in Nutrient::ALL {
        let mut total = 0.0;
        let mut missing = false;
        for line in &recipe.ingredients {
            match line.ingredient.nutrition.get(nutrient) {
                Some(per_unit) => total += per_unit * line.amount,
                None => missing = true,
            }
        }
        *per_recipe.slot(nutrient) = round_amount(total);
        *per_serving.slot(nutrient) = round_amount(total / servings);
        if missing {
            incomplete_nutrients.push(nutrient);
        }
    }

    NutritionSummary {
        per_recipe,
        per_serving,
        incomplete: !incomplete_nutrients.is_empty(),
        incomplete_nutrients,
    }
}
