use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::EngineError;

/// Per-unit nutrition facts. Every value is optional because ingredient data
/// is entered by caregivers and is frequently partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    ProteinG,
    CarbsG,
    FatG,
    FiberG,
    SugarG,
    SodiumMg,
}

impl Nutrient {
    pub const ALL: [Nutrient; 7] = [
        Nutrient::Calories,
        Nutrient::ProteinG,
        Nutrient::CarbsG,
        Nutrient::FatG,
        Nutrient::FiberG,
        Nutrient::SugarG,
        Nutrient::SodiumMg,
    ];
}

impl NutritionFacts {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
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
}

/// A named food item. `name` is always stored normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub nutrition: NutritionFacts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub ingredient: Ingredient,
    pub amount: f64,
    pub unit: String,
    pub order: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Vec<String>,
    pub servings: i32,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub ingredients: Vec<RecipeIngredient>,
    pub scaling_key_ingredient_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Recipe {
    pub fn find_ingredient(&self, ingredient_id: Uuid) -> Option<&RecipeIngredient> {
        self.ingredients
            .iter()
            .find(|ri| ri.ingredient.id == ingredient_id)
    }
}

/// Lower-cases, trims and collapses inner whitespace so that "  Whole  Milk"
/// and "whole milk" resolve to the same ingredient.
pub fn normalize_ingredient_name(name: &str) -> Result<String, EngineError> {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        return Err(EngineError::InvalidArgument(
            "ingredient name must not be empty".into(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn ingredient(name: &str, nutrition: NutritionFacts) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.into(),
            nutrition,
        }
    }

    pub fn line(ingredient: Ingredient, amount: f64, unit: &str, order: i32) -> RecipeIngredient {
        RecipeIngredient {
            id: Uuid::new_v4(),
            ingredient,
            amount,
            unit: unit.into(),
            order,
            notes: None,
        }
    }

    /// Pancakes for four: flour 2 cups, milk 1.5 cups, eggs 2, sugar 0.125 cup.
    pub fn pancakes() -> Recipe {
        let flour = ingredient(
            "flour",
            NutritionFacts {
                calories: Some(455.0),
                protein_g: Some(13.0),
                carbs_g: Some(95.0),
                fat_g: Some(1.2),
                ..Default::default()
            },
        );
        let milk = ingredient(
            "milk",
            NutritionFacts {
                calories: Some(122.0),
                protein_g: Some(8.0),
                carbs_g: Some(12.0),
                fat_g: Some(4.8),
                ..Default::default()
            },
        );
        let egg = ingredient(
            "egg",
            NutritionFacts {
                calories: Some(72.0),
                protein_g: Some(6.3),
                carbs_g: Some(0.4),
                fat_g: Some(4.8),
                ..Default::default()
            },
        );
        let sugar = ingredient(
            "sugar",
            NutritionFacts {
                calories: Some(774.0),
                protein_g: Some(0.0),
                carbs_g: Some(200.0),
                fat_g: Some(0.0),
                ..Default::default()
            },
        );
        let flour_id = flour.id;
        let mut milk_line = line(milk, 1.5, "cup", 1);
        milk_line.notes = Some("room temperature".into());

        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Plain pancakes".into(),
            description: Some("No lumps, no toppings".into()),
            instructions: vec![
                "Whisk dry ingredients".into(),
                "Add milk and eggs".into(),
                "Cook on a medium pan".into(),
            ],
            servings: 4,
            prep_time_minutes: Some(10),
            cook_time_minutes: Some(15),
            ingredients: vec![
                line(flour, 2.0, "cup", 0),
                milk_line,
                line(egg, 2.0, "piece", 2),
                line(sugar, 0.125, "cup", 3),
            ],
            scaling_key_ingredient_id: Some(flour_id),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}
