use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Ingredient, NutritionFacts, Recipe, RecipeIngredient};

#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Vec<String>,
    pub servings: i32,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub scaling_key_ingredient_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// One `recipe_ingredients` row joined with its `ingredients` row.
#[derive(Debug, FromRow)]
pub struct RecipeIngredientRow {
    pub id: Uuid,
    pub amount: f64,
    pub unit: String,
    pub position: i32,
    pub notes: Option<String>,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    #[sqlx(flatten)]
    pub nutrition: NutritionColumns,
}

#[derive(Debug, FromRow)]
pub struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    pub nutrition: NutritionColumns,
}

/// The nutrient columns of `ingredients`, shared by every row that selects them.
#[derive(Debug, Default, FromRow)]
pub struct NutritionColumns {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

impl From<NutritionColumns> for NutritionFacts {
    fn from(c: NutritionColumns) -> Self {
        Self {
            calories: c.calories,
            protein_g: c.protein_g,
            carbs_g: c.carbs_g,
            fat_g: c.fat_g,
            fiber_g: c.fiber_g,
            sugar_g: c.sugar_g,
            sodium_mg: c.sodium_mg,
        }
    }
}

impl From<IngredientRow> for Ingredient {
    fn from(r: IngredientRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            nutrition: r.nutrition.into(),
        }
    }
}

impl From<RecipeIngredientRow> for RecipeIngredient {
    fn from(r: RecipeIngredientRow) -> Self {
        Self {
            id: r.id,
            ingredient: Ingredient {
                id: r.ingredient_id,
                name: r.ingredient_name,
                nutrition: r.nutrition.into(),
            },
            amount: r.amount,
            unit: r.unit,
            order: r.position,
            notes: r.notes,
        }
    }
}

impl RecipeRow {
    pub fn into_recipe(self, lines: Vec<RecipeIngredientRow>) -> Recipe {
        Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            servings: self.servings,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            ingredients: lines.into_iter().map(RecipeIngredient::from).collect(),
            scaling_key_ingredient_id: self.scaling_key_ingredient_id,
            created_at: self.created_at,
        }
    }
}
