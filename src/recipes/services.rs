use super::dto::{RecipeDetails, ScaleRequest};
use super::model::Recipe;
use super::nutrition::compute_nutrition_totals;
use super::scaling::{scale_by_key_ingredient, scale_by_multiplier, scale_by_recipe_key};
use crate::error::EngineError;

/// Scale a loaded recipe and recompute nutrition for the result.
pub fn scale_recipe(recipe: &Recipe, req: &ScaleRequest) -> Result<RecipeDetails, EngineError> {
    let scaled = match *req {
        ScaleRequest::ByMultiplier { multiplier } => scale_by_multiplier(recipe, multiplier)?,
        ScaleRequest::ByKeyIngredient {
            key_ingredient_id,
            new_amount,
        } => scale_by_key_ingredient(recipe, key_ingredient_id, new_amount)?,
        ScaleRequest::ByRecipeKey { new_amount } => scale_by_recipe_key(recipe, new_amount)?,
    };
    Ok(with_nutrition(scaled))
}

pub fn with_nutrition(recipe: Recipe) -> RecipeDetails {
    let nutrition = compute_nutrition_totals(&recipe);
    RecipeDetails { recipe, nutrition }
}
