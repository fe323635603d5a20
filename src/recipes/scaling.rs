use tracing::debug;
use uuid::Uuid;

use super::model::Recipe;
use crate::error::EngineError;

/// Scaled amounts are persisted with this many decimal places.
pub const AMOUNT_DECIMALS: i32 = 3;

/// Rounds to [`AMOUNT_DECIMALS`] places, ties away from zero.
pub fn round_amount(value: f64) -> f64 {
    let factor = 10f64.powi(AMOUNT_DECIMALS);
    (value * factor).round() / factor
}

fn ensure_positive(name: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "{name} must be a finite number greater than zero, got {value}"
        )));
    }
    Ok(())
}

/// Servings round half-up and never drop below one.
fn scale_servings(servings: i32, multiplier: f64) -> Result<i32, EngineError> {
    let scaled = (f64::from(servings) * multiplier).round().max(1.0);
    if scaled > f64::from(i32::MAX) {
        return Err(EngineError::InvalidArgument(format!(
            "multiplier {multiplier} overflows the servings count"
        )));
    }
    Ok(scaled as i32)
}

/// Returns a copy of `recipe` with servings and every ingredient amount scaled
/// by `multiplier`. The source recipe is left untouched.
pub fn scale_by_multiplier(recipe: &Recipe, multiplier: f64) -> Result<Recipe, EngineError> {
    ensure_positive("multiplier", multiplier)?;

    if let Some(key_id) = recipe.scaling_key_ingredient_id {
        if recipe.find_ingredient(key_id).is_none() {
            return Err(EngineError::NotFound(format!(
                "scaling key ingredient {key_id} is not part of recipe {}",
                recipe.id
            )));
        }
    }

    if multiplier == 1.0 {
        return Ok(recipe.clone());
    }

    let mut scaled = recipe.clone();
    scaled.servings = scale_servings(recipe.servings, multiplier)?;
    for line in &mut scaled.ingredients {
        let amount = round_amount(line.amount * multiplier);
        if !amount.is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "multiplier {multiplier} overflows the amount of {}",
                line.ingredient.name
            )));
        }
        line.amount = amount;
    }

    debug!(recipe_id = %recipe.id, multiplier, servings = scaled.servings, "recipe scaled");
    Ok(scaled)
}

/// Scales `recipe` so that the ingredient `key_ingredient_id` ends up at
/// `new_amount`, in the unit the recipe already uses for it.
pub fn scale_by_key_ingredient(
    recipe: &Recipe,
    key_ingredient_id: Uuid,
    new_amount: f64,
) -> Result<Recipe, EngineError> {
    let key = recipe.find_ingredient(key_ingredient_id).ok_or_else(|| {
        EngineError::NotFound(format!(
            "key ingredient {key_ingredient_id} not present in this recipe"
        ))
    })?;

    if key.amount == 0.0 {
        return Err(EngineError::DivisionByZero(format!(
            "key ingredient {} has a zero amount; cannot derive a multiplier",
            key.ingredient.name
        )));
    }
    ensure_positive("new_amount", new_amount)?;

    let multiplier = new_amount / key.amount;
    debug!(
        recipe_id = %recipe.id,
        key = %key.ingredient.name,
        from = key.amount,
        to = new_amount,
        multiplier,
        "multiplier derived from key ingredient"
    );
    scale_by_multiplier(recipe, multiplier)
}

/// Scales by the ingredient the recipe itself marks as its scaling key.
pub fn scale_by_recipe_key(recipe: &Recipe, new_amount: f64) -> Result<Recipe, EngineError> {
    let key_id = recipe.scaling_key_ingredient_id.ok_or_else(|| {
        EngineError::InvalidArgument(format!(
            "recipe {} has no scaling key ingredient",
            recipe.id
        ))
    })?;
    scale_by_key_ingredient(recipe, key_id, new_amount)
}
