use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{CreateRecipeIngredient, CreateRecipeRequest};
use super::model::{Ingredient, Recipe};
use super::repo_types::{IngredientRow, RecipeIngredientRow, RecipeRow};

/// Returns the ingredient with this normalized name, creating it when absent.
/// Nutrition facts of an existing ingredient are never overwritten here.
async fn upsert_ingredient_tx(
    tx: &mut Transaction<'_, Postgres>,
    line: &CreateRecipeIngredient,
) -> anyhow::Result<Ingredient> {
    let n = &line.nutrition;
    let row = sqlx::query_as::<_, IngredientRow>(
        r#"
        INSERT INTO ingredients (name, calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg
        "#,
    )
    .bind(&line.name)
    .bind(n.calories)
    .bind(n.protein_g)
    .bind(n.carbs_g)
    .bind(n.fat_g)
    .bind(n.fiber_g)
    .bind(n.sugar_g)
    .bind(n.sodium_mg)
    .fetch_one(&mut **tx)
    .await
    .with_context(|| format!("upsert ingredient {}", line.name))?;
    Ok(row.into())
}

/// Insert a recipe with its ingredient lines in one transaction.
/// `req` must already be validated.
pub async fn create_recipe(
    db: &PgPool,
    user_id: Uuid,
    req: &CreateRecipeRequest,
) -> anyhow::Result<(Uuid, OffsetDateTime)> {
    let mut tx = db.begin().await.context("begin tx")?;

    let mut ingredients = Vec::with_capacity(req.ingredients.len());
    for line in &req.ingredients {
        ingredients.push(upsert_ingredient_tx(&mut tx, line).await?);
    }

    let key_id = req.scaling_key_ingredient.as_deref().and_then(|key| {
        ingredients
            .iter()
            .find(|i| i.name == key)
            .map(|i| i.id)
    });

    let recipe_id = Uuid::new_v4();
    let (created_at,): (OffsetDateTime,) = sqlx::query_as(
        r#"
        INSERT INTO recipes (id, user_id, title, description, instructions, servings,
                             prep_time_minutes, cook_time_minutes, scaling_key_ingredient_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING created_at
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.instructions)
    .bind(req.servings)
    .bind(req.prep_time_minutes)
    .bind(req.cook_time_minutes)
    .bind(key_id)
    .fetch_one(&mut *tx)
    .await
    .context("insert recipe")?;

    for (position, (line, ingredient)) in req.ingredients.iter().zip(&ingredients).enumerate() {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (id, recipe_id, ingredient_id, amount, unit, position, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(line.amount)
        .bind(&line.unit)
        .bind(position as i32)
        .bind(&line.notes)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("insert recipe ingredient {}", line.name))?;
    }

    tx.commit().await.context("commit tx")?;
    Ok((recipe_id, created_at))
}

/// Load one recipe of `user_id` with its ingredient lines in display order.
pub async fn get_recipe(
    db: &PgPool,
    user_id: Uuid,
    recipe_id: Uuid,
) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT id, user_id, title, description, instructions, servings,
               prep_time_minutes, cook_time_minutes, scaling_key_ingredient_id, created_at
          FROM recipes
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get recipe")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let lines = sqlx::query_as::<_, RecipeIngredientRow>(
        r#"
        SELECT ri.id, ri.amount, ri.unit, ri.position, ri.notes,
               i.id AS ingredient_id, i.name AS ingredient_name,
               i.calories, i.protein_g, i.carbs_g, i.fat_g, i.fiber_g, i.sugar_g, i.sodium_mg
          FROM recipe_ingredients ri
          JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = $1
         ORDER BY ri.position ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await
    .context("list recipe ingredients")?;

    Ok(Some(row.into_recipe(lines)))
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<(Uuid, String, i32, OffsetDateTime)>> {
    let rows = sqlx::query_as::<_, (Uuid, String, i32, OffsetDateTime)>(
        r#"
        SELECT id, title, servings, created_at
          FROM recipes
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list recipes")?;
    Ok(rows)
}

/// Ingredient lines go with the recipe through `ON DELETE CASCADE`.
pub async fn delete_recipe(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(recipe_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete recipe")?;
    Ok(res.rows_affected() > 0)
}
