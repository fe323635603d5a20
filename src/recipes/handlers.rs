use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateRecipeRequest, CreatedRecipeResponse, Pagination, RecipeDetails, RecipeListItem,
    ScaleRequest,
};
use super::model::Recipe;
use super::nutrition::{compute_nutrition_totals, NutritionSummary};
use super::{repo, services};
use crate::{
    auth::extractors::AuthUser,
    error::{internal, rejection},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/:id", get(get_recipe).delete(delete_recipe))
        .route("/recipes/:id/nutrition", get(get_nutrition))
        .route("/recipes/:id/scale", post(scale_recipe))
}

async fn load(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Recipe, (StatusCode, String)> {
    repo::get_recipe(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".into()))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<RecipeListItem>>, (StatusCode, String)> {
    p.validate().map_err(rejection)?;
    let rows = repo::list_by_user(&state.db, user_id, p.limit, p.offset)
        .await
        .map_err(internal)?;
    let items = rows
        .into_iter()
        .map(|(id, title, servings, created_at)| RecipeListItem {
            id,
            title,
            servings,
            created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let recipe = load(&state, user_id, id).await?;
    Ok(Json(services::with_nutrition(recipe)))
}

#[instrument(skip(state))]
pub async fn get_nutrition(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionSummary>, (StatusCode, String)> {
    let recipe = load(&state, user_id, id).await?;
    Ok(Json(compute_nutrition_totals(&recipe)))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<CreatedRecipeResponse>), (StatusCode, String)> {
    if let Err(e) = body.validate() {
        warn!(error = %e, %user_id, "rejected recipe");
        return Err(rejection(e));
    }

    let (id, created_at) = repo::create_recipe(&state.db, user_id, &body)
        .await
        .map_err(internal)?;

    info!(%user_id, recipe_id = %id, ingredients = body.ingredients.len(), "recipe created");
    Ok((StatusCode::CREATED, Json(CreatedRecipeResponse { id, created_at })))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete_recipe(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }
    info!(%user_id, recipe_id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns a scaled preview; nothing is persisted.
#[instrument(skip(state))]
pub async fn scale_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ScaleRequest>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let recipe = load(&state, user_id, id).await?;
    let details = services::scale_recipe(&recipe, &body).map_err(|e| {
        warn!(error = %e, %user_id, recipe_id = %id, "scaling failed");
        rejection(e)
    })?;
    Ok(Json(details))
}
