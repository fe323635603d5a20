use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateSafeFoodRequest, RecordMealRequest, RecordMealResponse};
use super::lifecycle::{self, is_promotion_eligible};
use super::model::{MealLog, SafeFood, SafeFoodStatus};
use super::repo;
use super::timeline::{build_timeline, Timeline};
use crate::{
    auth::extractors::AuthUser,
    error::{internal, rejection},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/safe-foods", get(list_safe_foods).post(create_safe_food))
        .route("/safe-foods/suggestions", get(list_suggestions))
        .route("/safe-foods/timeline", get(get_timeline))
        .route("/safe-foods/:id", axum::routing::delete(delete_safe_food))
        .route("/safe-foods/:id/promote", post(promote_safe_food))
        .route(
            "/safe-foods/:id/meal-logs",
            get(list_meal_logs).post(record_meal),
        )
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Safe food not found".into())
}

#[instrument(skip(state))]
pub async fn list_safe_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SafeFood>>, (StatusCode, String)> {
    let foods = repo::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(foods))
}

#[instrument(skip(state, body))]
pub async fn create_safe_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateSafeFoodRequest>,
) -> Result<(StatusCode, Json<SafeFood>), (StatusCode, String)> {
    let food = lifecycle::create(user_id, body.draft, body.entry, OffsetDateTime::now_utc())
        .map_err(rejection)?;

    if let Err(e) = repo::insert(&state.db, &food).await {
        if repo::is_unique_violation(&e) {
            warn!(%user_id, food_name = %food.food_name, "safe food already tracked");
            return Err((StatusCode::CONFLICT, "Safe food already tracked".into()));
        }
        return Err(internal(e));
    }

    info!(%user_id, safe_food_id = %food.id, status = ?food.status, "safe food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn delete_safe_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !repo::delete(&state.db, user_id, id).await.map_err(internal)? {
        return Err(not_found());
    }
    info!(%user_id, safe_food_id = %id, "safe food deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Candidates that reached the attempt threshold and await confirmation.
#[instrument(skip(state))]
pub async fn list_suggestions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SafeFood>>, (StatusCode, String)> {
    let candidates = repo::list_by_status(&state.db, user_id, SafeFoodStatus::Candidate)
        .await
        .map_err(internal)?;
    let suggestions = lifecycle::promotion_suggestions(&candidates)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(suggestions))
}

#[instrument(skip(state))]
pub async fn get_timeline(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Timeline>, (StatusCode, String)> {
    let established = repo::list_by_status(&state.db, user_id, SafeFoodStatus::Established)
        .await
        .map_err(internal)?;
    Ok(Json(build_timeline(&established)))
}

/// Caregiver confirmation of an eligible candidate. Repeating it leaves the
/// food unchanged.
#[instrument(skip(state))]
pub async fn promote_safe_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SafeFood>, (StatusCode, String)> {
    let mut tx = state.db.begin().await.context("begin tx").map_err(internal)?;
    let food = repo::find_for_update_tx(&mut tx, user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;

    if food.status == SafeFoodStatus::Established {
        return Ok(Json(food));
    }
    if let Err(e) = lifecycle::check_promotion(&food) {
        warn!(error = %e, %user_id, safe_food_id = %id, "promotion refused");
        return Err(rejection(e));
    }

    let promoted = lifecycle::promote(&food);
    repo::update_lifecycle_tx(&mut tx, &promoted)
        .await
        .map_err(internal)?;
    tx.commit().await.context("commit tx").map_err(internal)?;

    info!(%user_id, safe_food_id = %id, "safe food established");
    Ok(Json(promoted))
}

/// Logs an attempt and bumps the food's counter under one row lock.
#[instrument(skip(state, body))]
pub async fn record_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecordMealRequest>,
) -> Result<(StatusCode, Json<RecordMealResponse>), (StatusCode, String)> {
    let meal_log = body
        .into_meal_log(user_id, id, OffsetDateTime::now_utc())
        .map_err(rejection)?;

    let mut tx = state.db.begin().await.context("begin tx").map_err(internal)?;
    let food = repo::find_for_update_tx(&mut tx, user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(not_found)?;

    let updated = lifecycle::record_consumption(&food);
    repo::insert_meal_log_tx(&mut tx, &meal_log)
        .await
        .map_err(internal)?;
    repo::update_lifecycle_tx(&mut tx, &updated)
        .await
        .map_err(internal)?;
    tx.commit().await.context("commit tx").map_err(internal)?;

    let promotion_eligible = is_promotion_eligible(&updated);
    if promotion_eligible && !is_promotion_eligible(&food) {
        info!(%user_id, safe_food_id = %id, "safe food reached the promotion threshold");
    }

    Ok((
        StatusCode::CREATED,
        Json(RecordMealResponse {
            meal_log,
            safe_food: updated,
            promotion_eligible,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_meal_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MealLog>>, (StatusCode, String)> {
    let logs = repo::list_meal_logs(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    Ok(Json(logs))
}
