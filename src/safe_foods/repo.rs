use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::model::{MealLog, SafeFood, SafeFoodStatus};

const SAFE_FOOD_COLUMNS: &str = "id, user_id, food_name, category, sensory_notes, preparation_notes, \
     status, times_consumed, date_first_accepted, created_at";

/// True when the error chain bottoms out in a Postgres unique violation.
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|d| d.code())
        .is_some_and(|code| code == "23505")
}

pub async fn insert(db: &PgPool, food: &SafeFood) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO safe_foods (id, user_id, food_name, category, sensory_notes, preparation_notes,
                                status, times_consumed, date_first_accepted, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(food.id)
    .bind(food.user_id)
    .bind(&food.food_name)
    .bind(&food.category)
    .bind(&food.sensory_notes)
    .bind(&food.preparation_notes)
    .bind(food.status)
    .bind(food.times_consumed)
    .bind(food.date_first_accepted)
    .bind(food.created_at)
    .execute(db)
    .await
    .context("insert safe food")?;
    Ok(())
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SafeFood>> {
    let rows = sqlx::query_as::<_, SafeFood>(&format!(
        "SELECT {SAFE_FOOD_COLUMNS} FROM safe_foods WHERE user_id = $1 ORDER BY created_at ASC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list safe foods")?;
    Ok(rows)
}

pub async fn list_by_status(
    db: &PgPool,
    user_id: Uuid,
    status: SafeFoodStatus,
) -> anyhow::Result<Vec<SafeFood>> {
    let rows = sqlx::query_as::<_, SafeFood>(&format!(
        "SELECT {SAFE_FOOD_COLUMNS} FROM safe_foods \
         WHERE user_id = $1 AND status = $2 \
         ORDER BY date_first_accepted ASC NULLS LAST, created_at ASC"
    ))
    .bind(user_id)
    .bind(status)
    .fetch_all(db)
    .await
    .context("list safe foods by status")?;
    Ok(rows)
}

/// Row-locks the food for the rest of the transaction so concurrent attempts
/// on the same food apply one after another.
pub async fn find_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<SafeFood>> {
    let row = sqlx::query_as::<_, SafeFood>(&format!(
        "SELECT {SAFE_FOOD_COLUMNS} FROM safe_foods WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock safe food")?;
    Ok(row)
}

/// Writes back the lifecycle fields produced by the engine.
pub async fn update_lifecycle_tx(
    tx: &mut Transaction<'_, Postgres>,
    food: &SafeFood,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE safe_foods
           SET status = $3, times_consumed = $4, date_first_accepted = $5
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(food.id)
    .bind(food.user_id)
    .bind(food.status)
    .bind(food.times_consumed)
    .bind(food.date_first_accepted)
    .execute(&mut **tx)
    .await
    .context("update safe food lifecycle")?;
    Ok(())
}

pub async fn insert_meal_log_tx(
    tx: &mut Transaction<'_, Postgres>,
    log: &MealLog,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO meal_logs (id, user_id, safe_food_id, portion_eaten, energy_before,
                               energy_after, success_factors, notes, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(log.id)
    .bind(log.user_id)
    .bind(log.safe_food_id)
    .bind(log.portion_eaten)
    .bind(log.energy_before)
    .bind(log.energy_after)
    .bind(&log.success_factors)
    .bind(&log.notes)
    .bind(log.logged_at)
    .execute(&mut **tx)
    .await
    .context("insert meal log")?;
    Ok(())
}

pub async fn list_meal_logs(
    db: &PgPool,
    user_id: Uuid,
    safe_food_id: Uuid,
) -> anyhow::Result<Vec<MealLog>> {
    let rows = sqlx::query_as::<_, MealLog>(
        r#"
        SELECT id, user_id, safe_food_id, portion_eaten, energy_before, energy_after,
               success_factors, notes, logged_at
          FROM meal_logs
         WHERE user_id = $1 AND safe_food_id = $2
         ORDER BY logged_at DESC
        "#,
    )
    .bind(user_id)
    .bind(safe_food_id)
    .fetch_all(db)
    .await
    .context("list meal logs")?;
    Ok(rows)
}

/// Meal logs go with the food through `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM safe_foods WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete safe food")?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_errors_are_not_unique_violations() {
        let e = anyhow::anyhow!("boom");
        assert!(!is_unique_violation(&e));
        let e = anyhow::Error::from(sqlx::Error::RowNotFound).context("insert safe food");
        assert!(!is_unique_violation(&e));
    }
}
