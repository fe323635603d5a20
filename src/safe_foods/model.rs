use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The single source of truth for whether a food is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "safe_food_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SafeFoodStatus {
    Candidate,
    Established,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SafeFood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub category: Option<String>,
    pub sensory_notes: Option<String>,
    pub preparation_notes: Option<String>,
    pub status: SafeFoodStatus,
    pub times_consumed: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_first_accepted: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "portion_eaten", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PortionEaten {
    Refused,
    Taste,
    Small,
    Half,
    Most,
    All,
}

/// One logged attempt at eating a safe food. Outcome fields are descriptive
/// only; they never influence the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub safe_food_id: Uuid,
    pub portion_eaten: PortionEaten,
    pub energy_before: Option<i16>,
    pub energy_after: Option<i16>,
    pub success_factors: Vec<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}
