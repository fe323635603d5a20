//! Candidate → established transitions for safe foods.
//!
//! Every function takes a snapshot and returns a new value; persisting the
//! result is the caller's job.

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::model::{SafeFood, SafeFoodStatus};
use crate::error::EngineError;

/// Attempts needed before a candidate is suggested for promotion.
pub const PROMOTION_THRESHOLD: i32 = 5;

/// How a food enters the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPath {
    /// Noted as worth trying; no attempts yet.
    #[default]
    Candidate,
    /// Added right after the first attempt, which counts as one exposure.
    FirstAttempt,
    /// Caregiver already trusts it.
    Established,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SafeFoodDraft {
    pub food_name: String,
    pub category: Option<String>,
    pub sensory_notes: Option<String>,
    pub preparation_notes: Option<String>,
}

pub fn create(
    user_id: Uuid,
    draft: SafeFoodDraft,
    path: EntryPath,
    now: OffsetDateTime,
) -> Result<SafeFood, EngineError> {
    let food_name = draft.food_name.trim().to_string();
    if food_name.is_empty() {
        return Err(EngineError::InvalidArgument(
            "food name must not be empty".into(),
        ));
    }

    let (status, times_consumed, date_first_accepted) = match path {
        EntryPath::Candidate => (SafeFoodStatus::Candidate, 0, None),
        EntryPath::FirstAttempt => (SafeFoodStatus::Candidate, 1, None),
        EntryPath::Established => (SafeFoodStatus::Established, 0, Some(now)),
    };

    Ok(SafeFood {
        id: Uuid::new_v4(),
        user_id,
        food_name,
        category: draft.category,
        sensory_notes: draft.sensory_notes,
        preparation_notes: draft.preparation_notes,
        status,
        times_consumed,
        date_first_accepted,
        created_at: now,
    })
}

/// One more exposure attempt, whatever the outcome.
pub fn record_consumption(food: &SafeFood) -> SafeFood {
    SafeFood {
        times_consumed: food.times_consumed.saturating_add(1),
        ..food.clone()
    }
}

pub fn is_promotion_eligible(food: &SafeFood) -> bool {
    food.status == SafeFoodStatus::Candidate && food.times_consumed >= PROMOTION_THRESHOLD
}

/// Promotion needs the caregiver's confirmation and, for a candidate, at
/// least [`PROMOTION_THRESHOLD`] attempts. Established foods always pass.
pub fn check_promotion(food: &SafeFood) -> Result<(), EngineError> {
    if food.status == SafeFoodStatus::Candidate && !is_promotion_eligible(food) {
        return Err(EngineError::InvalidArgument(format!(
            "{} has {} of {PROMOTION_THRESHOLD} attempts needed for promotion",
            food.food_name, food.times_consumed
        )));
    }
    Ok(())
}

pub fn promote(food: &SafeFood) -> SafeFood {
    promote_at(food, OffsetDateTime::now_utc())
}

/// Marks the food established at `now`. An established food comes back
/// unchanged, keeping its original acceptance date.
pub fn promote_at(food: &SafeFood, now: OffsetDateTime) -> SafeFood {
    match food.status {
        SafeFoodStatus::Established => {
            debug!(safe_food_id = %food.id, "already established; promotion is a no-op");
            food.clone()
        }
        SafeFoodStatus::Candidate => SafeFood {
            status: SafeFoodStatus::Established,
            date_first_accepted: Some(now),
            ..food.clone()
        },
    }
}

/// Eligible candidates, most attempted first.
pub fn promotion_suggestions(foods: &[SafeFood]) -> Vec<&SafeFood> {
    let mut eligible: Vec<&SafeFood> = foods.iter().filter(|f| is_promotion_eligible(f)).collect();
    eligible.sort_by(|a, b| {
        b.times_consumed
            .cmp(&a.times_consumed)
            .then_with(|| a.food_name.cmp(&b.food_name))
    });
    eligible
}
