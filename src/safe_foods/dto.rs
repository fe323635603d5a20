use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::lifecycle::{EntryPath, SafeFoodDraft};
use super::model::{MealLog, PortionEaten, SafeFood};
use crate::error::EngineError;

#[derive(Debug, Deserialize)]
pub struct CreateSafeFoodRequest {
    #[serde(flatten)]
    pub draft: SafeFoodDraft,
    #[serde(default)]
    pub entry: EntryPath,
}

#[derive(Debug, Deserialize)]
pub struct RecordMealRequest {
    pub portion_eaten: PortionEaten,
    pub energy_before: Option<i16>,
    pub energy_after: Option<i16>,
    #[serde(default)]
    pub success_factors: Vec<String>,
    pub notes: Option<String>,
}

/// Energy is self-reported on a 1..=5 scale.
fn check_energy(field: &str, value: Option<i16>) -> Result<(), EngineError> {
    match value {
        Some(v) if !(1..=5).contains(&v) => Err(EngineError::InvalidArgument(format!(
            "{field} must be between 1 and 5, got {v}"
        ))),
        _ => Ok(()),
    }
}

impl RecordMealRequest {
    pub fn into_meal_log(
        self,
        user_id: Uuid,
        safe_food_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<MealLog, EngineError> {
        check_energy("energy_before", self.energy_before)?;
        check_energy("energy_after", self.energy_after)?;
        Ok(MealLog {
            id: Uuid::new_v4(),
            user_id,
            safe_food_id,
            portion_eaten: self.portion_eaten,
            energy_before: self.energy_before,
            energy_after: self.energy_after,
            success_factors: self
                .success_factors
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            notes: self.notes,
            logged_at: now,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RecordMealResponse {
    pub meal_log: MealLog,
    pub safe_food: SafeFood,
    pub promotion_eligible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_foods::lifecycle::EntryPath;

    #[test]
    fn create_request_flattens_the_draft() {
        let req: CreateSafeFoodRequest = serde_json::from_str(
            r#"{"food_name": "toast", "category": "bread", "entry": "established"}"#,
        )
        .unwrap();
        assert_eq!(req.draft.food_name, "toast");
        assert_eq!(req.draft.category.as_deref(), Some("bread"));
        assert_eq!(req.entry, EntryPath::Established);

        let plain: CreateSafeFoodRequest =
            serde_json::from_str(r#"{"food_name": "peas"}"#).unwrap();
        assert_eq!(plain.entry, EntryPath::Candidate);
    }

    #[test]
    fn meal_log_trims_success_factors() {
        let req: RecordMealRequest = serde_json::from_str(
            r#"{"portion_eaten": "half", "energy_before": 2, "success_factors": [" quiet room ", ""]}"#,
        )
        .unwrap();
        let log = req
            .into_meal_log(Uuid::new_v4(), Uuid::new_v4(), OffsetDateTime::UNIX_EPOCH)
            .unwrap();
        assert_eq!(log.portion_eaten, PortionEaten::Half);
        assert_eq!(log.success_factors, vec!["quiet room".to_string()]);
    }

    #[test]
    fn energy_outside_scale_is_rejected() {
        let req: RecordMealRequest =
            serde_json::from_str(r#"{"portion_eaten": "all", "energy_after": 9}"#).unwrap();
        let err = req
            .into_meal_log(Uuid::new_v4(), Uuid::new_v4(), OffsetDateTime::UNIX_EPOCH)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
