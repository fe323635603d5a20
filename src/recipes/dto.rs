use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{normalize_ingredient_name, NutritionFacts, Recipe};
use super::nutrition::NutritionSummary;
use crate::error::EngineError;

#[derive(Debug, Deserialize)]
pub struct CreateRecipeIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub nutrition: NutritionFacts,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub servings: i32,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub ingredients: Vec<CreateRecipeIngredient>,
    /// Name of the ingredient caregivers scale this recipe by.
    pub scaling_key_ingredient: Option<String>,
}

impl CreateRecipeRequest {
    /// Normalizes ingredient names in place and checks the request shape.
    pub fn validate(&mut self) -> Result<(), EngineError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(EngineError::InvalidArgument("title must not be empty".into()));
        }
        if self.servings <= 0 {
            return Err(EngineError::InvalidArgument(format!(
                "servings must be positive, got {}",
                self.servings
            )));
        }

        let mut seen = HashSet::new();
        for line in &mut self.ingredients {
            line.name = normalize_ingredient_name(&line.name)?;
            if !line.amount.is_finite() || line.amount <= 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "amount of {} must be positive, got {}",
                    line.name, line.amount
                )));
            }
            if !seen.insert(line.name.clone()) {
                return Err(EngineError::InvalidArgument(format!(
                    "ingredient {} is listed twice",
                    line.name
                )));
            }
        }

        if let Some(key) = self.scaling_key_ingredient.as_mut() {
            *key = normalize_ingredient_name(key)?;
            if !seen.contains(key.as_str()) {
                return Err(EngineError::InvalidArgument(format!(
                    "scaling key {key} is not one of the recipe's ingredients"
                )));
            }
        }
        Ok(())
    }
}

/// Exactly one of the three scaling modes. Keys from another mode are
/// rejected rather than ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum ScaleRequest {
    ByKeyIngredient {
        key_ingredient_id: Uuid,
        new_amount: f64,
    },
    ByMultiplier {
        multiplier: f64,
    },
    ByRecipeKey {
        new_amount: f64,
    },
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub nutrition: NutritionSummary,
}

#[derive(Debug, Serialize)]
pub struct RecipeListItem {
    pub id: Uuid,
    pub title: String,
    pub servings: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct CreatedRecipeResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

pub const MAX_PAGE_SIZE: i64 = 100;

impl Pagination {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit) {
            return Err(EngineError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.limit
            )));
        }
        if self.offset < 0 {
            return Err(EngineError::InvalidArgument(format!(
                "offset must not be negative, got {}",
                self.offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateRecipeRequest {
        serde_json::from_str(json).expect("valid request json")
    }

    #[test]
    fn validate_normalizes_names_and_key() {
        let mut req = request(
            r#"{
                "title": " Rice bowl ",
                "servings": 2,
                "ingredients": [
                    {"name": " White RICE", "amount": 1, "unit": "cup"},
                    {"name": "butter", "amount": 0.5, "unit": "tbsp"}
                ],
                "scaling_key_ingredient": "white rice"
            }"#,
        );
        req.validate().unwrap();
        assert_eq!(req.title, "Rice bowl");
        assert_eq!(req.ingredients[0].name, "white rice");
        assert_eq!(req.scaling_key_ingredient.as_deref(), Some("white rice"));
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let cases = [
            r#"{"title": "", "servings": 1, "ingredients": []}"#,
            r#"{"title": "x", "servings": 0, "ingredients": []}"#,
            r#"{"title": "x", "servings": 1, "ingredients": [{"name": "a", "amount": 0, "unit": "g"}]}"#,
            r#"{"title": "x", "servings": 1, "ingredients": [{"name": "a", "amount": 1, "unit": "g"}, {"name": " A ", "amount": 1, "unit": "g"}]}"#,
            r#"{"title": "x", "servings": 1, "ingredients": [{"name": "a", "amount": 1, "unit": "g"}], "scaling_key_ingredient": "b"}"#,
        ];
        for case in cases {
            let err = request(case).validate().unwrap_err();
            assert!(matches!(err, EngineError::InvalidArgument(_)), "{case}");
        }
    }

    #[test]
    fn scale_request_picks_the_right_mode() {
        let id = Uuid::new_v4();
        let by_key: ScaleRequest = serde_json::from_str(&format!(
            r#"{{"key_ingredient_id": "{id}", "new_amount": 4}}"#
        ))
        .unwrap();
        assert_eq!(
            by_key,
            ScaleRequest::ByKeyIngredient {
                key_ingredient_id: id,
                new_amount: 4.0
            }
        );

        let by_multiplier: ScaleRequest = serde_json::from_str(r#"{"multiplier": 1.5}"#).unwrap();
        assert_eq!(by_multiplier, ScaleRequest::ByMultiplier { multiplier: 1.5 });

        let by_recipe_key: ScaleRequest = serde_json::from_str(r#"{"new_amount": 3}"#).unwrap();
        assert_eq!(by_recipe_key, ScaleRequest::ByRecipeKey { new_amount: 3.0 });

        assert!(serde_json::from_str::<ScaleRequest>(r#"{"servings": 3}"#).is_err());
    }

    #[test]
    fn scale_request_rejects_mixed_modes() {
        let id = Uuid::new_v4();
        let mixed = [
            r#"{"multiplier": 2, "new_amount": 4}"#.to_string(),
            format!(r#"{{"key_ingredient_id": "{id}", "new_amount": 4, "multiplier": 9}}"#),
            r#"{"new_amount": 4, "servings": 2}"#.to_string(),
        ];
        for body in &mixed {
            assert!(serde_json::from_str::<ScaleRequest>(body).is_err(), "{body}");
        }
    }

    #[test]
    fn pagination_bounds() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!((page.limit, page.offset), (20, 0));
        page.validate().unwrap();

        for (limit, offset) in [(-5, 0), (0, 0), (MAX_PAGE_SIZE + 1, 0), (10, -1)] {
            let err = Pagination { limit, offset }.validate().unwrap_err();
            assert!(matches!(err, EngineError::InvalidArgument(_)), "{limit} {offset}");
        }
        Pagination { limit: MAX_PAGE_SIZE, offset: 40 }.validate().unwrap();
    }
}
