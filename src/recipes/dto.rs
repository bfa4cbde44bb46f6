use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::repo_types::{NewRecipe, Recipe, RecipePatch};
use crate::error::AppError;
use crate::generator::{GeneratedRecipe, MealPlan, NutritionalInfo, Preferences, SkillLevel};

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub ingredients: String,
    pub steps: String,
    #[serde(default)]
    pub image: String,
}

impl CreateRecipeRequest {
    pub fn validate(self) -> Result<NewRecipe, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        Ok(NewRecipe {
            name,
            ingredients: self.ingredients,
            steps: self.steps,
            image: self.image.trim().to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub ingredients: Option<String>,
    pub steps: Option<String>,
    pub image: Option<String>,
}

impl UpdateRecipeRequest {
    pub fn validate(self) -> Result<RecipePatch, AppError> {
        let name = match self.name {
            Some(n) if n.trim().is_empty() => {
                return Err(AppError::Validation("name must not be empty".into()))
            }
            other => other.map(|n| n.trim().to_string()),
        };
        Ok(RecipePatch {
            name,
            ingredients: self.ingredients,
            steps: self.steps,
            image: self.image.map(|i| i.trim().to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /recipes/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub max_cooking_time: Option<u32>,
}

impl GenerateRecipeRequest {
    /// Trimmed, non-empty ingredient names.
    pub fn ingredients(&self) -> Result<Vec<String>, AppError> {
        let list: Vec<String> = self
            .ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            return Err(AppError::Validation("ingredients must not be empty".into()));
        }
        if self.max_cooking_time == Some(0) {
            return Err(AppError::Validation("maxCookingTime must be positive".into()));
        }
        Ok(list)
    }
}

/// The stored recipe plus the generation details that have no column.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipeResponse {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub cooking_time: f64,
    pub difficulty: String,
    pub nutritional_info: NutritionalInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanResponse {
    pub day: String,
    pub meals: BTreeMap<String, GeneratedRecipe>,
    pub total_calories: f64,
}

/// Body returned by `POST /recipes/meal-plan`. Plans are not stored.
#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub days: Vec<DayPlanResponse>,
}

impl From<MealPlan> for MealPlanResponse {
    fn from(plan: MealPlan) -> Self {
        let days = plan
            .days
            .into_iter()
            .map(|day| DayPlanResponse {
                total_calories: day.total_calories(),
                day: day.day,
                meals: day.meals,
            })
            .collect();
        Self { days }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_name() {
        let req = CreateRecipeRequest {
            name: "   ".into(),
            ingredients: "eggs".into(),
            steps: "whisk".into(),
            image: String::new(),
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_keeps_absent_fields() {
        let patch = UpdateRecipeRequest {
            steps: Some("1. Boil".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.steps.as_deref(), Some("1. Boil"));
        assert!(patch.name.is_none() && patch.image.is_none());
    }

    #[test]
    fn generate_request_parses_camel_case() {
        let req: GenerateRecipeRequest = serde_json::from_value(serde_json::json!({
            "ingredients": [" chicken ", "", "rice"],
            "skillLevel": 1,
            "preferences": { "highProtein": true },
            "maxCookingTime": 30
        }))
        .unwrap();
        assert_eq!(req.ingredients().unwrap(), vec!["chicken", "rice"]);
        assert_eq!(req.skill_level, Some(SkillLevel::Beginner));
        assert!(req.preferences.unwrap().high_protein);
    }

    #[test]
    fn generate_request_rejects_bad_skill() {
        let res: Result<GenerateRecipeRequest, _> =
            serde_json::from_value(serde_json::json!({ "ingredients": ["x"], "skillLevel": 4 }));
        assert!(res.is_err());
    }
}
