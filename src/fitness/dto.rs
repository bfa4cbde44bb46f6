use serde::Deserialize;

use super::repo_types::GoalsInput;
use crate::error::AppError;

/// Body of `POST /fitness/goals`.
#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    pub calories: f64, // kcal per day
    pub protein: f64,  // g
    pub carbs: f64,    // g
    pub fat: f64,      // g
    pub water: f64,    // ml
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl GoalsRequest {
    pub fn validate(self) -> Result<GoalsInput, AppError> {
        let targets = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("water", self.water),
        ];
        for (field, value) in targets {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }

        let mut allergies: Vec<String> = Vec::with_capacity(self.allergies.len());
        for a in self.allergies {
            let a = a.trim().to_string();
            if !a.is_empty() && !allergies.iter().any(|x| x.eq_ignore_ascii_case(&a)) {
                allergies.push(a);
            }
        }

        Ok(GoalsInput {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            water: self.water,
            allergies,
        })
    }
}
