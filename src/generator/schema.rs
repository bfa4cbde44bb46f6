use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GenerationError;
use crate::recipes::repo_types::NewRecipe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// Recipe as returned by the generation backend.
///
/// Accepts the snake_case keys the local generator script emits as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(alias = "cooking_time")]
    pub cooking_time: f64,
    pub difficulty: String,
    #[serde(alias = "nutritional_info")]
    pub nutritional_info: NutritionalInfo,
}

impl GeneratedRecipe {
    fn validate(&self) -> Result<(), GenerationError> {
        let fail = |msg: &str| Err(GenerationError::Schema(msg.to_string()));

        if self.name.trim().is_empty() {
            return fail("name is empty");
        }
        if self.ingredients.is_empty() {
            return fail("ingredients list is empty");
        }
        if self.ingredients.iter().any(|i| i.item.trim().is_empty()) {
            return fail("ingredient without an item");
        }
        if self.instructions.is_empty() || self.instructions.iter().all(|s| s.trim().is_empty()) {
            return fail("instructions are empty");
        }
        if !self.cooking_time.is_finite() || self.cooking_time < 0.0 {
            return fail("cookingTime must be a non-negative number");
        }
        if self.difficulty.trim().is_empty() {
            return fail("difficulty is empty");
        }
        let n = &self.nutritional_info;
        let nutrients = [Some(n.calories), n.protein, n.carbs, n.fat];
        if nutrients.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
            return fail("nutritional values must be non-negative numbers");
        }
        Ok(())
    }

    /// Storable form: ingredients as a JSON list, instructions one per line.
    pub fn to_new_recipe(&self) -> serde_json::Result<NewRecipe> {
        Ok(NewRecipe {
            name: self.name.trim().to_string(),
            ingredients: serde_json::to_string(&self.ingredients)?,
            steps: self.instructions.join("\n"),
            image: String::new(),
        })
    }
}

/// Strips markdown code fences and any prose around the JSON object.
pub(crate) fn clean_response(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().strip_suffix("```").unwrap_or(rest))
        .unwrap_or(trimmed)
        .trim();

    if unfenced.starts_with('{') {
        return unfenced;
    }
    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

/// One day of a meal plan, keyed by meal ("breakfast", "lunch", "dinner").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub meals: BTreeMap<String, GeneratedRecipe>,
}

impl DayPlan {
    pub fn total_calories(&self) -> f64 {
        self.meals.values().map(|r| r.nutritional_info.calories).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<DayPlan>,
}

impl MealPlan {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.days.is_empty() {
            return Err(GenerationError::Schema("meal plan has no days".into()));
        }
        for day in &self.days {
            if day.day.trim().is_empty() {
                return Err(GenerationError::Schema("day without a name".into()));
            }
            if day.meals.is_empty() {
                return Err(GenerationError::Schema(format!("{} has no meals", day.day)));
            }
            for (meal, recipe) in &day.meals {
                recipe.validate().map_err(|e| match e {
                    GenerationError::Schema(msg) => {
                        GenerationError::Schema(format!("{} {meal}: {msg}", day.day))
                    }
                    other => other,
                })?;
            }
        }
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let body = clean_response(raw);
    if body.is_empty() {
        return Err(GenerationError::Empty);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| GenerationError::Schema(e.to_string()))
}

pub fn parse_recipe(raw: &str) -> Result<GeneratedRecipe, GenerationError> {
    let recipe: GeneratedRecipe = decode(raw)?;
    recipe.validate()?;
    Ok(recipe)
}

pub fn parse_meal_plan(raw: &str) -> Result<MealPlan, GenerationError> {
    let plan: MealPlan = decode(raw)?;
    plan.validate()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "name": "Lemon Chicken Bowl",
        "ingredients": [
            {"item": "chicken breast", "quantity": "200g"},
            {"item": "brown rice", "quantity": "1 cup"}
        ],
        "instructions": ["Cook the rice.", "Grill the chicken."],
        "cookingTime": 35,
        "difficulty": "easy",
        "nutritionalInfo": {"calories": 620, "protein": 48}
    }"#;

    #[test]
    fn parses_plain_json() {
        let recipe = parse_recipe(VALID).unwrap();
        assert_eq!(recipe.name, "Lemon Chicken Bowl");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.cooking_time, 35.0);
        assert_eq!(recipe.nutritional_info.protein, Some(48.0));
        assert_eq!(recipe.nutritional_info.fat, None);
    }

    #[test]
    fn strips_code_fences_and_prose() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_recipe(&fenced).is_ok());
        let chatty = format!("Sure! Here is your recipe:\n{VALID}\nEnjoy.");
        assert!(parse_recipe(&chatty).is_ok());
    }

    #[test]
    fn accepts_snake_case_keys() {
        let raw = r#"{"name":"Oats","ingredients":[{"item":"oats","quantity":"50g"}],
            "instructions":["Soak."],"cooking_time":5,"difficulty":"easy",
            "nutritional_info":{"calories":190}}"#;
        assert_eq!(parse_recipe(raw).unwrap().cooking_time, 5.0);
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_recipe("I cannot help with that."),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(parse_recipe("   "), Err(GenerationError::Empty)));
    }

    #[test]
    fn missing_calories_fails_schema() {
        let raw = VALID.replace(r#""calories": 620, "#, "");
        assert!(matches!(parse_recipe(&raw), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn empty_instructions_fail_schema() {
        let raw = VALID.replace(r#"["Cook the rice.", "Grill the chicken."]"#, "[]");
        let err = parse_recipe(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "response does not match the recipe schema: instructions are empty"
        );
    }

    #[test]
    fn converts_to_storable_recipe() {
        let stored = parse_recipe(VALID).unwrap().to_new_recipe().unwrap();
        assert_eq!(stored.steps, "Cook the rice.\nGrill the chicken.");
        assert!(stored.image.is_empty());
        let items: Vec<Ingredient> = serde_json::from_str(&stored.ingredients).unwrap();
        assert_eq!(items[0].item, "chicken breast");
    }

    fn meal(name: &str, calories: u32) -> String {
        format!(
            r#"{{"name":"{name}","ingredients":[{{"item":"eggs","quantity":"2"}}],
                "instructions":["Cook."],"cooking_time":15,"difficulty":"easy",
                "nutritional_info":{{"calories":{calories},"protein":20.5}}}}"#
        )
    }

    #[test]
    fn parses_snake_case_meal_plan_and_totals_calories() {
        let raw = format!(
            r#"```json
            {{"days":[
                {{"day":"Monday","meals":{{"breakfast":{},"lunch":{},"dinner":{}}}}},
                {{"day":"Tuesday","meals":{{"breakfast":{}}}}}
            ]}}
            ```"#,
            meal("Oats", 350),
            meal("Chicken Salad", 600),
            meal("Salmon", 750),
            meal("Omelette", 400),
        );
        let plan = parse_meal_plan(&raw).unwrap();
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].meals["lunch"].name, "Chicken Salad");
        assert_eq!(plan.days[0].total_calories(), 1700.0);
        assert_eq!(plan.days[1].total_calories(), 400.0);
    }

    #[test]
    fn meal_plan_errors_name_the_failing_meal() {
        let bad = meal("", 300);
        let raw = format!(r#"{{"days":[{{"day":"Friday","meals":{{"dinner":{bad}}}}}]}}"#);
        let err = parse_meal_plan(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "response does not match the recipe schema: Friday dinner: name is empty"
        );
        assert!(matches!(parse_meal_plan(r#"{"days":[]}"#), Err(GenerationError::Schema(_))));
    }
}
