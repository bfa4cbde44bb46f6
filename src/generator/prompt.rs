use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::fitness::repo_types::FitnessGoals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SkillLevel {
    Beginner = 1,
    #[default]
    Intermediate = 2,
    Expert = 3,
}

impl SkillLevel {
    pub fn description(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner (simple recipes, <30 mins, basic techniques)",
            SkillLevel::Intermediate => "intermediate (moderate techniques, 30-60 mins)",
            SkillLevel::Expert => "expert (complex methods, gourmet ingredients, >60 mins)",
        }
    }
}

impl TryFrom<u8> for SkillLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(SkillLevel::Beginner),
            2 => Ok(SkillLevel::Intermediate),
            3 => Ok(SkillLevel::Expert),
            other => Err(format!("skill level must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<SkillLevel> for u8 {
    fn from(s: SkillLevel) -> Self {
        s as u8
    }
}

/// Optional dietary flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub vegetarian: bool,
    pub vegan: bool,
    pub low_carb: bool,
    pub high_protein: bool,
}

impl Preferences {
    fn lines(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.vegetarian {
            out.push("Must be vegetarian");
        }
        if self.vegan {
            out.push("Must be vegan");
        }
        if self.low_carb {
            out.push("Should be low in carbohydrates");
        }
        if self.high_protein {
            out.push("Should be high in protein");
        }
        out
    }
}

/// Everything the prompt needs, derived from the user's goals and the request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub goals: String,
    pub ingredients: Vec<String>,
    pub skill: SkillLevel,
    pub restrictions: Vec<String>,
    pub calories: f64,
    pub preferences: Preferences,
    pub max_cooking_time: Option<u32>,
}

impl GenerationRequest {
    pub fn new(
        goals: &FitnessGoals,
        ingredients: Vec<String>,
        skill: SkillLevel,
        preferences: Preferences,
        max_cooking_time: Option<u32>,
    ) -> Self {
        Self {
            goals: format!(
                "Maintain a diet of {} calories, with {}g protein, {}g carbs, and {}g fat",
                goals.calories, goals.protein, goals.carbs, goals.fat
            ),
            ingredients,
            skill,
            restrictions: goals.allergies.clone(),
            calories: goals.calories,
            preferences,
            max_cooking_time,
        }
    }
}

const RESPONSE_SHAPE: &str = r#"{
  "name": string,
  "ingredients": [{ "item": string, "quantity": string }],
  "instructions": [string],
  "cookingTime": number,
  "difficulty": string,
  "nutritionalInfo": { "calories": number, "protein"?: number, "carbs"?: number, "fat"?: number }
}"#;

const MEAL_PLAN_SHAPE: &str = r#"{
  "days": [
    {
      "day": string,
      "meals": { "breakfast": Recipe, "lunch": Recipe, "dinner": Recipe }
    }
  ]
}
where Recipe is:"#;

/// Writes one `- ...` line per constraint taken from the request.
fn write_constraints(prompt: &mut String, req: &GenerationRequest, calories_label: &str) {
    let restrictions = if req.restrictions.is_empty() {
        "none".to_string()
    } else {
        req.restrictions.join(", ")
    };

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "- Helps achieve: {}", req.goals);
    let _ = writeln!(prompt, "- Uses primarily: {}", req.ingredients.join(", "));
    let _ = writeln!(
        prompt,
        "- Cooking skill level: {} (user selected level {})",
        req.skill.description(),
        u8::from(req.skill)
    );
    let _ = writeln!(prompt, "- {calories_label}: {}", req.calories);
    let _ = writeln!(prompt, "- Dietary restrictions: {restrictions}");
    if let Some(minutes) = req.max_cooking_time {
        let _ = writeln!(prompt, "- Must be prepared in under {minutes} minutes");
    }
    for line in req.preferences.lines() {
        let _ = writeln!(prompt, "- {line}");
    }
}

pub fn build_prompt(req: &GenerationRequest) -> String {
    let mut prompt = String::from("As a professional chef, create a recipe that:\n");
    write_constraints(&mut prompt, req, "Target calories");

    prompt.push_str(
        "\nEnsure the recipe includes a descriptive name, an ingredient list with quantities, \
         clear step-by-step instructions, the cooking time in minutes, a difficulty level and \
         complete nutritional information.\n\n",
    );
    let _ = write!(
        prompt,
        "Return ONLY valid JSON, with no extra text, matching this shape:\n{RESPONSE_SHAPE}"
    );
    prompt
}

/// Prompt for a 7-day plan with breakfast, lunch and dinner on each day.
pub fn build_meal_plan_prompt(req: &GenerationRequest) -> String {
    let mut prompt =
        String::from("As a professional nutritionist and chef, create a 7-day meal plan that:\n");
    write_constraints(&mut prompt, req, "Target daily calories");
    prompt.push_str(
        "- Provides different meals for each of the 7 days (breakfast, lunch, dinner)\n\
         - Gives lunch and dinner more calories and nutritional value than breakfast, \
         and no typical breakfast dishes for lunch or dinner\n\
         - Fills in every recipe field; nutritionalInfo must include at least calories\n\n",
    );
    let _ = write!(
        prompt,
        "Return ONLY valid JSON, with no extra text, matching this shape:\n{MEAL_PLAN_SHAPE}\n{RESPONSE_SHAPE}"
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn goals(allergies: &[&str]) -> FitnessGoals {
        FitnessGoals {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            calories: 1800.0,
            protein: 140.0,
            carbs: 150.0,
            fat: 60.0,
            water: 2500.0,
            allergies: allergies.iter().map(|s| s.to_string()).collect(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn prompt_embeds_every_constraint() {
        let req = GenerationRequest::new(
            &goals(&["peanuts", "shellfish"]),
            vec!["chicken breast".into(), "broccoli".into()],
            SkillLevel::Beginner,
            Preferences {
                vegetarian: true,
                high_protein: true,
                ..Default::default()
            },
            Some(25),
        );
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Maintain a diet of 1800 calories, with 140g protein"));
        assert!(prompt.contains("Uses primarily: chicken breast, broccoli"));
        assert!(prompt.contains("beginner (simple recipes"));
        assert!(prompt.contains("user selected level 1"));
        assert!(prompt.contains("Dietary restrictions: peanuts, shellfish"));
        assert!(prompt.contains("under 25 minutes"));
        assert!(prompt.contains("- Must be vegetarian"));
        assert!(prompt.contains("- Should be high in protein"));
        assert!(!prompt.contains("vegan"));
        assert!(prompt.contains("\"nutritionalInfo\""));
    }

    #[test]
    fn optional_lines_are_omitted() {
        let req = GenerationRequest::new(
            &goals(&[]),
            vec!["oats".into()],
            SkillLevel::default(),
            Preferences::default(),
            None,
        );
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Dietary restrictions: none"));
        assert!(prompt.contains("user selected level 2"));
        assert!(!prompt.contains("Must be prepared"));
        assert!(!prompt.contains("Must be vegetarian"));
    }

    #[test]
    fn skill_level_round_trips_through_numbers() {
        assert_eq!(SkillLevel::try_from(3).unwrap(), SkillLevel::Expert);
        assert!(SkillLevel::try_from(0).is_err());
        assert_eq!(serde_json::to_string(&SkillLevel::Expert).unwrap(), "3");
    }

    #[test]
    fn meal_plan_prompt_asks_for_a_week() {
        let req = GenerationRequest::new(
            &goals(&["gluten"]),
            vec!["eggs".into(), "oatmeal".into()],
            SkillLevel::Expert,
            Preferences::default(),
            None,
        );
        let prompt = build_meal_plan_prompt(&req);
        assert!(prompt.contains("7-day meal plan"));
        assert!(prompt.contains("Target daily calories: 1800"));
        assert!(prompt.contains("Dietary restrictions: gluten"));
        assert!(prompt.contains("user selected level 3"));
        assert!(prompt.contains("\"breakfast\": Recipe"));
        assert!(prompt.contains("\"nutritionalInfo\""));
    }
}
