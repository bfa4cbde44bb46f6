use axum::{extract::State, Json};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{GenerateRecipeRequest, GeneratedRecipeResponse, MealPlanResponse};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    generator::GenerationRequest,
    json::ApiJson,
    state::AppState,
};

/// Validates the body and combines it with the caller's saved goals.
async fn build_request(
    state: &AppState,
    user_id: Uuid,
    payload: GenerateRecipeRequest,
) -> AppResult<GenerationRequest> {
    let ingredients = payload.ingredients()?;
    let goals = state.goals.find_by_user(user_id).await?.ok_or_else(|| {
        AppError::Validation("Please set your fitness goals first before generating recipes".into())
    })?;
    Ok(GenerationRequest::new(
        &goals,
        ingredients,
        payload.skill_level.unwrap_or_default(),
        payload.preferences.unwrap_or_default(),
        payload.max_cooking_time,
    ))
}

/// Generates a recipe from the caller's goals and ingredients and stores it
/// with the caller as author.
#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn generate_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<GenerateRecipeRequest>,
) -> AppResult<Json<GeneratedRecipeResponse>> {
    let request = build_request(&state, auth.id, payload).await?;
    let generated = state.generator.generate(&request).await?;

    let new_recipe = generated
        .to_new_recipe()
        .map_err(|e| AppError::Internal(e.into()))?;
    let recipe = state.recipes.create(auth.id, new_recipe).await?;
    info!(recipe_id = %recipe.id, "generated recipe stored");

    Ok(Json(GeneratedRecipeResponse {
        recipe,
        cooking_time: generated.cooking_time,
        difficulty: generated.difficulty,
        nutritional_info: generated.nutritional_info,
    }))
}

/// Generates a week of breakfast, lunch and dinner from the caller's goals.
#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn generate_meal_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<GenerateRecipeRequest>,
) -> AppResult<Json<MealPlanResponse>> {
    let request = build_request(&state, auth.id, payload).await?;
    let plan = state.generator.generate_meal_plan(&request).await?;
    Ok(Json(plan.into()))
}
