use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateRecipeRequest, MessageResponse, UpdateRecipeRequest},
    repo_types::Recipe,
    services::{load_owned_recipe, recipe_not_found, RecipeId},
};
use crate::{auth::AuthUser, error::AppResult, json::ApiJson, state::AppState};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
        .route("/user/saved-recipes", get(saved_recipes))
        .route("/user/recipe-history", get(recipe_history))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route("/recipes/:id", put(update_recipe).delete(delete_recipe))
        .route("/recipes/:id/save", post(save_recipe))
        .route("/recipes/generate", post(super::generate::generate_recipe))
        .route("/recipes/meal-plan", post(super::generate::generate_meal_plan))
}

// --- handlers ---

#[instrument(skip(state, _auth))]
pub async fn list_recipes(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(state.recipes.list_all().await?))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateRecipeRequest>,
) -> AppResult<Json<Recipe>> {
    let new_recipe = payload.validate()?;
    let recipe = state.recipes.create(auth.id, new_recipe).await?;
    info!(recipe_id = %recipe.id, "recipe created");
    Ok(Json(recipe))
}

/// Returns the recipe as it was before this view was recorded.
#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    RecipeId(id): RecipeId,
) -> AppResult<Json<Recipe>> {
    let recipe = state.recipes.find_by_id(id).await?.ok_or_else(recipe_not_found)?;
    state.recipes.record_view(id, auth.id).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    RecipeId(id): RecipeId,
    ApiJson(payload): ApiJson<UpdateRecipeRequest>,
) -> AppResult<Json<Recipe>> {
    let current = load_owned_recipe(state.recipes.as_ref(), id, auth.id, "update").await?;
    let patch = payload.validate()?;
    if patch.is_empty() {
        return Ok(Json(current));
    }
    let recipe = state
        .recipes
        .update(id, patch)
        .await?
        .ok_or_else(recipe_not_found)?;
    info!(recipe_id = %id, "recipe updated");
    Ok(Json(recipe))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    RecipeId(id): RecipeId,
) -> AppResult<Json<MessageResponse>> {
    load_owned_recipe(state.recipes.as_ref(), id, auth.id, "delete").await?;
    if !state.recipes.delete(id).await? {
        return Err(recipe_not_found());
    }
    info!(recipe_id = %id, "recipe deleted");
    Ok(Json(MessageResponse::new("Recipe deleted successfully")))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn save_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    RecipeId(id): RecipeId,
) -> AppResult<Json<MessageResponse>> {
    state.recipes.find_by_id(id).await?.ok_or_else(recipe_not_found)?;
    state.recipes.save_for_user(id, auth.id).await?;
    Ok(Json(MessageResponse::new("Recipe saved successfully")))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn saved_recipes(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(state.recipes.saved_by_user(auth.id).await?))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn recipe_history(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(state.recipes.viewed_by_user(auth.id).await?))
}
