use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::{dto::GoalsRequest, repo_types::FitnessGoals};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    json::ApiJson,
    state::AppState,
};

pub fn goals_routes() -> Router<AppState> {
    Router::new().route("/fitness/goals", get(get_goals).post(save_goals))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn save_goals(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<GoalsRequest>,
) -> AppResult<Json<FitnessGoals>> {
    let input = payload.validate()?;
    let goals = state.goals.upsert(auth.id, input).await?;
    info!(goals_id = %goals.id, "fitness goals saved");
    Ok(Json(goals))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_goals(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<FitnessGoals>> {
    state
        .goals
        .find_by_user(auth.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No fitness goals found".into()))
}
