use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{generate_salt, hash_password_blocking, verify_password_blocking},
        repo_types::NewUser,
        services::{normalize_email, normalize_name, validate_registration},
    },
    error::{AppError, AppResult},
    json::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);
    if let Err(e) = validate_registration(&email, &payload.password) {
        warn!(email = %email, error = %e, "registration rejected");
        return Err(e);
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let salt = generate_salt();
    let password_hash = hash_password_blocking(payload.password, salt.clone()).await?;

    // The unique index still guards against a concurrent registration.
    let user = state
        .users
        .create(NewUser {
            email,
            name: normalize_name(payload.name),
            password_hash,
            salt,
        })
        .await?;

    let token = JwtKeys::from_ref(&state).generate_token(&user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(payload.password, user.salt.clone(), user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).generate_token(&user)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<PublicUser>> {
    let user = state.users.find_by_id(auth.id).await?.ok_or_else(|| {
        warn!("token for a user that no longer exists");
        AppError::Unauthorized
    })?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_credentials() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("salt"));
        assert!(!json.contains("password"));
    }
}
