use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Identity of the caller, taken from a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("authorization header without bearer scheme");
            AppError::Unauthorized
        })?;

        let keys = JwtKeys::from_ref(state);
        let payload = keys.verify_token(token.trim()).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser {
            id: payload.user_id,
            email: payload.email,
        })
    }
}
