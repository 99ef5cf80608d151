use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::auth::issue_token;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::RefreshRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub access_token: String,
}

/// POST /api/auth/refresh - Exchange a refresh token for a short-lived access token
///
/// Expected Input:
/// ```json
/// { "refreshToken": "..." }
/// ```
///
/// A missing token answers 401; an unknown or expired one answers 403 and
/// expired tokens are revoked on the way out.
pub async fn refresh_post(
    State(state): State<AppState>,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<RefreshedToken> {
    let token = body
        .and_then(|Json(body)| body.refresh_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

    let stored = state
        .store
        .tokens
        .find(&token)
        .await?
        .ok_or_else(|| ApiError::forbidden("Invalid or expired refresh token"))?;

    if stored.is_expired(Utc::now()) {
        state.store.tokens.revoke(&stored.token).await?;
        tracing::debug!("Revoked expired refresh token for user {}", stored.user_id);
        return Err(ApiError::forbidden("Invalid or expired refresh token"));
    }

    let user = state
        .store
        .users
        .find(stored.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Invalid or expired refresh token"))?;

    let security = &state.config.security;
    let access_token = issue_token(
        &user,
        Duration::minutes(security.refreshed_token_minutes),
        &security.jwt_secret,
    )?;

    Ok(ApiResponse::success(RefreshedToken { access_token }))
}
