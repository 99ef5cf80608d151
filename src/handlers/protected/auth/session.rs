use axum::{body::Bytes, extract::State, Extension};
use serde_json::error::Category;

use crate::api::format::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::{LogoutRequest, GENERAL_KEY};

/// GET /api/auth/whoami - Profile of the authenticated user
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": { "id": 1, "email": "jane@example.com", "name": "Jane", "age": 30, "createdAt": "..." }
/// }
/// ```
pub async fn whoami(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<UserView> {
    let user = state
        .store
        .users
        .find(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user.into()))
}

/// POST /api/auth/logout - Revoke refresh tokens
///
/// With `{ "refreshToken": "..." }` only that token is revoked, and only when it
/// belongs to the caller. An empty body, or one without a token, revokes every
/// token of the caller. Bodies that do not parse are rejected before anything
/// is revoked.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> ApiResult<()> {
    let token = parse_logout_body(&body)?
        .refresh_token
        .filter(|token| !token.is_empty());

    match token {
        Some(token) => {
            let owned = state
                .store
                .tokens
                .find(&token)
                .await?
                .is_some_and(|stored| stored.user_id == auth.id);
            if owned {
                state.store.tokens.revoke(&token).await?;
            }
        }
        None => {
            let revoked = state.store.tokens.revoke_all(auth.id).await?;
            tracing::debug!("Revoked {} refresh tokens for user {}", revoked, auth.id);
        }
    }

    Ok(ApiResponse::no_content())
}

fn parse_logout_body(body: &[u8]) -> Result<LogoutRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(LogoutRequest::default());
    }

    serde_json::from_slice(body).map_err(|err| match err.classify() {
        Category::Data => ApiError::field_error("Logout validation failed", GENERAL_KEY, err.to_string()),
        _ => ApiError::invalid_json(format!("Failed to parse the request body as JSON: {}", err)),
    })
}
