use axum::extract::State;

use super::utils::{normalize_email, open_session, AuthSession};
use crate::auth::verify_password_off_runtime;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::state::AppState;
use crate::validation::{LoginRequest, RequestSchema};

/// POST /api/auth/login - Authenticate and receive tokens
///
/// Unknown emails answer 404, wrong passwords 401.
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let LoginRequest {
        email: Some(email),
        password: Some(password),
    } = body
    else {
        return Err(ApiError::validation_error(LoginRequest::failure_message(), None));
    };

    let user = state
        .store
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password_off_runtime(user.password_hash.clone(), password).await? {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid password"));
    }

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(open_session(&state, user).await?))
}
