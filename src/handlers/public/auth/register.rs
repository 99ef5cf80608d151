use axum::extract::State;

use super::utils::{normalize_email, open_session, AuthSession};
use crate::auth::hash_password_off_runtime;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::state::AppState;
use crate::validation::{RegisterRequest, RequestSchema};

/// POST /api/auth/register - Create an account and receive tokens
///
/// Expected Input:
/// ```json
/// {
///   "email": "jane@example.com",
///   "password": "at least 8 chars",
///   "confirmPassword": "at least 8 chars",
///   "name": "Jane",
///   "age": 30
/// }
/// ```
///
/// Expected Output (201):
/// ```json
/// {
///   "success": true,
///   "data": { "user": { "id": 1, "email": "jane@example.com", ... }, "token": "...", "refreshToken": "..." }
/// }
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let RegisterRequest {
        email: Some(email),
        password: Some(password),
        name: Some(name),
        age: Some(age),
        ..
    } = body
    else {
        return Err(ApiError::validation_error(RegisterRequest::failure_message(), None));
    };

    let email = normalize_email(&email);
    if state.store.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password_off_runtime(password).await?;
    let user = state
        .store
        .users
        .create(NewUser {
            email,
            name,
            age,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);
    Ok(ApiResponse::created(open_session(&state, user).await?))
}
