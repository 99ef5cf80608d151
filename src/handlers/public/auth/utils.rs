use chrono::Duration;
use serde::Serialize;

use crate::api::format::UserView;
use crate::auth::{generate_refresh_token, issue_token};
use crate::database::models::{RefreshToken, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Tokens handed out by register and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserView,
    pub token: String,
    pub refresh_token: String,
}

/// Issue an access token and persist a new refresh token for `user`
pub async fn open_session(state: &AppState, user: User) -> Result<AuthSession, ApiError> {
    let security = &state.config.security;

    let token = issue_token(&user, Duration::minutes(security.jwt_expiry_minutes), &security.jwt_secret)?;

    let refresh = RefreshToken::new(generate_refresh_token(), user.id, Duration::days(security.refresh_token_days));
    let refresh_token = refresh.token.clone();
    state.store.tokens.store(refresh).await?;

    Ok(AuthSession {
        user: user.into(),
        token,
        refresh_token,
    })
}

/// Emails are compared and stored lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
