use serde::Deserialize;
use validator::Validate;

use super::{trimmed_opt, RequestSchema};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(required(message = "Email is required"), email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Password is required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Password confirmation is required"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub confirm_password: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters")
    )]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Age is required"),
        range(min = 18, message = "You must be at least 18 years old")
    )]
    pub age: Option<i32>,
}

impl RequestSchema for RegisterRequest {
    const OPERATION: &'static str = "Register";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(required(message = "Email is required"), length(min = 1, message = "Email is required"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(required(message = "Password is required"), length(min = 1, message = "Password is required"))]
    pub password: Option<String>,
}

impl RequestSchema for LoginRequest {
    const OPERATION: &'static str = "Login";
}

/// Missing tokens are an authorization failure, not a validation one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub refresh_token: Option<String>,
}
