use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::User;

pub mod password;

pub use password::{
    generate_refresh_token, hash_password, hash_password_off_runtime, verify_password, verify_password_off_runtime,
    PasswordError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

/// Sign an access token for `user` valid for `lifetime`
pub fn issue_token(user: &User, lifetime: Duration, secret: &str) -> Result<String, JwtError> {
    generate_jwt(&Claims::new(user.id, user.email.clone(), lifetime), secret)
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry, returning the claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn user() -> User {
        User {
            id: 7,
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            age: 30,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let token = issue_token(&user(), Duration::minutes(5), SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "jane@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&user(), Duration::minutes(5), SECRET).unwrap();
        assert!(matches!(verify_token(&token, "other"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token(&user(), Duration::minutes(-5), SECRET).unwrap();
        assert!(matches!(verify_token(&token, SECRET), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(matches!(
            issue_token(&user(), Duration::minutes(5), ""),
            Err(JwtError::InvalidSecret)
        ));
    }
}
