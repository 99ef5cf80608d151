use argon2::Config;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::Error),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2 encoded hash of `password` with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = rand::thread_rng().gen::<[u8; 32]>();
    let config = Config::default();
    Ok(argon2::hash_encoded(password.as_bytes(), &salt, &config)?)
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool, PasswordError> {
    Ok(argon2::verify_encoded(hash, password.as_bytes())?)
}

/// `hash_password` on the blocking pool
pub async fn hash_password_off_runtime(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// `verify_password` on the blocking pool
pub async fn verify_password_off_runtime(hash: String, password: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password)).await?
}

/// Opaque refresh token: 32 random bytes, hex encoded
pub fn generate_refresh_token() -> String {
    let bytes = rand::thread_rng().gen::<[u8; 32]>();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[tokio::test]
    async fn hashes_on_the_blocking_pool() {
        let hash = hash_password_off_runtime("correct horse".to_string()).await.unwrap();
        assert!(verify_password_off_runtime(hash.clone(), "correct horse".to_string()).await.unwrap());
        assert!(!verify_password_off_runtime(hash, "battery staple".to_string()).await.unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn refresh_tokens_are_hex() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_refresh_token());
    }
}
