use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Secret used when nothing else is configured. Accepted only outside production.
pub const DEVELOPMENT_JWT_SECRET: &str = "jwtSecret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub storage: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Lifetime of tokens issued at register/login.
    pub jwt_expiry_minutes: i64,
    /// Lifetime of tokens issued through /api/auth/refresh.
    pub refreshed_token_minutes: i64,
    pub refresh_token_days: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub default_author: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("NOTES_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        match env::var("NOTES_STORAGE").as_deref() {
            Ok("memory") => self.database.storage = StorageBackend::Memory,
            Ok("postgres") => self.database.storage = StorageBackend::Postgres,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Ok(v) = env::var("REFRESHED_TOKEN_MINUTES") {
            self.security.refreshed_token_minutes = v.parse().unwrap_or(self.security.refreshed_token_minutes);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_DAYS") {
            self.security.refresh_token_days = v.parse().unwrap_or(self.security.refresh_token_days);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Notes overrides
        if let Ok(v) = env::var("NOTES_DEFAULT_LIMIT") {
            self.notes.default_limit = v.parse().unwrap_or(self.notes.default_limit);
        }
        if let Ok(v) = env::var("NOTES_MAX_LIMIT") {
            self.notes.max_limit = v.parse().unwrap_or(self.notes.max_limit);
        }
        if let Ok(v) = env::var("NOTES_DEFAULT_AUTHOR") {
            if !v.trim().is_empty() {
                self.notes.default_author = v.trim().to_string();
            }
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 1024 * 1024, // 1MB
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_minutes: 60,
                refreshed_token_minutes: 15,
                refresh_token_days: 7,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            notes: NotesConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 512 * 1024,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_minutes: 60,
                refreshed_token_minutes: 15,
                refresh_token_days: 7,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            notes: NotesConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 256 * 1024,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                // Must be supplied through JWT_SECRET; see `validate`.
                jwt_secret: String::new(),
                jwt_expiry_minutes: 60,
                refreshed_token_minutes: 15,
                refresh_token_days: 7,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            notes: NotesConfig::default(),
        }
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), String> {
        if self.security.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".to_string());
        }
        if self.environment == Environment::Production && self.security.jwt_secret == DEVELOPMENT_JWT_SECRET {
            return Err("JWT_SECRET must not use the development default in production".to_string());
        }
        if self.database.storage == StorageBackend::Postgres && self.database.url.is_none() {
            return Err("DATABASE_URL must be set when NOTES_STORAGE=postgres".to_string());
        }
        if self.notes.default_limit < 1 || self.notes.max_limit < self.notes.default_limit {
            return Err(format!(
                "invalid page sizes: default {} max {}",
                self.notes.default_limit, self.notes.max_limit
            ));
        }
        Ok(())
    }

    /// Development configuration backed by the in-memory store.
    pub fn in_memory() -> Self {
        let mut config = Self::development();
        config.database.storage = StorageBackend::Memory;
        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            default_limit: 3,
            max_limit: 100,
            default_author: "Unknown".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
