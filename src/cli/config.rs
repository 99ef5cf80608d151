use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Everything the CLI remembers between invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            email: None,
            access_token: None,
            refresh_token: None,
            logged_in_at: None,
        }
    }
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn sign_in(&mut self, email: String, access_token: String, refresh_token: String) {
        self.email = Some(email);
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        self.logged_in_at = Some(Utc::now());
    }

    /// Forget credentials but keep the selected server
    pub fn sign_out(&mut self) {
        self.email = None;
        self.access_token = None;
        self.refresh_token = None;
        self.logged_in_at = None;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("NOTES_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("notes").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn load_session_from(path: &PathBuf) -> anyhow::Result<Session> {
    if !path.exists() {
        return Ok(Session::default());
    }

    let content = fs::read_to_string(path)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session_to(path: &PathBuf, session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_default_session() {
        let path = std::env::temp_dir().join(format!("notes-cli-missing-{}.json", std::process::id()));
        let session = load_session_from(&path).unwrap();
        assert_eq!(session, Session::default());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn session_survives_a_save() {
        let path = std::env::temp_dir().join(format!("notes-cli-session-{}.json", std::process::id()));
        let mut session = Session::default();
        session.sign_in("a@example.com".into(), "access".into(), "refresh".into());
        save_session_to(&path, &session).unwrap();

        let loaded = load_session_from(&path).unwrap();
        assert_eq!(loaded, session);

        let mut signed_out = loaded;
        signed_out.sign_out();
        assert_eq!(signed_out.server_url, DEFAULT_SERVER_URL);
        assert!(signed_out.refresh_token.is_none());

        let _ = fs::remove_file(path);
    }
}
