use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use url::Url;

use super::config::{load_session_from, save_session_to, session_file, Session};

/// Status and parsed body of one API call
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiReply {
    /// `data` of a success envelope, or an error built from the failure envelope
    pub fn into_data(self) -> anyhow::Result<Value> {
        if self.status.is_success() {
            return Ok(self.body.get("data").cloned().unwrap_or(Value::Null));
        }
        Err(anyhow!(describe_failure(self.status, &self.body)))
    }
}

/// Human-readable summary of an error envelope
pub fn describe_failure(status: StatusCode, body: &Value) -> String {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed"));

    let mut out = format!("{} ({})", message, status.as_u16());
    if let Some(errors) = body.get("errors").and_then(Value::as_object) {
        for (field, messages) in errors {
            let joined = messages
                .as_array()
                .map(|m| m.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            out.push_str(&format!("\n  {}: {}", field, joined));
        }
    }
    out
}

/// HTTP client bound to the CLI session
pub struct ApiClient {
    http: reqwest::Client,
    pub session: Session,
    session_path: Option<PathBuf>,
}

impl ApiClient {
    /// Client over an in-memory session that is never written to disk
    pub fn new(session: Session) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            session,
            session_path: None,
        })
    }

    /// Client over the session file in the CLI config directory
    pub fn from_disk() -> anyhow::Result<Self> {
        let path = session_file()?;
        let session = load_session_from(&path)?;
        let mut client = Self::new(session)?;
        client.session_path = Some(path);
        Ok(client)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.session_path {
            save_session_to(path, &self.session)?;
        }
        Ok(())
    }

    pub fn url(&self, path: &str) -> anyhow::Result<Url> {
        let base = Url::parse(&self.session.server_url)
            .with_context(|| format!("invalid server URL '{}'", self.session.server_url))?;
        Ok(base.join(path)?)
    }

    /// Unauthenticated call
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> anyhow::Result<ApiReply> {
        self.execute(method, path, body, None).await
    }

    /// Authenticated call; a 401 triggers one token refresh and a retry
    pub async fn authed(&mut self, method: Method, path: &str, body: Option<&Value>) -> anyhow::Result<ApiReply> {
        let token = self
            .session
            .access_token
            .clone()
            .ok_or_else(|| anyhow!("Not logged in. Run `notes auth login` first"))?;

        let reply = self.execute(method.clone(), path, body, Some(&token)).await?;
        if reply.status != StatusCode::UNAUTHORIZED || self.session.refresh_token.is_none() {
            return Ok(reply);
        }

        tracing::debug!("Access token rejected, refreshing");
        let token = self.refresh().await?;
        self.execute(method, path, body, Some(&token)).await
    }

    /// Exchange the stored refresh token for a new access token
    pub async fn refresh(&mut self) -> anyhow::Result<String> {
        let refresh_token = self
            .session
            .refresh_token
            .clone()
            .ok_or_else(|| anyhow!("No refresh token stored. Run `notes auth login` first"))?;

        let data = self
            .send(Method::POST, "/api/auth/refresh", Some(&json!({ "refreshToken": refresh_token })))
            .await?
            .into_data()
            .context("token refresh failed")?;

        let access_token = data
            .get("accessToken")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("refresh response did not contain an access token"))?
            .to_string();

        self.session.access_token = Some(access_token.clone());
        self.save()?;
        Ok(access_token)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> anyhow::Result<ApiReply> {
        let url = self.url(path)?;
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_onto_server_url() {
        let mut session = Session::default();
        session.server_url = "http://example.com:8080/".into();
        let client = ApiClient::new(session).unwrap();
        assert_eq!(client.url("/api/notes").unwrap().as_str(), "http://example.com:8080/api/notes");
    }

    #[test]
    fn failures_list_field_errors() {
        let body = json!({
            "success": false,
            "message": "Create Note validation failed",
            "errors": { "title": ["Title is required"] }
        });
        let text = describe_failure(StatusCode::BAD_REQUEST, &body);
        assert!(text.starts_with("Create Note validation failed (400)"));
        assert!(text.contains("title: Title is required"));
    }

    #[test]
    fn success_unwraps_data() {
        let reply = ApiReply {
            status: StatusCode::OK,
            body: json!({ "success": true, "data": { "id": 1 } }),
        };
        assert_eq!(reply.into_data().unwrap()["id"], 1);

        let reply = ApiReply {
            status: StatusCode::NO_CONTENT,
            body: Value::Null,
        };
        assert_eq!(reply.into_data().unwrap(), Value::Null);
    }
}
