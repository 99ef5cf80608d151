#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use notes_api::config::AppConfig;
use notes_api::database::Store;
use notes_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse";

/// In-process server on a free port, backed by the in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

/// Credentials of a registered test user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::in_memory()).await
}

/// Route server logs through the test harness; set RUST_LOG to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    init_tracing();
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let state = AppState::new(config, Store::memory());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str) -> Result<TestUser> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
                "name": "Test User",
                "age": 30
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        let data = &body["data"];
        Ok(TestUser {
            id: data["user"]["id"].as_i64().context("missing user id")?,
            email: email.to_string(),
            token: data["token"].as_str().context("missing token")?.to_string(),
            refresh_token: data["refreshToken"].as_str().context("missing refresh token")?.to_string(),
        })
    }

    pub async fn get(&self, user: &TestUser, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(&user.token).send().await?)
    }

    pub async fn post(&self, user: &TestUser, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(&user.token).json(&body).send().await?)
    }

    pub async fn patch(&self, user: &TestUser, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).bearer_auth(&user.token).json(&body).send().await?)
    }

    pub async fn delete(&self, user: &TestUser, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(&user.token).send().await?)
    }

    /// Create a note and return its `data` payload
    pub async fn create_note(&self, user: &TestUser, title: &str, content: &str, is_public: bool) -> Result<Value> {
        let res = self
            .post(user, "/api/notes", json!({ "title": title, "content": content, "isPublic": is_public }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create note failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

pub fn ids(notes: &Value) -> Vec<i64> {
    notes
        .as_array()
        .map(|notes| notes.iter().filter_map(|n| n["id"].as_i64()).collect())
        .unwrap_or_default()
}
