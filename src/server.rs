use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{AppConfig, DatabaseConfig, StorageBackend};
use crate::database::{DatabaseError, DatabaseManager, Store};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router: public routes, JWT-protected routes and global middleware
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(note_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(RequestBodyLimitLayer::new(state.config.server.max_request_size_bytes))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/refresh", post(auth::refresh_post))
        // Short aliases kept for older clients
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/logout", post(auth::session_logout))
}

fn note_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::notes;

    Router::new()
        // Collection
        .route("/api/notes", get(notes::notes_get).post(notes::notes_post))
        // Individual notes
        .route(
            "/api/notes/:id",
            get(notes::note_get)
                .put(notes::note_update)
                .patch(notes::note_update)
                .delete(notes::note_delete),
        )
        // Sharing
        .route("/api/notes/:id/shares", get(notes::shares_get))
        .route("/api/notes/:id/share", post(notes::share_post))
        .route("/api/notes/:id/share/:user_id", delete(notes::share_delete))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins = &config.security.cors_origins;
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| origin.parse::<HeaderValue>().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Notes API",
            "version": version,
            "description": "Notes CRUD API with JWT accounts",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/api/auth/register, /api/auth/login, /api/auth/refresh (public - token acquisition)",
                "auth": "/api/auth/whoami, /api/auth/logout (protected)",
                "notes": "/api/notes[/:id] (protected)",
                "sharing": "/api/notes/:id/shares, /api/notes/:id/share[/:user_id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": state.store.backend,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage": state.store.backend,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}

/// Open the configured storage backend, bootstrapping the schema for Postgres
pub async fn connect_store(config: &DatabaseConfig) -> Result<Store, DatabaseError> {
    match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Store::memory())
        }
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            DatabaseManager::ensure_schema(&pool).await?;
            Ok(Store::postgres(pool))
        }
    }
}

/// Bind `0.0.0.0:<port>` and serve until Ctrl-C or SIGTERM
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = connect_store(&config.database).await?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Notes API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(config, store)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notes API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    fn test_app(config: AppConfig) -> Router {
        app(AppState::new(config, Store::memory()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_storage_backend() {
        let response = test_app(AppConfig::in_memory())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["storage"], "memory");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let response = test_app(AppConfig::in_memory())
            .oneshot(Request::get("/api/notes").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not Authorized");
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let mut config = AppConfig::in_memory();
        config.server.max_request_size_bytes = 64;
        let payload = format!(r#"{{"email":"{}@example.com"}}"#, "a".repeat(128));

        let response = test_app(config)
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, payload.len())
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let mut config = AppConfig::in_memory();
        config.environment = crate::config::Environment::Production;
        config.security.cors_origins = vec!["https://notes.example.com".to_string()];

        let response = test_app(config)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/notes")
                    .header(header::ORIGIN, "https://notes.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://notes.example.com"
        );
    }
}
