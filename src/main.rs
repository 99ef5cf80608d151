use tracing_subscriber::EnvFilter;

use notes_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config().clone();

    let default_filter = if config.is_development() || config.server.enable_request_logging {
        "notes_api=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting Notes API in {:?} mode", config.environment);

    config.validate().map_err(anyhow::Error::msg)?;

    notes_api::serve(config).await
}
