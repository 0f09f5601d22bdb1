use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use showscout::{
    config::Config,
    db::{create_pool, WatchedShowStore},
    routes::{create_router, AppState},
    services::{NetflixLoversClient, OpenAiChatModel},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("showscout=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;

    let verifier = NetflixLoversClient::new(
        config.verification_base_url.clone(),
        Duration::from_secs(config.verification_timeout_secs),
    )?;

    let state = Arc::new(AppState {
        store: WatchedShowStore::new(pool),
        chat_model: Arc::new(OpenAiChatModel::new(
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        )),
        verifier: Arc::new(verifier),
        default_api_key: config.default_api_key(),
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
