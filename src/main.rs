use std::net::SocketAddr;

use anyhow::Context;

mod accounts;
mod analysis;
mod app;
mod auth;
mod config;
mod db;
mod documents;
mod errors;
mod health;
mod response;
mod scoring;
mod state;
mod store;
#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "ats_analyzer=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("APP_HOST/PORT do not form a socket address")?;

    let state = AppState::init(config).await?;
    let app = app::build_app(state.clone())?;

    app::serve(app, addr).await?;
    state.store.close().await;
    tracing::info!("database pool closed");

    Ok(())
}
