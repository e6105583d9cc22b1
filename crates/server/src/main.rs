use anyhow::Context;
use racelink_server::api::{create_router, AppState};
use racelink_server::config::ServerConfig;
use racelink_server::db::init_pool_and_migrate;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting racelink server");
    info!("loading server config from racelink.toml");
    let config = ServerConfig::from_file("racelink.toml")
        .context("failed to load server config from racelink.toml")?;

    let db = init_pool_and_migrate(&config.database_url)
        .await
        .context("failed to connect to database and run migrations")?;
    info!("database ready, migrations applied");

    let state = AppState::new(db, &config);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening, press Ctrl+C to shut down");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
