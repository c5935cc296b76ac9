//! Zentara Stake API server

use std::{env, net::SocketAddr};

use anyhow::{Context, Result};
use tracing::{info, warn};

use zentara_stake::{
    session::{FileSessionStore, SessionManager},
    staking_handlers::{router, AppState},
    telemetry, LedgerConfig, StakingService,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = match env::var("ZENTARA_CONFIG") {
        Ok(path) => LedgerConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        Err(_) => LedgerConfig::from_env().context("loading config from environment")?,
    };

    telemetry::init_subscriber(&config.log_level);

    let session = SessionManager::new(FileSessionStore::new(&config.session.storage_path));
    match session.restore().await {
        Ok(Some(user)) => info!(user_id = %user.id, email = %user.email, "Restored session"),
        Ok(None) => info!("No saved session"),
        Err(e) => warn!("Failed to restore session: {}", e),
    }

    let staking = StakingService::from_config(&config.staking)?;
    info!(
        positions = staking.list().await.len(),
        latency = ?config.staking.simulated_latency,
        "Staking ledger seeded"
    );

    let app = router(AppState { staking }, &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("API server listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
