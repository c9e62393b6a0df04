use std::sync::Arc;

use timesheet_engine::api::{AppState, create_router};
use timesheet_engine::config::ConfigLoader;
use timesheet_engine::store::SqliteStorage;
use tokio::net::TcpListener;
use tracing::info;

const CONFIG_DIR_ENV: &str = "TIMESHEET_CONFIG";
const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesheet_engine=info".into()),
        )
        .init();

    let config_dir =
        std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;
    info!(config_dir = %config_dir, "Configuration loaded");

    let storage = SqliteStorage::open(&config.server().database_path)?;
    let bind_address = config.server().bind_address.clone();

    let state = AppState::new(config, Arc::new(storage));
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Timesheet API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
