use axum::Router;
use tracing::{error, info};

mod routes;
mod models;
mod utils;
mod state;

use crate::utils::conf_helper::{bind_and_cache, get_cached_config, read_config};
use crate::state::app_state::AppState;
use trajdash::TrajectoryReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // === CONFIG ===
    let config = read_config().await.map_err(anyhow::Error::msg)?;

    tracing_subscriber::fmt()
        .with_max_level(config.level())
        .init();

    // === BASE TABLE ===
    let table = TrajectoryReader::open(&config.data_path)
        .and_then(|reader| reader.with_policy(config.load_policy).read_table())
        .map_err(|e| {
            error!("Failed to load {}: {}", config.data_path, e);
            e
        })?;

    let state = AppState::new(table)
        .with_layouts(config.map.clone(), config.speed_chart.clone())
        .with_session_limits(config.sessions);

    // === LISTENER ===
    let listener = bind_and_cache(config).await.map_err(anyhow::Error::msg)?;

    if let Some(config) = get_cached_config() {
        info!(
            "{} serving on {}:{}",
            config.name,
            config.connection.ip,
            config.connection.port
        );
    }

    let app = Router::new()
        .merge(routes::info_routes::health_routes(state.clone()))
        .merge(routes::data_routes::data_routes(state));

    axum::serve(listener, app).await?;

    Ok(())
}
