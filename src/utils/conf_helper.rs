use tokio::fs;
use std::sync::OnceLock;
use tracing::info;
use crate::models::dashboard_model::DashboardConfig;
use tokio::net::TcpListener;

static CONFIG_CACHE: OnceLock<DashboardConfig> = OnceLock::new();

const CONFIG_ENV: &str = "TRAJDASH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "dashboard.json";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub async fn read_config() -> Result<DashboardConfig, String> {
    let file_path = config_path();

    let data = fs::read_to_string(&file_path)
        .await
        .map_err(|e| format!("File read Error: {e} {file_path}"))?;

    serde_json::from_str(&data).map_err(|e| format!("JSON Parse Error: {e}"))
}

/// Binds the listener, patches the actual port back into the config and caches it.
pub async fn bind_and_cache(mut config: DashboardConfig) -> Result<TcpListener, String> {
    let bind_addr = format!(
        "{}:{}",
        config.connection.ip,
        config.connection.port
    );

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Bind failed: {e}"))?;

    let actual_port = listener
        .local_addr()
        .map_err(|e| format!("Addr error: {e}"))?
        .port();

    config.connection.port = actual_port;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| "Config already initialized".to_string())?;

    info!("Config initialized with port: {}", actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> Option<&'static DashboardConfig> {
    CONFIG_CACHE.get()
}
