use serde::{Deserialize, Serialize};
use trajdash::LoadPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub data_path: String,
    pub connection: Connection,
    #[serde(default)]
    pub load_policy: LoadPolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub map: MapLayout,
    #[serde(default)]
    pub speed_chart: SpeedChartLayout,
    #[serde(default)]
    pub sessions: SessionLimits,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
    /// Idle seconds after which a session is dropped.
    pub ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            max_sessions: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLayout {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub height: u32,
    pub style: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            center_lat: 42.294876,
            center_lon: -83.719063,
            zoom: 17.5,
            height: 500,
            style: "light".to_string(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedChartLayout {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub height: u32,
}

impl Default for SpeedChartLayout {
    fn default() -> Self {
        Self {
            title: "Vehicle speed vs. distance to stop line".to_string(),
            x_title: "Distance to stop line".to_string(),
            y_title: "Vehicle speed".to_string(),
            height: 300,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DashboardConfig {
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
