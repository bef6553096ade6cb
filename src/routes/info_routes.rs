use axum::{
    extract::State,
    routing::get,
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use tracing::debug;
use serde::Serialize;

use crate::state::app_state::AppState;

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(info_check))
        .with_state(state)
}

pub async fn info_check() -> Response {
    match crate::utils::conf_helper::get_cached_config() {
        Some(config) => {
            debug!("{} requested", config.name);
            Json(config).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn health_check(State(state): State<AppState>) -> Response {
    let sessions = state.sessions.read().await.len();

    Json(HealthStatus {
        status: "ok".to_owned(),
        rows: state.table.len(),
        sessions,
    })
    .into_response()
}

#[derive(Serialize)]
pub struct HealthStatus {
    status: String,
    rows: usize,
    sessions: usize,
}
