use axum::{
    routing::{get, post},
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
    extract::{Path, State},
};

use std::time::Instant;
use tracing::{info, debug, warn};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::models::figure_model::{InstancesRequest, MapFigure, QueryResponse, SpeedFigure};
use crate::state::app_state::AppState;
use trajdash::core::selection::HourOption;
use trajdash::{
    filter, hour_options, interpretations, map_layers, speed_series, DashError, FilteredRows,
    HoursInput, InstanceId, InstanceOption, Selection, TableSummary,
};

#[derive(Serialize)]
pub struct DatasetResponse {
    pub summary: TableSummary,
    pub instances: Vec<InstanceOption>,
    pub hours: Vec<HourOption>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct SelectionRequest {
    pub date: String,
    #[serde(default)]
    pub hours: HoursInput,
}

#[derive(Deserialize, Debug)]
pub struct QueryRequest {
    pub date: String,
    #[serde(default)]
    pub hours: HoursInput,
    #[serde(default)]
    pub instances: Vec<InstanceId>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}


/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/dataset", get(dataset))
        .route("/query", post(query))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", axum::routing::delete(close_session))
        .route("/sessions/{id}/selection", post(select))
        .route("/sessions/{id}/map", post(session_map))
        .route("/sessions/{id}/speed", post(session_speed))
        .route("/sessions/{id}/interpretation", post(session_interpretation))
        .with_state(state)
}


/// =======================
/// HELPERS
/// =======================

fn reject(e: DashError) -> Response {
    let status = if e.is_rejected_selection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    warn!("Request rejected: {}", e);
    (status, Json(ErrorBody { error: e.to_string() })).into_response()
}

/// Re-derives the rows for a session's stored selection, narrowed to `instances`.
///
/// `None` when the session does not exist.
async fn session_rows<'a>(
    state: &'a AppState,
    id: &Uuid,
    instances: &[InstanceId],
) -> Option<FilteredRows<'a>> {
    let selection = state.sessions.write().await.selection(id, Instant::now())?;

    Some(match selection {
        Some(selection) => filter(state.table.samples(), &selection).select_instances(instances),
        None => FilteredRows::default(),
    })
}

fn map_figure(state: &AppState, rows: &FilteredRows<'_>) -> MapFigure {
    MapFigure {
        layers: map_layers(rows),
        layout: state.map_layout.clone(),
    }
}

fn speed_figure(state: &AppState, rows: &FilteredRows<'_>) -> SpeedFigure {
    SpeedFigure {
        series: speed_series(rows),
        layout: state.speed_layout.clone(),
    }
}


/// =======================
/// HANDLERS
/// =======================

async fn dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let instances = state
        .table
        .instances()
        .iter()
        .map(|id| InstanceOption {
            label: id.trip_label(),
            value: id.clone(),
        })
        .collect();

    Json(DatasetResponse {
        summary: state.table.summary(),
        instances,
        hours: hour_options(),
    })
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    debug!("Query: {:?}", request);

    let selection = match Selection::parse(&request.date, &request.hours) {
        Ok(s) => s,
        Err(e) => return reject(e),
    };

    let rows = filter(state.table.samples(), &selection);
    let chosen = rows.select_instances(&request.instances);

    Json(QueryResponse {
        options: rows.instance_options(),
        map: map_figure(&state, &chosen),
        speed: speed_figure(&state, &chosen),
        interpretation: interpretations(&chosen, &state.table),
    })
    .into_response()
}

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.sessions.write().await.open(Instant::now());
    info!("Session opened: {}", session);
    Json(SessionResponse { session })
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.sessions.write().await.close(&id) {
        info!("Session closed: {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> Response {
    debug!("Session {} selection: {:?}", id, request);

    let selection = match Selection::parse(&request.date, &request.hours) {
        Ok(s) => s,
        Err(e) => return reject(e),
    };

    let options = filter(state.table.samples(), &selection).instance_options();

    if state.sessions.write().await.select(&id, selection, Instant::now()) {
        debug!("Session {} offers {} instances", id, options.len());
        Json(options).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn session_map(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InstancesRequest>,
) -> Response {
    match session_rows(&state, &id, &request.instances).await {
        Some(rows) => Json(map_figure(&state, &rows)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn session_speed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InstancesRequest>,
) -> Response {
    match session_rows(&state, &id, &request.instances).await {
        Some(rows) => Json(speed_figure(&state, &rows)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn session_interpretation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InstancesRequest>,
) -> Response {
    match session_rows(&state, &id, &request.instances).await {
        Some(rows) => Json(interpretations(&rows, &state.table)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::models::dashboard_model::SessionLimits;
    use trajdash::TrajectoryReader;

    // Two trips on 2013-07-24 (hours 17 and 18) and one on 2013-07-23.
    const CSV: &str = "Time,Instance,Lat,Long,Speed,CP_dist,clusters,interp\n\
        301773079421553,1,42.29,-83.71,10,30,1,\"['stop', 'go']\"\n\
        301773079421553,2,42.30,-83.72,12,20,1,[cruise]\n\
        301776679421553,2,42.31,-83.73,14,10,2,[cruise]\n\
        301686679421553,3,42.28,-83.70,9,40,1,[idle]\n";

    fn state() -> AppState {
        let table = TrajectoryReader::from_reader(Cursor::new(CSV))
            .unwrap()
            .read_table()
            .unwrap();
        AppState::new(table)
    }

    fn legacy_hours(tokens: &str) -> HoursInput {
        serde_json::from_str(tokens).unwrap()
    }

    async fn open(state: &AppState) -> Uuid {
        create_session(State(state.clone())).await.0.session
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn instances(ids: &[&str]) -> Json<InstancesRequest> {
        Json(InstancesRequest {
            instances: ids.iter().map(|id| InstanceId::from(*id)).collect(),
        })
    }

    async fn select_afternoon(state: &AppState, id: Uuid) {
        let resp = select(
            State(state.clone()),
            Path(id),
            Json(SelectionRequest {
                date: "2013-07-24".to_string(),
                hours: legacy_hours(r#"["17:00", "17"]"#),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sessions_keep_their_own_selection() {
        let state = state();
        let a = open(&state).await;
        let b = open(&state).await;

        let resp = select(
            State(state.clone()),
            Path(a),
            Json(SelectionRequest {
                date: "2013-07-24".to_string(),
                hours: legacy_hours(r#"["17:00", "17"]"#),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = select(
            State(state.clone()),
            Path(b),
            Json(SelectionRequest {
                date: "2013-07-23".to_string(),
                hours: HoursInput::default(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let all = [
            InstanceId::from("1"),
            InstanceId::from("2"),
            InstanceId::from("3"),
        ];
        let rows_a = session_rows(&state, &a, &all).await.unwrap();
        let rows_b = session_rows(&state, &b, &all).await.unwrap();

        let ids_a: Vec<&str> = rows_a.instances().into_iter().map(InstanceId::as_str).collect();
        let ids_b: Vec<&str> = rows_b.instances().into_iter().map(InstanceId::as_str).collect();
        assert_eq!(ids_a, vec!["1", "2"]);
        assert_eq!(ids_b, vec!["3"]);
    }

    #[tokio::test]
    async fn test_fresh_session_projects_nothing() {
        let state = state();
        let id = open(&state).await;
        let rows = session_rows(&state, &id, &[InstanceId::from("1")]).await.unwrap();
        assert!(rows.is_empty());
        assert!(session_rows(&state, &Uuid::new_v4(), &[]).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_selection_is_bad_request() {
        let state = state();
        let id = open(&state).await;
        let resp = select(
            State(state.clone()),
            Path(id),
            Json(SelectionRequest {
                date: "2013-07-24".to_string(),
                hours: legacy_hours(r#"["17:00"]"#),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let state = state();
        let resp = select(
            State(state.clone()),
            Path(Uuid::new_v4()),
            Json(SelectionRequest {
                date: "2013-07-24".to_string(),
                hours: HoursInput::default(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            close_session(State(state), Path(Uuid::new_v4())).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_query_is_stateless() {
        let state = state();
        let resp = query(
            State(state.clone()),
            Json(QueryRequest {
                date: "2013-07-24".to_string(),
                hours: HoursInput::default(),
                instances: vec![InstanceId::from("2")],
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.sessions.read().await.is_empty());

        let body = body_json(resp).await;
        // options cover the whole day, projections only the chosen trip
        let labels: Vec<&str> = body["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Trip 1", "Trip 2"]);

        let layers = body["map"]["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0]["name"], "2");
        assert_eq!(layers[0]["points"].as_array().unwrap().len(), 2);
        assert_eq!(body["map"]["layout"]["zoom"], 17.5);

        assert_eq!(body["speed"]["series"][0]["clusters"], serde_json::json!([1, 2]));
        assert_eq!(
            body["speed"]["layout"]["title"],
            "Vehicle speed vs. distance to stop line"
        );
        assert_eq!(body["interpretation"][0]["heading"], "Trajectory 2");
        assert_eq!(body["interpretation"][0]["clusters"][0]["text"], "cruise");
    }

    #[tokio::test]
    async fn test_dataset_summary() {
        let body = serde_json::to_value(&dataset(State(state())).await.0).unwrap();
        assert_eq!(body["summary"]["rows"], 4);
        assert_eq!(body["summary"]["instances"], 3);
        assert_eq!(body["summary"]["min_date"], "2013-07-23");
        assert_eq!(body["summary"]["default_date"], "2013-07-24");
        assert_eq!(body["instances"][2]["label"], "Trip 3");
        assert_eq!(body["hours"].as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_session_projections() {
        let state = state();
        let id = open(&state).await;
        select_afternoon(&state, id).await;

        let resp = session_map(State(state.clone()), Path(id), instances(&["1", "2", "3"])).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let map = body_json(resp).await;
        let names: Vec<&str> = map["layers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["1", "2"]);
        assert_eq!(map["layers"][1]["points"][0]["lat"], 42.30);

        let resp = session_speed(State(state.clone()), Path(id), instances(&["2"])).await;
        let speed = body_json(resp).await;
        assert_eq!(speed["series"].as_array().unwrap().len(), 1);
        assert_eq!(speed["series"][0]["points"][0]["cp_dist"], 20.0);
        assert_eq!(speed["series"][0]["clusters"], serde_json::json!([1]));

        let resp = session_interpretation(State(state.clone()), Path(id), instances(&["1"])).await;
        let blocks = body_json(resp).await;
        assert_eq!(blocks[0]["heading"], "Trajectory 1");
        assert_eq!(blocks[0]["clusters"][0]["label"], "Cluster 1");
        assert_eq!(blocks[0]["clusters"][1]["text"], "go");

        let resp = session_map(State(state.clone()), Path(Uuid::new_v4()), instances(&["1"])).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_cap_evicts_oldest() {
        let state = state().with_session_limits(SessionLimits {
            ttl_secs: 3600,
            max_sessions: 1,
        });
        let first = open(&state).await;
        let second = open(&state).await;

        let resp = session_map(State(state.clone()), Path(first), instances(&["1"])).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        select_afternoon(&state, second).await;
        assert_eq!(state.sessions.read().await.len(), 1);
    }
}
