use serde::{Deserialize, Serialize};
use trajdash::{InstanceId, InstanceOption, InterpretationBlock, MapLayer, SpeedSeries};

use crate::models::dashboard_model::{MapLayout, SpeedChartLayout};

#[derive(Debug, Serialize)]
pub struct MapFigure {
    pub layers: Vec<MapLayer>,
    pub layout: MapLayout,
}

#[derive(Debug, Serialize)]
pub struct SpeedFigure {
    pub series: Vec<SpeedSeries>,
    pub layout: SpeedChartLayout,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub options: Vec<InstanceOption>,
    pub map: MapFigure,
    pub speed: SpeedFigure,
    pub interpretation: Vec<InterpretationBlock>,
}

#[derive(Debug, Deserialize)]
pub struct InstancesRequest {
    #[serde(default)]
    pub instances: Vec<InstanceId>,
}
