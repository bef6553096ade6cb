// Per-instance projections of a filtered row set

use crate::core::constants::*;
use crate::core::filter::FilteredRows;
use crate::core::format::{InstanceId, TrajectoryTable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One map layer: the positions of a single trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub name: String,
    pub instance: InstanceId,
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedPoint {
    pub cp_dist: f64,
    pub speed: f64,
}

/// Speed against distance to the stop line, colored by cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedSeries {
    pub name: String,
    pub instance: InstanceId,
    pub points: Vec<SpeedPoint>,
    /// Parallel to `points`.
    pub clusters: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDescription {
    pub label: String,
    pub text: String,
}

impl ClusterDescription {
    pub fn line(&self) -> String {
        format!("{}: {}", self.label, self.text)
    }
}

/// Heading plus one description line per cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretationBlock {
    pub heading: String,
    pub instance: InstanceId,
    pub clusters: Vec<ClusterDescription>,
}

impl InterpretationBlock {
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(self.heading.clone())
            .chain(self.clusters.iter().map(ClusterDescription::line))
            .collect()
    }
}

pub fn map_layers(rows: &FilteredRows<'_>) -> Vec<MapLayer> {
    rows.groups()
        .into_iter()
        .map(|group| MapLayer {
            name: group.instance.to_string(),
            instance: group.instance.clone(),
            points: group
                .samples
                .iter()
                .map(|s| GeoPoint {
                    lat: s.lat,
                    lon: s.long,
                })
                .collect(),
        })
        .collect()
}

pub fn speed_series(rows: &FilteredRows<'_>) -> Vec<SpeedSeries> {
    rows.groups()
        .into_iter()
        .map(|group| {
            let (points, clusters) = group
                .samples
                .iter()
                .map(|s| {
                    (
                        SpeedPoint {
                            cp_dist: s.cp_dist,
                            speed: s.speed,
                        },
                        s.cluster,
                    )
                })
                .unzip();

            SpeedSeries {
                name: group.instance.to_string(),
                instance: group.instance.clone(),
                points,
                clusters,
            }
        })
        .collect()
}

/// Strips bracket and quote characters, then splits into numbered cluster lines.
///
/// Segments keep their split order; an empty string yields no clusters.
pub fn split_interpretation(raw: &str) -> Vec<ClusterDescription> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !INTERP_STRIP_CHARS.contains(c))
        .collect();

    if cleaned.trim().is_empty() {
        return Vec::new();
    }

    cleaned
        .split(INTERP_SEPARATOR)
        .enumerate()
        .map(|(i, text)| ClusterDescription {
            label: format!("{}{}", CLUSTER_LABEL_PREFIX, i + 1),
            text: text.trim().to_string(),
        })
        .collect()
}

pub fn interpretations(rows: &FilteredRows<'_>, table: &TrajectoryTable) -> Vec<InterpretationBlock> {
    rows.instances()
        .into_iter()
        .map(|instance| InterpretationBlock {
            heading: format!("{}{}", TRAJECTORY_HEADING_PREFIX, instance),
            instance: instance.clone(),
            clusters: table
                .interpretation(instance)
                .map(split_interpretation)
                .unwrap_or_default(),
        })
        .collect()
}
