// Data structures for trajectory tables

use crate::core::constants::*;
use crate::core::timebase::CivilDateTime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Opaque trajectory key, compared by its textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label shown in the instance picker.
    pub fn trip_label(&self) -> String {
        format!("{}{}", TRIP_LABEL_PREFIX, self.0)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One CSV row as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "Instance")]
    pub instance: String,
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Long")]
    pub long: f64,
    #[serde(rename = "Speed")]
    pub speed: f64,
    #[serde(rename = "CP_dist")]
    pub cp_dist: f64,
    #[serde(rename = "clusters")]
    pub cluster: f64,
    #[serde(rename = "interp")]
    pub interp: String,
}

/// One annotated sample of the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub time_raw: f64,
    pub instance: InstanceId,
    pub lat: f64,
    pub long: f64,
    pub speed: f64,
    pub cp_dist: f64,
    pub cluster: i64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl Sample {
    pub fn from_record(record: RawRecord, civil: &CivilDateTime, cluster: i64) -> Self {
        Self {
            time_raw: record.time,
            instance: InstanceId(record.instance),
            lat: record.lat,
            long: record.long,
            speed: record.speed,
            cp_dist: record.cp_dist,
            cluster,
            year: civil.year,
            month: civil.month,
            day: civil.day,
            hour: civil.hour,
        }
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.year == date.year() && self.month == date.month() && self.day == date.day()
    }
}

/// Immutable table produced by a load.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryTable {
    samples: Vec<Sample>,
    interpretations: HashMap<InstanceId, String>,
    instances: Vec<InstanceId>,
    earliest: Option<CivilDateTime>,
    latest: Option<CivilDateTime>,
}

impl TrajectoryTable {
    /// Assembles a table from already-annotated samples.
    ///
    /// Callers are expected to have checked that each instance has one interpretation.
    pub fn from_parts(
        samples: Vec<Sample>,
        interpretations: HashMap<InstanceId, String>,
        span: Option<(CivilDateTime, CivilDateTime)>,
    ) -> Self {
        let instances: Vec<InstanceId> = {
            let mut seen = HashSet::new();
            samples
                .iter()
                .filter(|s| seen.insert(&s.instance))
                .map(|s| s.instance.clone())
                .collect()
        };

        Self {
            samples,
            interpretations,
            instances,
            earliest: span.map(|(lo, _)| lo),
            latest: span.map(|(_, hi)| hi),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct instances in first-seen order.
    pub fn instances(&self) -> &[InstanceId] {
        &self.instances
    }

    pub fn interpretation(&self, instance: &InstanceId) -> Option<&str> {
        self.interpretations.get(instance).map(String::as_str)
    }

    pub fn earliest(&self) -> Option<CivilDateTime> {
        self.earliest
    }

    pub fn latest(&self) -> Option<CivilDateTime> {
        self.latest
    }
}

/// Summary used to seed the date picker.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub instances: usize,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Latest day in the table; the picker starts there.
    pub default_date: Option<NaiveDate>,
}

impl TrajectoryTable {
    pub fn summary(&self) -> TableSummary {
        let min_date = self.earliest.and_then(|c| c.date());
        let max_date = self.latest.and_then(|c| c.date());
        TableSummary {
            rows: self.samples.len(),
            instances: self.instances.len(),
            min_date,
            max_date,
            default_date: max_date,
        }
    }
}
