// Trajectory CSV reader: loads and annotates the base table once

use crate::core::compression::{decompressing_reader, CompressionType};
use crate::core::constants::REQUIRED_COLUMNS;
use crate::core::error::{DashError, Result};
use crate::core::format::*;
use crate::core::timebase::{to_civil_time, CivilDateTime};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// What to do with a row that cannot be annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Fail the whole load on the first bad row.
    Abort,
    /// Log the row and leave it out of the table.
    #[default]
    SkipRow,
}

pub struct TrajectoryReader {
    source: String,
    csv: csv::Reader<Box<dyn Read>>,
    policy: LoadPolicy,
}

impl TrajectoryReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let compression = CompressionType::from_path(path);
        debug!("Opening {} ({:?})", path.display(), compression);

        let input = decompressing_reader(BufReader::new(file), compression)?;
        Self::from_boxed(input, path.display().to_string())
    }

    pub fn from_reader<R: Read + 'static>(input: R) -> Result<Self> {
        Self::from_boxed(Box::new(input), "<memory>".to_string())
    }

    fn from_boxed(input: Box<dyn Read>, source: String) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers = csv.headers()?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(DashError::MissingColumn(column.to_string()));
            }
        }

        Ok(Self {
            source,
            csv,
            policy: LoadPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads every row, converting timestamps and collecting per-instance interpretations.
    pub fn read_table(mut self) -> Result<TrajectoryTable> {
        let mut samples = Vec::new();
        let mut interpretations: HashMap<InstanceId, String> = HashMap::new();
        let mut span: Option<(CivilDateTime, CivilDateTime)> = None;
        let mut rejected = 0usize;

        for (idx, result) in self.csv.deserialize::<RawRecord>().enumerate() {
            let row = idx + 1;

            let (sample, civil, interp) = match annotate(row, result) {
                Ok(annotated) => annotated,
                Err(e) => match self.policy {
                    LoadPolicy::Abort => {
                        error!("Aborting load of {} at row {}: {}", self.source, row, e);
                        return Err(e);
                    }
                    LoadPolicy::SkipRow => {
                        warn!("Skipping row {} of {}: {}", row, self.source, e);
                        rejected += 1;
                        continue;
                    }
                },
            };

            match interpretations.entry(sample.instance.clone()) {
                Entry::Occupied(existing) if existing.get() != &interp => {
                    error!(
                        "Instance {} changes interpretation at row {}",
                        sample.instance, row
                    );
                    return Err(DashError::InconsistentInterpretation(
                        sample.instance.to_string(),
                    ));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(interp);
                }
            }

            span = Some(match span {
                Some((lo, hi)) => (lo.min(civil), hi.max(civil)),
                None => (civil, civil),
            });
            samples.push(sample);
        }

        let table = TrajectoryTable::from_parts(samples, interpretations, span);

        info!(
            "Loaded {} samples ({} rejected) across {} instances from {}",
            table.len(),
            rejected,
            table.instances().len(),
            self.source
        );
        if let (Some(lo), Some(hi)) = (table.earliest(), table.latest()) {
            info!("Time span: {} .. {}", lo, hi);
        }

        Ok(table)
    }
}

fn annotate(
    row: usize,
    result: std::result::Result<RawRecord, csv::Error>,
) -> Result<(Sample, CivilDateTime, String)> {
    let mut record = result?;
    let civil = to_civil_time(record.time)?;
    let cluster = cluster_label(record.cluster).ok_or_else(|| DashError::MalformedRow {
        row,
        reason: format!("non-integral cluster label {}", record.cluster),
    })?;

    let interp = std::mem::take(&mut record.interp);
    Ok((Sample::from_record(record, &civil, cluster), civil, interp))
}

/// Cluster labels may be written as integral floats ("2.0").
fn cluster_label(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Time,Instance,Lat,Long,Speed,CP_dist,clusters,interp\n";

    fn load(body: &str, policy: LoadPolicy) -> Result<TrajectoryTable> {
        let data = format!("{}{}", HEADER, body);
        TrajectoryReader::from_reader(Cursor::new(data))?
            .with_policy(policy)
            .read_table()
    }

    #[test]
    fn test_loads_and_annotates() {
        let table = load(
            "301773079421553,7,42.29,-83.71,10.5,30.0,1,\"['slow', 'fast']\"\n\
             301773080421553,7,42.30,-83.72,11.0,25.0,2.0,\"['slow', 'fast']\"\n",
            LoadPolicy::Abort,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.samples()[0];
        assert_eq!(first.instance, InstanceId::from("7"));
        assert_eq!((first.year, first.month, first.day, first.hour), (2013, 7, 24, 17));
        assert_eq!(table.samples()[1].cluster, 2);
        assert_eq!(
            table.interpretation(&InstanceId::from("7")),
            Some("['slow', 'fast']")
        );
        assert!(table.earliest().unwrap() < table.latest().unwrap());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let data = ",Time,Instance,Lat,Long,Speed,CP_dist,clusters,interp,extra\n\
                    0,0,1,0,0,0,0,1,x,foo\n";
        let table = TrajectoryReader::from_reader(Cursor::new(data))
            .unwrap()
            .read_table()
            .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let data = "Time,Instance,Lat,Long,Speed,CP_dist,clusters\n1,1,0,0,0,0,1\n";
        assert!(matches!(
            TrajectoryReader::from_reader(Cursor::new(data)),
            Err(DashError::MissingColumn(c)) if c == "interp"
        ));
    }

    #[test]
    fn test_skip_row_policy() {
        let table = load(
            "NaN,1,0,0,0,0,1,a\n0,1,0,0,0,0,1,a\n",
            LoadPolicy::SkipRow,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_abort_policy() {
        let err = load("NaN,1,0,0,0,0,1,a\n0,1,0,0,0,0,1,a\n", LoadPolicy::Abort).unwrap_err();
        assert!(matches!(err, DashError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_non_integral_cluster() {
        let err = load("0,1,0,0,0,0,1.5,a\n", LoadPolicy::Abort).unwrap_err();
        assert!(matches!(err, DashError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn test_inconsistent_interpretation() {
        let err = load("0,1,0,0,0,0,1,a\n1,1,0,0,0,0,1,b\n", LoadPolicy::SkipRow).unwrap_err();
        assert!(matches!(err, DashError::InconsistentInterpretation(i) if i == "1"));
    }

    #[test]
    fn test_empty_table() {
        let table = load("", LoadPolicy::Abort).unwrap();
        assert!(table.is_empty());
        assert!(table.summary().default_date.is_none());
    }
}
