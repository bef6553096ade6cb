// Trajectory dashboard core
// Time-base conversion, filtering and chart projections over a trajectory CSV

pub mod core;

// Re-export main types
pub use core::error::{DashError, Result};
pub use core::filter::{filter, FilteredRows, InstanceGroup, InstanceOption};
pub use core::format::{InstanceId, Sample, TableSummary, TrajectoryTable};
pub use core::projection::{
    interpretations, map_layers, speed_series, InterpretationBlock, MapLayer, SpeedSeries,
};
pub use core::reader::{LoadPolicy, TrajectoryReader};
pub use core::selection::{hour_options, parse_date, HourSelection, HoursInput, Selection};
pub use core::timebase::{to_civil_time, CivilDateTime};

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(REQUIRED_COLUMNS.len(), 8);
        assert_eq!(GPS_TO_TAI_SECONDS - TAI_EPOCH_SHIFT_SECONDS, 9);
    }
}
