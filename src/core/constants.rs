// Time-base and dataset constants

/// GPS epoch of the recorded dataset (civil calendar, no leap-second notation).
pub const GPS_EPOCH: (i32, u32, u32) = (2004, 1, 1);

/// Fixed GPS -> TAI offset, in seconds.
pub const GPS_TO_TAI_SECONDS: i64 = 19;

/// The TAI reference epoch sits this many seconds after 1970-01-01T00:00:00.
pub const TAI_EPOCH_SHIFT_SECONDS: i64 = 10;

/// Source timestamps are microseconds.
pub const RAW_TO_SECONDS: f64 = 0.000001;

// Column names of the trajectory CSV
pub const COL_TIME: &str = "Time";
pub const COL_INSTANCE: &str = "Instance";
pub const COL_LAT: &str = "Lat";
pub const COL_LONG: &str = "Long";
pub const COL_SPEED: &str = "Speed";
pub const COL_CP_DIST: &str = "CP_dist";
pub const COL_CLUSTER: &str = "clusters";
pub const COL_INTERP: &str = "interp";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_TIME,
    COL_INSTANCE,
    COL_LAT,
    COL_LONG,
    COL_SPEED,
    COL_CP_DIST,
    COL_CLUSTER,
    COL_INTERP,
];

/// Characters removed from an interpretation string before it is split.
pub const INTERP_STRIP_CHARS: [char; 3] = ['[', ']', '\''];
pub const INTERP_SEPARATOR: char = ',';

pub const TRIP_LABEL_PREFIX: &str = "Trip ";
pub const TRAJECTORY_HEADING_PREFIX: &str = "Trajectory ";
pub const CLUSTER_LABEL_PREFIX: &str = "Cluster ";

pub const HOURS_PER_DAY: u32 = 24;

/// Tokens longer than this switch the legacy hour selection into single-hour mode.
pub const HOUR_TOKEN_MAX_LEN: usize = 2;

/// Length of the `YYYY-MM-DD` prefix of a selection date.
pub const DATE_PREFIX_LEN: usize = 10;
pub const DATE_FORMAT: &str = "%Y-%m-%d";
