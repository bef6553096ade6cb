// GPS microseconds -> civil calendar time

use crate::core::constants::*;
use crate::core::error::{DashError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

/// Calendar decomposition of a converted timestamp.
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl CivilDateTime {
    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            microsecond: dt.nanosecond() / 1_000,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl std::fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.microsecond
        )
    }
}

fn gps_epoch() -> Option<NaiveDateTime> {
    let (y, m, d) = GPS_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn tai_epoch() -> NaiveDateTime {
    NaiveDateTime::UNIX_EPOCH + TimeDelta::seconds(TAI_EPOCH_SHIFT_SECONDS)
}

/// Converts a raw GPS-epoch microsecond timestamp into civil time.
///
/// The GPS offset and the TAI epoch shift are applied as fixed constants; the
/// final seconds-since-reference value is rendered without any leap-second table.
pub fn to_civil_time(time_raw: f64) -> Result<CivilDateTime> {
    if !time_raw.is_finite() {
        return Err(DashError::InvalidTimestamp(time_raw));
    }

    let gps_seconds = time_raw * RAW_TO_SECONDS;
    let micros = (gps_seconds * 1e6).round();
    if micros.abs() >= i64::MAX as f64 {
        return Err(DashError::InvalidTimestamp(time_raw));
    }

    let gps_time = gps_epoch()
        .ok_or(DashError::InvalidTimestamp(time_raw))?
        .checked_add_signed(TimeDelta::microseconds(micros as i64))
        .ok_or(DashError::InvalidTimestamp(time_raw))?;
    let tai_time = gps_time
        .checked_add_signed(TimeDelta::seconds(GPS_TO_TAI_SECONDS))
        .ok_or(DashError::InvalidTimestamp(time_raw))?;

    let since_reference = tai_time.signed_duration_since(tai_epoch());
    let civil = NaiveDateTime::UNIX_EPOCH
        .checked_add_signed(since_reference)
        .ok_or(DashError::InvalidTimestamp(time_raw))?;

    Ok(CivilDateTime::from_naive(&civil))
}
