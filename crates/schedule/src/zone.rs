//! Conversions between naive local date-times and zoned instants.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike, Utc};

use cyclic_core::{CyclicError, Result};

/// Interpret a naive local date-time in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times
/// inside a DST gap are rejected.
pub fn localize<Tz: TimeZone>(tz: &Tz, at: NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&at)
        .earliest()
        .ok_or(CyclicError::NonexistentLocalTime(at))
}

/// Current instant expressed in `tz`.
pub fn now_in<Tz: TimeZone>(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Drop the sub-second part of an instant.
pub fn whole_second<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Tz> {
    at.clone() - Duration::nanoseconds(i64::from(at.nanosecond()))
}
