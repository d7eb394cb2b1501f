//! Calendar units used to align timestamps to cycle boundaries.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CyclicError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationUnit {
    Minutes,
    Hours,
    Days,
    /// ISO weeks, starting Monday 00:00.
    Weeks,
    Months,
    Years,
}

impl TruncationUnit {
    /// Drop every field finer than this unit.
    pub fn truncate(self, at: NaiveDateTime) -> NaiveDateTime {
        let date = at.date();
        let start = match self {
            TruncationUnit::Minutes => date.and_hms_opt(at.hour(), at.minute(), 0),
            TruncationUnit::Hours => date.and_hms_opt(at.hour(), 0, 0),
            TruncationUnit::Days => Some(date.and_time(NaiveTime::MIN)),
            TruncationUnit::Weeks => {
                let back = i64::from(date.weekday().num_days_from_monday());
                Some((date - Duration::days(back)).and_time(NaiveTime::MIN))
            }
            TruncationUnit::Months => date.with_day(1).map(|d| d.and_time(NaiveTime::MIN)),
            TruncationUnit::Years => {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).map(|d| d.and_time(NaiveTime::MIN))
            }
        };
        // Every field above is valid for the date it came from.
        start.unwrap_or(at)
    }

    /// Move `at` back by `steps` units. Months and years step by calendar.
    pub fn step_back(self, at: NaiveDateTime, steps: i64) -> Result<NaiveDateTime> {
        if steps < 0 {
            return Err(CyclicError::PreconditionViolation(format!(
                "cannot step back a negative number of {:?} ({})",
                self, steps
            )));
        }
        let back = |delta: Option<Duration>| delta.and_then(|d| at.checked_sub_signed(d));
        let stepped = match self {
            TruncationUnit::Minutes => back(Duration::try_minutes(steps)),
            TruncationUnit::Hours => back(Duration::try_hours(steps)),
            TruncationUnit::Days => back(Duration::try_days(steps)),
            TruncationUnit::Weeks => back(Duration::try_weeks(steps)),
            TruncationUnit::Months => u32::try_from(steps)
                .ok()
                .and_then(|m| at.checked_sub_months(Months::new(m))),
            TruncationUnit::Years => steps
                .checked_mul(12)
                .and_then(|m| u32::try_from(m).ok())
                .and_then(|m| at.checked_sub_months(Months::new(m))),
        };
        stepped.ok_or_else(|| {
            CyclicError::PreconditionViolation(format!(
                "stepping {} back by {} {:?} overflows",
                at, steps, self
            ))
        })
    }
}
