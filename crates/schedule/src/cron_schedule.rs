//! A validated cron expression and its fire-time arithmetic, see [`CronSchedule`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use cyclic_core::{Cycle, CyclicError, Result, ScheduleOffset};

use crate::zone::{localize, now_in, whole_second};

/// A parsed cron expression with seconds.
///
/// Construction is the only place an expression is validated; every other
/// operation assumes a well-formed schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CronSchedule {
    expression: String,
    schedule: Schedule,
}

impl CronSchedule {
    /// Parse `sec min hour day-of-month month day-of-week [year]`.
    ///
    /// `?` is accepted in the day fields as "no specific value".
    pub fn parse(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        let field_count = trimmed.split_whitespace().count();
        if !(6..=7).contains(&field_count) {
            return Err(CyclicError::InvalidScheduleExpression {
                expression: trimmed.to_string(),
                reason: format!(
                    "expected 6 fields (sec min hour day-of-month month day-of-week), got {}",
                    field_count
                ),
            });
        }

        let schedule =
            Schedule::from_str(trimmed).map_err(|e| CyclicError::InvalidScheduleExpression {
                expression: trimmed.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            expression: trimmed.to_string(),
            schedule,
        })
    }

    /// The expression this schedule was parsed from (trimmed).
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// All fire times in `[from, to]`, ascending.
    ///
    /// `from` is compared at whole-second precision, so a schedule firing at
    /// `10:00:00` is included for `from = 10:00:00.500`.
    pub fn fire_times_between<'a, Tz>(
        &'a self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
    ) -> impl Iterator<Item = DateTime<Tz>> + 'a
    where
        Tz: TimeZone + 'a,
    {
        // `after` is exclusive; back off one second so `from` itself can match.
        let start = whole_second(from) - Duration::seconds(1);
        let to = to.clone();
        self.schedule.after(&start).take_while(move |t| *t <= to)
    }

    /// The next `n` fire times strictly after `anchor`.
    pub fn next_fire_times<Tz: TimeZone>(
        &self,
        anchor: &DateTime<Tz>,
        n: usize,
    ) -> Vec<DateTime<Tz>> {
        self.schedule.after(anchor).take(n).collect()
    }

    /// The next `n` fire times strictly after now, in `tz`.
    pub fn upcoming_in<Tz: TimeZone>(&self, tz: &Tz, n: usize) -> Vec<DateTime<Tz>> {
        self.next_fire_times(&now_in(tz), n)
    }

    /// Milliseconds between the first two fire times after `anchor`.
    ///
    /// Exact for constant-period schedules. For calendar-variable schedules
    /// (month ends, weekday lists) this is the interval around `anchor` only.
    pub fn interval_after<Tz: TimeZone>(&self, anchor: &DateTime<Tz>) -> Result<i64> {
        let fires = self.next_fire_times(anchor, 2);
        match fires.as_slice() {
            [first, second] => Ok(second
                .clone()
                .signed_duration_since(first.clone())
                .num_milliseconds()),
            _ => Err(CyclicError::NoFireTime {
                expression: self.expression.clone(),
                context: format!("twice after {}", anchor.naive_local()),
            }),
        }
    }

    /// Interval sampled from now, with fire times computed in `tz`.
    pub fn interval_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<i64> {
        let interval = self.interval_after(&now_in(tz))?;
        debug!(cron = %self.expression, interval_ms = interval, "sampled cron interval");
        Ok(interval)
    }

    /// Interval sampled from now in the process's local time zone.
    pub fn interval_ms(&self) -> Result<i64> {
        self.interval_in(&Local)
    }

    /// Cycle of this schedule's current interval.
    pub fn cycle_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<Cycle> {
        Ok(Cycle::classify(self.interval_in(tz)?))
    }

    pub fn cycle(&self) -> Result<Cycle> {
        self.cycle_in(&Local)
    }

    /// Schedule instant relative to the local time `sometime`.
    ///
    /// Finds the first fire time in `[sometime, sometime + interval]` and
    /// shifts it by `offset.steps()` whole intervals. Assumes the schedule
    /// fires at most once per interval-wide window.
    pub fn schedule_time<Tz: TimeZone>(
        &self,
        tz: &Tz,
        sometime: NaiveDateTime,
        offset: ScheduleOffset,
    ) -> Result<NaiveDateTime> {
        let interval = Duration::milliseconds(self.interval_in(tz)?);
        let from = localize(tz, sometime)?;
        let to = from.clone() + interval;

        let next = self
            .fire_times_between(&from, &to)
            .next()
            .ok_or_else(|| CyclicError::NoFireTime {
                expression: self.expression.clone(),
                context: format!("between {} and {}", sometime, to.naive_local()),
            })?;

        let shifted = next.clone() + interval * offset.steps();
        trace!(
            cron = %self.expression,
            %sometime,
            next = %next.naive_local(),
            %offset,
            result = %shifted.naive_local(),
            "computed schedule time"
        );
        Ok(shifted.naive_local())
    }

    /// The schedule instant one interval before [`schedule_time_of`](Self::schedule_time_of).
    pub fn previous_schedule_time_of<Tz: TimeZone>(
        &self,
        tz: &Tz,
        sometime: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        self.schedule_time(tz, sometime, ScheduleOffset::Previous)
    }

    /// The last schedule instant before the one at or after `sometime`.
    pub fn schedule_time_of<Tz: TimeZone>(
        &self,
        tz: &Tz,
        sometime: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        self.schedule_time(tz, sometime, ScheduleOffset::Current)
    }

    /// The first schedule instant at or after `sometime`.
    pub fn next_schedule_time_of<Tz: TimeZone>(
        &self,
        tz: &Tz,
        sometime: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        self.schedule_time(tz, sometime, ScheduleOffset::Next)
    }
}

impl PartialEq for CronSchedule {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Eq for CronSchedule {}

impl FromStr for CronSchedule {
    type Err = CyclicError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CronSchedule {
    type Error = CyclicError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CronSchedule> for String {
    fn from(schedule: CronSchedule) -> Self {
        schedule.expression
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
