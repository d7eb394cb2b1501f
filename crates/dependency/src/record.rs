//! One confirmed successful firing of a job, see [`SuccessRecord`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use cyclic_core::{CyclicError, Result};
use cyclic_schedule::CronSchedule;

/// A job run confirmed successful, keyed by its scheduled (not wall-clock) time.
///
/// Records order, compare and hash by schedule time truncated to whole
/// seconds; the cron expression does not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr")]
pub struct SuccessRecord {
    cron_expression: String,
    schedule_time: NaiveDateTime,
}

#[derive(Deserialize)]
struct RecordRepr {
    cron_expression: String,
    schedule_time: NaiveDateTime,
}

impl TryFrom<RecordRepr> for SuccessRecord {
    type Error = CyclicError;

    fn try_from(repr: RecordRepr) -> Result<Self> {
        SuccessRecord::new(repr.cron_expression, repr.schedule_time)
    }
}

impl SuccessRecord {
    pub fn new(cron_expression: impl Into<String>, schedule_time: NaiveDateTime) -> Result<Self> {
        let cron_expression = cron_expression.into();
        if cron_expression.trim().is_empty() {
            return Err(CyclicError::PreconditionViolation(
                "success record needs a cron expression".to_string(),
            ));
        }
        Ok(Self {
            cron_expression,
            schedule_time,
        })
    }

    pub fn cron_expression(&self) -> &str {
        &self.cron_expression
    }

    pub fn schedule_time(&self) -> NaiveDateTime {
        self.schedule_time
    }

    /// Schedule time without its sub-second part.
    pub fn order_key(&self) -> NaiveDateTime {
        self.schedule_time
            .with_nanosecond(0)
            .unwrap_or(self.schedule_time)
    }

    pub fn cron_equals(&self, cron_expression: &str) -> bool {
        self.cron_expression == cron_expression
    }

    /// Current interval of the cron that produced this record.
    pub fn interval_ms(&self) -> Result<i64> {
        CronSchedule::parse(&self.cron_expression)?.interval_ms()
    }
}

impl PartialEq for SuccessRecord {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for SuccessRecord {}

impl PartialOrd for SuccessRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SuccessRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for SuccessRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn parse(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn blank_cron_is_rejected() {
        let err = SuccessRecord::new("  ", parse("2019-11-10 02:01:04")).unwrap_err();
        assert!(matches!(err, CyclicError::PreconditionViolation(_)));
    }

    #[test]
    fn ordering_ignores_subseconds() {
        let a = SuccessRecord::new("4 1 2 * * ?", parse("2019-11-10 02:01:04")).unwrap();
        let b = SuccessRecord::new(
            "4 1 2 * * ?",
            parse("2019-11-10 02:01:04") + Duration::milliseconds(999),
        )
        .unwrap();
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a, b);
    }

    #[test]
    fn ordering_ignores_cron() {
        let parent = SuccessRecord::new("4 1 2 * * ?", parse("2019-11-10 02:01:04")).unwrap();
        let key = SuccessRecord::new("1 0 3 * * ?", parse("2019-11-10 02:01:04")).unwrap();
        assert_eq!(parent, key);
        assert!(!key.cron_equals(parent.cron_expression()));

        let later = SuccessRecord::new("4 1 2 * * ?", parse("2019-11-10 02:01:05")).unwrap();
        assert!(parent < later);
    }

    #[test]
    fn interval_of_own_cron() {
        let record = SuccessRecord::new("3 */5 * * * ?", parse("2019-11-10 00:50:03")).unwrap();
        assert_eq!(record.interval_ms().unwrap(), 300_000);
    }

    #[test]
    fn deserialize_validates() {
        let ok: SuccessRecord = serde_json::from_str(
            r#"{"cron_expression":"4 1 2 * * ?","schedule_time":"2019-11-10T02:01:04"}"#,
        )
        .unwrap();
        assert_eq!(ok.schedule_time(), parse("2019-11-10 02:01:04"));

        let blank = serde_json::from_str::<SuccessRecord>(
            r#"{"cron_expression":"","schedule_time":"2019-11-10T02:01:04"}"#,
        );
        assert!(blank.is_err());
    }
}
