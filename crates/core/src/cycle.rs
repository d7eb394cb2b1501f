//! Coarse-grained job cycles and the interval classifier.
//!
//! A schedule's firing interval (milliseconds between two consecutive fire
//! times) is bucketed into a [`Cycle`]. Each cycle carries a nominal
//! duration, the unit used to align timestamps to cycle boundaries, and the
//! number of past runs a caller typically keeps in history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CyclicError, Result};
use crate::unit::TruncationUnit;

pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const MONTH_MS: i64 = 28 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

/// Granularity of a job schedule, ordered from finest to coarsest.
///
/// `None` marks degenerate or sub-minute intervals and sorts below `Minute`,
/// so a regular cycle is always coarser than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    None,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

struct CycleSpec {
    code: i32,
    name: &'static str,
    nominal_ms: Option<i64>,
    unit: Option<TruncationUnit>,
    retention: usize,
}

// Indexed by `Cycle as usize`; keep in declaration order.
const CYCLES: [CycleSpec; 7] = [
    CycleSpec {
        code: 7,
        name: "none",
        nominal_ms: None,
        unit: None,
        retention: 1,
    },
    CycleSpec {
        code: 1,
        name: "minute",
        nominal_ms: Some(MINUTE_MS),
        unit: Some(TruncationUnit::Minutes),
        retention: 60,
    },
    CycleSpec {
        code: 2,
        name: "hour",
        nominal_ms: Some(HOUR_MS),
        unit: Some(TruncationUnit::Hours),
        retention: 25,
    },
    CycleSpec {
        code: 3,
        name: "day",
        nominal_ms: Some(DAY_MS),
        unit: Some(TruncationUnit::Days),
        retention: 8,
    },
    CycleSpec {
        code: 4,
        name: "week",
        nominal_ms: Some(WEEK_MS),
        unit: Some(TruncationUnit::Weeks),
        retention: 6,
    },
    CycleSpec {
        code: 5,
        name: "month",
        nominal_ms: Some(MONTH_MS),
        unit: Some(TruncationUnit::Months),
        retention: 1,
    },
    CycleSpec {
        code: 6,
        name: "year",
        nominal_ms: Some(YEAR_MS),
        unit: Some(TruncationUnit::Years),
        retention: 1,
    },
];

impl Cycle {
    pub const ALL: [Cycle; 7] = [
        Cycle::None,
        Cycle::Minute,
        Cycle::Hour,
        Cycle::Day,
        Cycle::Week,
        Cycle::Month,
        Cycle::Year,
    ];

    fn spec(self) -> &'static CycleSpec {
        &CYCLES[self as usize]
    }

    /// Bucket a firing interval into a cycle.
    ///
    /// `Year` is never produced here; it is only reachable through
    /// [`Cycle::from_code`] or by naming it explicitly.
    pub fn classify(interval_ms: i64) -> Self {
        if interval_ms < MINUTE_MS {
            Cycle::None
        } else if interval_ms < HOUR_MS {
            Cycle::Minute
        } else if interval_ms < DAY_MS {
            Cycle::Hour
        } else if interval_ms < WEEK_MS {
            Cycle::Day
        } else if interval_ms < MONTH_MS {
            Cycle::Week
        } else {
            Cycle::Month
        }
    }

    pub fn code(self) -> i32 {
        self.spec().code
    }

    pub fn from_code(code: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cycle| cycle.code() == code)
            .ok_or(CyclicError::UnsupportedCycleCode(code))
    }

    /// Nominal length of one cycle. `None` for [`Cycle::None`].
    pub fn nominal_ms(self) -> Option<i64> {
        self.spec().nominal_ms
    }

    pub fn truncation_unit(self) -> Option<TruncationUnit> {
        self.spec().unit
    }

    /// How many past runs of a job on this cycle a caller should keep.
    pub fn retention_size(self) -> usize {
        self.spec().retention
    }
}

/// Number of whole nominal cycles spanned by `interval_ms`.
///
/// Uses integer division, so an interval of 90 minutes spans one hour cycle.
pub fn number_of_cycles(interval_ms: i64) -> Result<i64> {
    let cycle = Cycle::classify(interval_ms);
    let nominal = cycle.nominal_ms().ok_or_else(|| irregular(interval_ms))?;
    Ok(interval_ms / nominal)
}

/// Truncation unit of the cycle `interval_ms` classifies into.
pub fn truncation_unit(interval_ms: i64) -> Result<TruncationUnit> {
    Cycle::classify(interval_ms)
        .truncation_unit()
        .ok_or_else(|| irregular(interval_ms))
}

fn irregular(interval_ms: i64) -> CyclicError {
    CyclicError::PreconditionViolation(format!(
        "interval of {}ms is shorter than one minute and has no cycle",
        interval_ms
    ))
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

impl FromStr for Cycle {
    type Err = CyclicError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cycle| cycle.spec().name == wanted)
            .ok_or_else(|| CyclicError::PreconditionViolation(format!("unknown cycle '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_bucket_boundaries() {
        assert_eq!(Cycle::classify(59_999), Cycle::None);
        assert_eq!(Cycle::classify(60_000), Cycle::Minute);
        assert_eq!(Cycle::classify(3_599_999), Cycle::Minute);
        assert_eq!(Cycle::classify(3_600_000), Cycle::Hour);
        assert_eq!(Cycle::classify(86_399_999), Cycle::Hour);
        assert_eq!(Cycle::classify(86_400_000), Cycle::Day);
        assert_eq!(Cycle::classify(604_799_999), Cycle::Day);
        assert_eq!(Cycle::classify(604_800_000), Cycle::Week);
        assert_eq!(Cycle::classify(2_419_199_999), Cycle::Week);
        assert_eq!(Cycle::classify(2_419_200_000), Cycle::Month);
    }

    #[test]
    fn classify_never_yields_year() {
        assert_eq!(Cycle::classify(YEAR_MS), Cycle::Month);
        assert_eq!(Cycle::classify(10 * YEAR_MS), Cycle::Month);
    }

    #[test]
    fn classify_negative_and_zero_are_none() {
        assert_eq!(Cycle::classify(0), Cycle::None);
        assert_eq!(Cycle::classify(-HOUR_MS), Cycle::None);
    }

    #[test]
    fn granularity_order() {
        assert!(Cycle::Minute < Cycle::Hour);
        assert!(Cycle::Hour < Cycle::Day);
        assert!(Cycle::Day < Cycle::Week);
        assert!(Cycle::Week < Cycle::Month);
        assert!(Cycle::Month < Cycle::Year);
    }

    #[test]
    fn none_ranks_below_every_regular_cycle() {
        for cycle in Cycle::ALL.into_iter().filter(|c| *c != Cycle::None) {
            assert!(Cycle::None < cycle, "{} should be coarser than none", cycle);
        }
        assert_eq!(Cycle::ALL.iter().max(), Some(&Cycle::Year));
    }

    #[test]
    fn table_rows_match_variants() {
        for cycle in Cycle::ALL {
            assert_eq!(cycle.to_string().parse::<Cycle>().unwrap(), cycle);
        }
        assert_eq!(Cycle::Year.code(), 6);
        assert_eq!(Cycle::None.truncation_unit(), None);
    }

    #[test]
    fn codes_round_trip() {
        for cycle in Cycle::ALL {
            assert_eq!(Cycle::from_code(cycle.code()).unwrap(), cycle);
        }
        assert_eq!(Cycle::Minute.code(), 1);
        assert_eq!(Cycle::None.code(), 7);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = Cycle::from_code(42).unwrap_err();
        assert!(matches!(err, CyclicError::UnsupportedCycleCode(42)));
    }

    #[test]
    fn retention_sizes() {
        assert_eq!(Cycle::Minute.retention_size(), 60);
        assert_eq!(Cycle::Hour.retention_size(), 25);
        assert_eq!(Cycle::Day.retention_size(), 8);
        assert_eq!(Cycle::Week.retention_size(), 6);
        assert_eq!(Cycle::Month.retention_size(), 1);
    }

    #[test]
    fn nominal_durations() {
        assert_eq!(Cycle::Week.nominal_ms(), Some(7 * DAY_MS));
        assert_eq!(Cycle::Month.nominal_ms(), Some(28 * DAY_MS));
        assert_eq!(Cycle::Year.nominal_ms(), Some(365 * DAY_MS));
        assert_eq!(Cycle::None.nominal_ms(), None);
    }

    #[test]
    fn number_of_cycles_uses_whole_cycles() {
        assert_eq!(number_of_cycles(5 * MINUTE_MS).unwrap(), 5);
        assert_eq!(number_of_cycles(12 * HOUR_MS).unwrap(), 12);
        assert_eq!(number_of_cycles(90 * MINUTE_MS).unwrap(), 1);
        assert_eq!(number_of_cycles(DAY_MS).unwrap(), 1);
        assert_eq!(number_of_cycles(31 * DAY_MS).unwrap(), 1);
    }

    #[test]
    fn sub_minute_interval_has_no_derived_quantities() {
        assert!(matches!(
            number_of_cycles(30_000),
            Err(CyclicError::PreconditionViolation(_))
        ));
        assert!(truncation_unit(30_000).is_err());
    }

    #[test]
    fn truncation_unit_follows_classification() {
        assert_eq!(truncation_unit(5 * MINUTE_MS).unwrap(), TruncationUnit::Minutes);
        assert_eq!(truncation_unit(12 * HOUR_MS).unwrap(), TruncationUnit::Hours);
        assert_eq!(truncation_unit(DAY_MS).unwrap(), TruncationUnit::Days);
        assert_eq!(truncation_unit(WEEK_MS).unwrap(), TruncationUnit::Weeks);
        assert_eq!(truncation_unit(30 * DAY_MS).unwrap(), TruncationUnit::Months);
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(Cycle::Hour.to_string(), "hour");
        assert_eq!("Week".parse::<Cycle>().unwrap(), Cycle::Week);
        assert!("fortnight".parse::<Cycle>().is_err());
    }
}
