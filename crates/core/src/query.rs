//! Knobs that select which schedule instant and which history lookup a
//! dependency check uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CyclicError;

/// Position of a schedule instant relative to a point in time.
///
/// ```text
/// previous            current  sometime     next
///   -2                  -1        |          0
///   |___________________|_________|__________|
///   |_____interval______|
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleOffset {
    Previous,
    Current,
    #[default]
    Next,
}

impl ScheduleOffset {
    /// Whole intervals to add to the first fire time at or after the probe point.
    pub fn steps(self) -> i32 {
        match self {
            ScheduleOffset::Previous => -2,
            ScheduleOffset::Current => -1,
            ScheduleOffset::Next => 0,
        }
    }
}

impl fmt::Display for ScheduleOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleOffset::Previous => write!(f, "previous"),
            ScheduleOffset::Current => write!(f, "current"),
            ScheduleOffset::Next => write!(f, "next"),
        }
    }
}

impl FromStr for ScheduleOffset {
    type Err = CyclicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "previous" | "prev" => Ok(ScheduleOffset::Previous),
            "current" => Ok(ScheduleOffset::Current),
            "next" => Ok(ScheduleOffset::Next),
            other => Err(CyclicError::Config(format!(
                "unknown schedule offset '{}' (expected previous, current or next)",
                other
            ))),
        }
    }
}

/// Ordered-set search used to match a checkpoint key against history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    /// Smallest record at or after the key.
    #[default]
    Ceiling,
    /// Smallest record strictly after the key.
    Higher,
}

impl Lookup {
    pub fn from_inclusive(inclusive: bool) -> Self {
        if inclusive {
            Lookup::Ceiling
        } else {
            Lookup::Higher
        }
    }

    pub fn is_inclusive(self) -> bool {
        self == Lookup::Ceiling
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Ceiling => write!(f, "ceiling"),
            Lookup::Higher => write!(f, "higher"),
        }
    }
}

impl FromStr for Lookup {
    type Err = CyclicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ceiling" | "inclusive" => Ok(Lookup::Ceiling),
            "higher" | "exclusive" => Ok(Lookup::Higher),
            other => Err(CyclicError::Config(format!(
                "unknown lookup '{}' (expected ceiling or higher)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_steps() {
        assert_eq!(ScheduleOffset::Previous.steps(), -2);
        assert_eq!(ScheduleOffset::Current.steps(), -1);
        assert_eq!(ScheduleOffset::Next.steps(), 0);
        assert_eq!(ScheduleOffset::default(), ScheduleOffset::Next);
    }

    #[test]
    fn parse_offsets_and_lookups() {
        assert_eq!("Current".parse::<ScheduleOffset>().unwrap(), ScheduleOffset::Current);
        assert_eq!("prev".parse::<ScheduleOffset>().unwrap(), ScheduleOffset::Previous);
        assert!("later".parse::<ScheduleOffset>().is_err());

        assert_eq!("higher".parse::<Lookup>().unwrap(), Lookup::Higher);
        assert_eq!(" CEILING ".parse::<Lookup>().unwrap(), Lookup::Ceiling);
        assert!("floor".parse::<Lookup>().is_err());
    }

    #[test]
    fn lookup_inclusivity() {
        assert_eq!(Lookup::from_inclusive(true), Lookup::Ceiling);
        assert_eq!(Lookup::from_inclusive(false), Lookup::Higher);
        assert!(Lookup::Ceiling.is_inclusive());
        assert!(!Lookup::Higher.is_inclusive());
    }
}
