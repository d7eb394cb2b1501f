use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use cyclic_core::config::ZoneSetting;
use cyclic_core::{Lookup, ScheduleOffset};

/// Inspect cron cycles and check job dependencies.
///
/// Naive date-times are read as `YYYY-MM-DD HH:MM:SS` (or with a `T`
/// separator) in the configured time zone.
#[derive(Parser, Debug)]
#[command(name = "cyclic", version, about = "Inspect cron cycles and check job dependencies")]
pub struct CliArgs {
    /// Time zone for naive date-times: local, utc, or an offset like +08:00
    #[arg(long, global = true, env = "CYCLIC_TIMEZONE")]
    pub timezone: Option<ZoneSetting>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show interval, cycle and upcoming fire times of a cron expression
    Inspect {
        /// Six-field cron expression (quote it)
        cron: String,

        /// Number of upcoming fire times to print
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Compute the schedule instant of a cron relative to a date-time
    Schedule {
        cron: String,

        #[arg(long, value_parser = parse_local_time)]
        at: NaiveDateTime,

        /// previous, current or next
        #[arg(long, default_value = "next")]
        offset: ScheduleOffset,
    },

    /// Find the parent run that satisfies a child firing
    Check {
        #[arg(long)]
        parent: String,

        #[arg(long)]
        child: String,

        /// Reference time, usually the child's scheduled firing
        #[arg(long, value_parser = parse_local_time)]
        at: NaiveDateTime,

        /// JSON array of {"cron_expression", "schedule_time"} parent runs
        #[arg(long)]
        history: PathBuf,

        /// ceiling or higher (defaults to CYCLIC_LOOKUP)
        #[arg(long)]
        lookup: Option<Lookup>,

        /// Parent instant to key on: previous, current or next (defaults to CYCLIC_ANCHOR)
        #[arg(long)]
        anchor: Option<ScheduleOffset>,
    },
}

pub fn parse_local_time(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("invalid date-time '{}': {} (expected YYYY-MM-DD HH:MM:SS)", s, e))
}
