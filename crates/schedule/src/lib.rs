//! Cron interval engine.
//!
//! Wraps six-field cron expressions (`sec min hour day-of-month month
//! day-of-week`, optional trailing year) and derives what dependency
//! resolution needs from them:
//! - absolute fire times inside a window and after an anchor
//! - the schedule's steady-state interval, sampled from two consecutive fires
//! - the schedule instant nearest to an arbitrary local time, and its neighbours

mod cron_schedule;
pub mod zone;


pub use self::cron_schedule::CronSchedule;
