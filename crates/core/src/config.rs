use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{CyclicError, Result};
use crate::query::{Lookup, ScheduleOffset};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

/// Parse a profiled env var, falling back to `default` with a warning.
fn profiled_env_parse<T>(profile: &str, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match profiled_env_parse_strict(profile, key) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring invalid config value");
            default
        }
    }
}

fn profiled_env_parse_strict<T>(profile: &str, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match profiled_env_opt(profile, key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| CyclicError::Config(format!("{}={}: {}", key, raw, e))),
        None => Ok(None),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub schedule: ScheduleConfig,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CYCLIC_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let profile = env_or("CYCLIC_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Like [`Config::from_env`] but rejects unparseable values.
    pub fn try_from_env() -> Result<Self> {
        let profile = env_or("CYCLIC_PROFILE", "").to_uppercase();
        Self::try_for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            schedule: ScheduleConfig::from_env_profiled(p),
            resolver: ResolverConfig::from_env_profiled(p),
        }
    }

    pub fn try_for_profile(profile: &str) -> Result<Self> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            schedule: ScheduleConfig::try_from_env_profiled(p)?,
            resolver: ResolverConfig::try_from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  schedule:    timezone={}", self.schedule.timezone);
        tracing::info!(
            "  resolver:    lookup={}, anchor={}",
            self.resolver.lookup,
            self.resolver.anchor
        );
    }
}

// ── Schedule ──────────────────────────────────────────────────

/// Zone that naive local date-times are interpreted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSetting {
    /// The process's default time zone.
    #[default]
    Local,
    Utc,
    /// Fixed offset east of UTC, in seconds.
    Fixed(i32),
}

impl ZoneSetting {
    pub fn fixed_offset(self) -> Option<FixedOffset> {
        match self {
            ZoneSetting::Fixed(secs) => FixedOffset::east_opt(secs),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSetting::Local => write!(f, "local"),
            ZoneSetting::Utc => write!(f, "utc"),
            ZoneSetting::Fixed(secs) => match FixedOffset::east_opt(*secs) {
                Some(offset) => write!(f, "{}", offset),
                None => write!(f, "fixed({}s)", secs),
            },
        }
    }
}

impl FromStr for ZoneSetting {
    type Err = CyclicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "system" => Ok(ZoneSetting::Local),
            "utc" | "z" => Ok(ZoneSetting::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(|offset| ZoneSetting::Fixed(offset.local_minus_utc()))
                .map_err(|e| {
                    CyclicError::Config(format!("unknown time zone '{}': {}", other, e))
                }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub timezone: ZoneSetting,
}

impl ScheduleConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timezone: profiled_env_parse(p, "CYCLIC_TIMEZONE", ZoneSetting::Local),
        }
    }

    fn try_from_env_profiled(p: &str) -> Result<Self> {
        Ok(Self {
            timezone: profiled_env_parse_strict(p, "CYCLIC_TIMEZONE")?.unwrap_or_default(),
        })
    }
}

// ── Resolver ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// History search used when a caller does not pick one.
    pub lookup: Lookup,
    /// Parent schedule instant the checkpoint key is placed on.
    pub anchor: ScheduleOffset,
}

impl ResolverConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            lookup: profiled_env_parse(p, "CYCLIC_LOOKUP", Lookup::Ceiling),
            anchor: profiled_env_parse(p, "CYCLIC_ANCHOR", ScheduleOffset::Next),
        }
    }

    fn try_from_env_profiled(p: &str) -> Result<Self> {
        Ok(Self {
            lookup: profiled_env_parse_strict(p, "CYCLIC_LOOKUP")?.unwrap_or_default(),
            anchor: profiled_env_parse_strict(p, "CYCLIC_ANCHOR")?.unwrap_or_default(),
        })
    }
}
