use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CyclicError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidScheduleExpression { expression: String, reason: String },

    #[error("Unsupported job cycle code {0}")]
    UnsupportedCycleCode(i32),

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// The schedule did not produce enough fire times for the operation.
    #[error("Cron '{expression}' has no fire time {context}")]
    NoFireTime { expression: String, context: String },

    #[error("Local time {0} does not exist in the configured time zone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CyclicError>;
