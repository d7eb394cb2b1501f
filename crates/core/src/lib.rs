pub mod config;
pub mod cycle;
pub mod error;
pub mod query;
pub mod unit;

pub use config::Config;
pub use cycle::*;
pub use error::*;
pub use query::*;
pub use unit::TruncationUnit;
