//! Single-edge job dependency resolution.
//!
//! Given a parent and a child cron schedule, this crate decides which of the
//! parent's recorded successful runs (if any) satisfies the child's firing at
//! a reference time:
//! - [`SuccessRecord`], one confirmed parent run at its scheduled time
//! - [`History`] / [`OrderedHistory`], ordered runs with ceiling/higher search
//! - [`DependencyResolver`], checkpoint computation and history lookup
//!
//! Multi-parent aggregation is left to callers; they combine single-edge
//! answers from [`DependencyResolver::resolve`].

pub mod history;
pub mod record;
pub mod resolver;

pub use history::{History, OrderedHistory};
pub use record::SuccessRecord;
pub use resolver::{find_satisfying, DependencyQuery, DependencyResolver};
