//! Window pool statistics
//!
//! Running hit-rate sampling plus point-in-time snapshots and their
//! rendering.

pub mod reporter;
pub mod sample;
pub mod snapshot;

pub use reporter::{ReportFormat, StatsReporter};
pub use sample::{HitRateSample, HitRateSampler, DEFAULT_REPORT_INTERVAL};
pub use snapshot::{store_name, TierCounts, WindowPoolStats};
