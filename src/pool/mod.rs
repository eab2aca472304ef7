//! Window pools
//!
//! A window pool resolves record positions to pages and hands out the mapped
//! window covering each position. [`ScanResistantWindowPool`] is the
//! read-only implementation backed by [`ScanResistantStrategy`](crate::paging::ScanResistantStrategy).

mod config;
mod window_pool;

use std::fmt;
use std::sync::Arc;

pub use config::{
    records_per_page, SampleCallback, WindowPoolConfig, DEFAULT_BYTES_PER_RECORD, DEFAULT_CAPACITY,
    DEFAULT_TARGET_BYTES_PER_PAGE,
};
pub use window_pool::ScanResistantWindowPool;

use crate::error::Result;
use crate::stats::WindowPoolStats;

/// Kind of access requested for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Read records
    Read,
    /// Modify records
    Write,
}

impl OperationType {
    /// Get the operation as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationType::Read => "READ",
            OperationType::Write => "WRITE",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pool of windows over a record store.
pub trait WindowPool {
    /// Window handed out for a position
    type Window;

    /// Get the window covering record `position`.
    fn acquire(&self, position: u64, operation: OperationType) -> Result<Arc<Self::Window>>;

    /// Hand a window back to the pool.
    fn release(&self, window: Arc<Self::Window>);

    /// Write back pending changes.
    fn flush_all(&self);

    /// Release every resident window.
    fn close(&self);

    /// Snapshot of the pool's counters.
    fn stats(&self) -> WindowPoolStats;
}
