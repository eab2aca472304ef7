//! oxiwindow - A scan-resistant window pool for record stores
//!
//! A record store is a file of fixed-size records addressed by position.
//! This crate provides a read-only page cache over such files:
//! - **Window pool**: maps record positions to pages and hands out the
//!   mapped window covering each position
//! - **Scan-resistant replacement**: pages climb utility tiers through
//!   repeated use, and a single pass over the store only recycles its own
//!   pages
//!
//! # Features
//!
//! - Bounded number of resident pages, lazily growing page table
//! - Concurrent access with one load per missing page
//! - Memory-mapped or read-based store file mapping
//! - Periodic hit-rate sampling through `tracing`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use oxiwindow::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mapper = MmapFileMapper::open("/data/neostore.nodestore.db")?;
//! let config = WindowPoolConfig::new("/data/neostore.nodestore.db", 9, 1024 * 1024)
//!     .with_capacity(256);
//! let pool = ScanResistantWindowPool::new(config, mapper)?;
//!
//! let window = pool.acquire(42, OperationType::Read)?;
//! if let Some(record) = window.record(42) {
//!     println!("record 42: {record:?}");
//! }
//! pool.release(window);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod paging;
pub mod pool;
pub mod stats;

// Re-exports for convenience
pub use error::{Result, WindowPoolError};
pub use mapper::{FileMapper, MappedWindow};
pub use paging::{PageId, PageLoadError, ScanResistantStrategy, TemporalUtility};
pub use pool::{OperationType, ScanResistantWindowPool, WindowPool, WindowPoolConfig};
pub use stats::{HitRateSample, WindowPoolStats};

/// Utility for size literals (e.g., 1 MiB pages)
pub mod size {
    /// 1 KiB in bytes
    pub const KIB: u32 = 1024;
    /// 1 MiB in bytes
    pub const MIB: u32 = 1024 * KIB;
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Result, WindowPoolError};
    pub use crate::mapper::{
        FileMapper, MappedWindow, MemoryFileMapper, MmapFileMapper, ReadFileMapper,
        StoreFileMapper,
    };
    pub use crate::pool::{OperationType, ScanResistantWindowPool, WindowPool, WindowPoolConfig};
    pub use crate::stats::{HitRateSample, StatsReporter, WindowPoolStats};
}
