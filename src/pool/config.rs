//! Window pool configuration

use std::sync::Arc;

use crate::error::{Result, WindowPoolError};
use crate::paging::{DEFAULT_LONG_TERM_FRACTION, DEFAULT_PROTECTED_FRACTION};
use crate::stats::{HitRateSample, DEFAULT_REPORT_INTERVAL};

/// Callback invoked with every hit-rate sample the pool takes
pub type SampleCallback = Arc<dyn Fn(&HitRateSample) + Send + Sync>;

/// Default record size in bytes
pub const DEFAULT_BYTES_PER_RECORD: u32 = 9;
/// Default target page size in bytes
pub const DEFAULT_TARGET_BYTES_PER_PAGE: u32 = 1024 * 1024;
/// Default maximum number of resident pages
pub const DEFAULT_CAPACITY: usize = 1024;

/// Configuration for a [`ScanResistantWindowPool`](crate::pool::ScanResistantWindowPool).
#[derive(Clone)]
pub struct WindowPoolConfig {
    /// Store file name, used in reports
    pub store_name: String,
    /// Size of one record in bytes
    pub bytes_per_record: u32,
    /// Page size to aim for; pages hold as many whole records as fit
    pub target_bytes_per_page: u32,
    /// Maximum resident pages
    pub capacity: usize,
    /// Acquisitions between hit-rate samples (0 disables sampling)
    pub report_interval: u64,
    /// Share of capacity the short- and long-term tiers may hold together
    pub protected_fraction: f64,
    /// Share of capacity the long-term tier may hold
    pub long_term_fraction: f64,
    /// Optional callback invoked with each hit-rate sample
    pub sample_callback: Option<SampleCallback>,
}

impl std::fmt::Debug for WindowPoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowPoolConfig")
            .field("store_name", &self.store_name)
            .field("bytes_per_record", &self.bytes_per_record)
            .field("target_bytes_per_page", &self.target_bytes_per_page)
            .field("capacity", &self.capacity)
            .field("report_interval", &self.report_interval)
            .field("protected_fraction", &self.protected_fraction)
            .field("long_term_fraction", &self.long_term_fraction)
            .field("sample_callback", &self.sample_callback.is_some())
            .finish()
    }
}

impl Default for WindowPoolConfig {
    fn default() -> Self {
        Self {
            store_name: "store".to_string(),
            bytes_per_record: DEFAULT_BYTES_PER_RECORD,
            target_bytes_per_page: DEFAULT_TARGET_BYTES_PER_PAGE,
            capacity: DEFAULT_CAPACITY,
            report_interval: DEFAULT_REPORT_INTERVAL,
            protected_fraction: DEFAULT_PROTECTED_FRACTION,
            long_term_fraction: DEFAULT_LONG_TERM_FRACTION,
            sample_callback: None,
        }
    }
}

impl WindowPoolConfig {
    /// Create a configuration for a store with the given record and page sizes
    pub fn new(store_name: impl Into<String>, bytes_per_record: u32, target_bytes_per_page: u32) -> Self {
        Self {
            store_name: store_name.into(),
            bytes_per_record,
            target_bytes_per_page,
            ..Default::default()
        }
    }

    /// Set the maximum number of resident pages
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the sampling interval
    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    /// Set the protected tier share
    pub fn with_protected_fraction(mut self, fraction: f64) -> Self {
        self.protected_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the long-term tier share
    pub fn with_long_term_fraction(mut self, fraction: f64) -> Self {
        self.long_term_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the sample callback
    pub fn with_sample_callback(mut self, callback: SampleCallback) -> Self {
        self.sample_callback = Some(callback);
        self
    }

    /// Check the configuration and return the number of records per page.
    pub fn validate(&self) -> Result<u32> {
        let records_per_page = records_per_page(self.bytes_per_record, self.target_bytes_per_page)?;
        if self.capacity == 0 {
            return Err(WindowPoolError::InvalidCapacity(self.capacity));
        }
        Ok(records_per_page)
    }
}

/// Whole records that fit a target page size.
pub fn records_per_page(bytes_per_record: u32, target_bytes_per_page: u32) -> Result<u32> {
    if bytes_per_record == 0 || bytes_per_record > target_bytes_per_page {
        return Err(WindowPoolError::InvalidRecordSize {
            bytes_per_record,
            target_bytes_per_page,
        });
    }
    Ok(target_bytes_per_page / bytes_per_record)
}
