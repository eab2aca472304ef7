//! Scan-resistant, read-only window pool

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::Level;

use crate::error::{Result, WindowPoolError};
use crate::mapper::FileMapper;
use crate::paging::{PageId, PageInfo, PageLoadError, PageStorage, ScanResistantStrategy};
use crate::pool::config::WindowPoolConfig;
use crate::pool::{OperationType, WindowPool};
use crate::stats::{store_name, HitRateSampler, TierCounts, WindowPoolStats};

/// Read-only window pool over a record store file.
///
/// Positions are record numbers. Each page covers `records_per_page`
/// consecutive records; page `n` starts at record `n * records_per_page`.
/// The page table grows on demand as positions beyond the end are requested.
pub struct ScanResistantWindowPool<M: FileMapper> {
    config: WindowPoolConfig,
    /// File-name component of the store name
    name: String,
    mapper: M,
    records_per_page: u32,
    strategy: ScanResistantStrategy<M::Window>,
    acquire_count: AtomicU64,
    map_count: AtomicU64,
    sampler: Mutex<HitRateSampler>,
}

impl<M: FileMapper> ScanResistantWindowPool<M> {
    /// Create a pool over `mapper`.
    ///
    /// The page table is pre-sized to cover the file as it is now.
    pub fn new(config: WindowPoolConfig, mapper: M) -> Result<Self> {
        let records_per_page = config.validate()?;
        let name = store_name(&config.store_name);
        let strategy = ScanResistantStrategy::with_fractions(
            config.capacity,
            config.protected_fraction,
            config.long_term_fraction,
        );
        let sampler = Mutex::new(HitRateSampler::new(name.clone()));

        let pool = Self {
            config,
            name,
            mapper,
            records_per_page,
            strategy,
            acquire_count: AtomicU64::new(0),
            map_count: AtomicU64::new(0),
            sampler,
        };

        let file_size = pool.mapper.file_size_in_bytes()?;
        pool.resolve_page(file_size / u64::from(pool.config.bytes_per_record))?;

        if tracing::enabled!(Level::DEBUG) {
            tracing::debug!(
                store = %pool.name,
                file_size,
                bytes_per_record = pool.config.bytes_per_record,
                records_per_page,
                capacity = pool.config.capacity,
                pages = pool.strategy.page_count(),
                "window pool opened"
            );
        }

        Ok(pool)
    }

    /// Records covered by one page
    pub fn records_per_page(&self) -> u32 {
        self.records_per_page
    }

    /// Size of one record in bytes
    pub fn bytes_per_record(&self) -> u32 {
        self.config.bytes_per_record
    }

    /// Bytes covered by one page
    pub fn bytes_per_page(&self) -> u64 {
        u64::from(self.records_per_page) * u64::from(self.config.bytes_per_record)
    }

    /// Maximum resident pages
    pub fn capacity(&self) -> usize {
        self.strategy.capacity()
    }

    /// Reported store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pool configuration
    pub fn config(&self) -> &WindowPoolConfig {
        &self.config
    }

    /// The file mapper
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Replacement strategy, for inspection
    pub fn strategy(&self) -> &ScanResistantStrategy<M::Window> {
        &self.strategy
    }

    /// Pages in the page table
    pub fn page_count(&self) -> usize {
        self.strategy.page_count()
    }

    /// Pages currently holding a window
    pub fn resident_count(&self) -> usize {
        self.strategy.resident_count()
    }

    /// Total acquisitions so far
    pub fn acquire_count(&self) -> u64 {
        self.acquire_count.load(Ordering::Relaxed)
    }

    /// Total windows mapped so far
    pub fn map_count(&self) -> u64 {
        self.map_count.load(Ordering::Relaxed)
    }

    /// Page number covering record `position`
    pub fn page_number(&self, position: u64) -> Result<u32> {
        let page_number = position / u64::from(self.records_per_page);
        if page_number > u64::from(PageId::MAX) {
            return Err(WindowPoolError::PositionOverflow {
                position,
                records_per_page: self.records_per_page,
                page_number,
            });
        }
        Ok(page_number as u32)
    }

    /// Snapshot of the page covering `position`, if the table reaches it
    pub fn page_info(&self, position: u64) -> Result<Option<PageInfo>> {
        let page_number = self.page_number(position)?;
        Ok(self.strategy.info(PageId::new(page_number)))
    }

    /// Resolve the page covering `position`, growing the table through it.
    fn resolve_page(&self, position: u64) -> Result<PageId> {
        let page_number = self.page_number(position)?;
        Ok(self.strategy.page(page_number, self.records_per_page))
    }

    /// Take a hit-rate sample if acquisition `acquired` closes an interval.
    fn maybe_report(&self, acquired: u64) {
        if !HitRateSampler::is_due(self.config.report_interval, acquired) {
            return;
        }
        let sample = self
            .sampler
            .lock()
            .sample(acquired, self.map_count(), Instant::now());

        if tracing::enabled!(Level::INFO) {
            tracing::info!(
                store = %sample.store,
                acquired = sample.acquired,
                mapped = sample.mapped,
                miss_pct = sample.miss_percent(),
                elapsed_ms = sample.elapsed_ms(),
                "{sample}"
            );
        }
        if let Some(callback) = &self.config.sample_callback {
            callback(&sample);
        }
    }
}

impl<M: FileMapper> PageStorage<M::Window> for ScanResistantWindowPool<M> {
    fn load(&self, address: u64) -> std::result::Result<M::Window, PageLoadError> {
        let window = self
            .mapper
            .map_window(address, self.records_per_page, self.config.bytes_per_record)?;
        self.map_count.fetch_add(1, Ordering::Relaxed);
        Ok(window)
    }
}

impl<M: FileMapper> WindowPool for ScanResistantWindowPool<M> {
    type Window = M::Window;

    fn acquire(&self, position: u64, operation: OperationType) -> Result<Arc<M::Window>> {
        if operation != OperationType::Read {
            return Err(WindowPoolError::UnsupportedOperation(operation));
        }

        let id = self.resolve_page(position)?;
        let acquired = self.acquire_count.fetch_add(1, Ordering::Relaxed) + 1;
        let result = self.strategy.acquire(id, self);
        self.maybe_report(acquired);

        result.map_err(|source| {
            let byte_offset = position.saturating_mul(u64::from(self.config.bytes_per_record));
            tracing::warn!(
                store = %self.name,
                position,
                byte_offset,
                page = %id,
                error = %source,
                "failed to load page"
            );
            WindowPoolError::Storage {
                position,
                byte_offset,
                source,
            }
        })
    }

    fn release(&self, window: Arc<M::Window>) {
        drop(window);
    }

    fn flush_all(&self) {}

    fn close(&self) {
        let released = self.strategy.force_evict_all();
        tracing::debug!(
            store = %self.name,
            released,
            acquired = self.acquire_count(),
            mapped = self.map_count(),
            "window pool closed"
        );
    }

    fn stats(&self) -> WindowPoolStats {
        let acquired = self.acquire_count();
        let mapped = self.map_count();
        WindowPoolStats {
            store_name: self.name.clone(),
            page_table_size: self.strategy.page_count(),
            bytes_per_page: self.bytes_per_page(),
            records_per_page: self.records_per_page,
            hit_count: acquired.saturating_sub(mapped),
            miss_count: mapped,
            resident_pages: self.strategy.resident_count(),
            tier_counts: TierCounts::from_array(self.strategy.tier_counts()),
        }
    }
}
