//! Shared test utilities for window pool and fault injection tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use oxiwindow::mapper::{FileMapper, MappedWindow, MemoryFileMapper};
use oxiwindow::{ScanResistantWindowPool, WindowPoolConfig};

/// A counting, fault-injecting wrapper around any `FileMapper`.
///
/// Allows deterministic injection of:
/// - failures for the next N window mappings
/// - a fixed delay inside every mapping, to widen race windows
pub struct CountingMapper<M> {
    inner: M,
    /// Total number of map_window calls observed so far.
    map_calls: AtomicU64,
    /// Remaining map_window calls that will fail.
    fail_remaining: AtomicU64,
    /// Delay applied inside each map_window call, in milliseconds.
    delay_ms: AtomicU64,
}

impl<M: FileMapper> CountingMapper<M> {
    /// Wrap an existing mapper.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            map_calls: AtomicU64::new(0),
            fail_remaining: AtomicU64::new(0),
            delay_ms: AtomicU64::new(0),
        }
    }

    /// Make the next `n` map_window calls return an I/O error.
    pub fn fail_next(&self, n: u64) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Sleep for `delay` inside every map_window call.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Return the total number of map_window calls observed.
    pub fn map_calls(&self) -> u64 {
        self.map_calls.load(Ordering::SeqCst)
    }

    /// Access the wrapped mapper.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: FileMapper> FileMapper for CountingMapper<M> {
    type Window = M::Window;

    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<M::Window> {
        self.map_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }

        let failing = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(io::Error::other("injected map failure"));
        }

        self.inner
            .map_window(first_record, records_per_page, bytes_per_record)
    }

    fn file_size_in_bytes(&self) -> io::Result<u64> {
        self.inner.file_size_in_bytes()
    }
}

/// In-memory store of `records` records, one byte each, so that record
/// numbers and page numbers coincide for a one-record page.
pub fn one_record_pages(
    records: u64,
    capacity: usize,
) -> ScanResistantWindowPool<CountingMapper<MemoryFileMapper>> {
    one_record_pages_with(records, one_record_config(capacity))
}

/// Configuration used by [`one_record_pages`], for tests that tune it.
pub fn one_record_config(capacity: usize) -> WindowPoolConfig {
    WindowPoolConfig::new("memory", 1, 1)
        .with_capacity(capacity)
        .with_report_interval(0)
}

/// Like [`one_record_pages`], with an explicit configuration.
pub fn one_record_pages_with(
    records: u64,
    config: WindowPoolConfig,
) -> ScanResistantWindowPool<CountingMapper<MemoryFileMapper>> {
    let mapper = CountingMapper::new(MemoryFileMapper::with_records(records, 1));
    ScanResistantWindowPool::new(config, mapper).expect("pool")
}

/// Write a store file of `records` records of `bytes_per_record` bytes,
/// each record filled with its record number's low byte.
pub fn write_store(dir: &Path, name: &str, records: u64, bytes_per_record: u32) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = Vec::with_capacity((records * u64::from(bytes_per_record)) as usize);
    for record in 0..records {
        bytes.extend(std::iter::repeat(record as u8).take(bytes_per_record as usize));
    }
    fs::write(&path, bytes).expect("write store");
    path
}

/// Expected contents of record `position` in a store written by
/// [`write_store`].
pub fn expected_record(position: u64, bytes_per_record: u32) -> Vec<u8> {
    vec![position as u8; bytes_per_record as usize]
}

/// Window type handed out by the mapper-backed pools in these tests.
pub type Window = MappedWindow;
