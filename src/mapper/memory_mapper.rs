//! In-memory file mapper for testing
//!
//! Serves windows from a byte buffer instead of a file. The buffer can be
//! extended to model a store file that grows while the pool is open.

use std::io;

use parking_lot::RwLock;

use crate::mapper::traits::{window_range, FileMapper};
use crate::mapper::window::MappedWindow;

/// Store file held in memory
#[derive(Default)]
pub struct MemoryFileMapper {
    bytes: RwLock<Vec<u8>>,
}

impl MemoryFileMapper {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `bytes`
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(bytes),
        }
    }

    /// Create a store of `records` records of `bytes_per_record` bytes, each
    /// record filled with its record number's low byte
    pub fn with_records(records: u64, bytes_per_record: u32) -> Self {
        let mut bytes = Vec::with_capacity((records * u64::from(bytes_per_record)) as usize);
        for record in 0..records {
            bytes.extend(std::iter::repeat(record as u8).take(bytes_per_record as usize));
        }
        Self::with_bytes(bytes)
    }

    /// Append bytes to the end of the store
    pub fn append(&self, bytes: &[u8]) {
        self.bytes.write().extend_from_slice(bytes);
    }
}

impl FileMapper for MemoryFileMapper {
    type Window = MappedWindow;

    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<MappedWindow> {
        let bytes = self.bytes.read();
        let (offset, len) =
            window_range(first_record, records_per_page, bytes_per_record, bytes.len() as u64)?;
        let start = offset as usize;
        Ok(MappedWindow::owned(
            first_record,
            records_per_page,
            bytes_per_record,
            bytes[start..start + len].to_vec(),
        ))
    }

    fn file_size_in_bytes(&self) -> io::Result<u64> {
        Ok(self.bytes.read().len() as u64)
    }
}
