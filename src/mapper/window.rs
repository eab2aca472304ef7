//! Mapped windows
//!
//! A window is a read-only view over one page of records. It is either a
//! memory map of the store file or an owned copy of the bytes.

use std::fmt;

use memmap2::Mmap;

enum WindowData {
    Mapped(Mmap),
    Owned(Box<[u8]>),
}

impl WindowData {
    fn as_bytes(&self) -> &[u8] {
        match self {
            WindowData::Mapped(mmap) => &mmap[..],
            WindowData::Owned(bytes) => &bytes[..],
        }
    }
}

/// Read-only window over a run of fixed-size records.
///
/// Only the bytes that existed in the file when the window was mapped are
/// visible; records past the end of the file are reported as absent.
pub struct MappedWindow {
    first_record: u64,
    records_per_page: u32,
    bytes_per_record: u32,
    data: WindowData,
}

impl MappedWindow {
    /// Window backed by a memory map
    pub fn mapped(first_record: u64, records_per_page: u32, bytes_per_record: u32, mmap: Mmap) -> Self {
        Self {
            first_record,
            records_per_page,
            bytes_per_record,
            data: WindowData::Mapped(mmap),
        }
    }

    /// Window backed by an owned copy of the bytes
    pub fn owned(
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            first_record,
            records_per_page,
            bytes_per_record,
            data: WindowData::Owned(bytes.into_boxed_slice()),
        }
    }

    /// First record covered
    pub fn first_record(&self) -> u64 {
        self.first_record
    }

    /// Records covered, present in the file or not
    pub fn records_per_page(&self) -> u32 {
        self.records_per_page
    }

    /// Record size in bytes
    pub fn bytes_per_record(&self) -> u32 {
        self.bytes_per_record
    }

    /// Whether the window is a memory map
    pub fn is_mapped(&self) -> bool {
        matches!(self.data, WindowData::Mapped(_))
    }

    /// Whole records present in the window
    pub fn available_records(&self) -> u32 {
        (self.data.as_bytes().len() / self.bytes_per_record as usize) as u32
    }

    /// Whether `position` falls in this window's record range
    pub fn contains(&self, position: u64) -> bool {
        position >= self.first_record
            && position - self.first_record < u64::from(self.records_per_page)
    }

    /// Bytes of the record at `position`
    pub fn record(&self, position: u64) -> Option<&[u8]> {
        if !self.contains(position) {
            return None;
        }
        let size = self.bytes_per_record as usize;
        let start = (position - self.first_record) as usize * size;
        self.data.as_bytes().get(start..start + size)
    }

    /// Raw window bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

impl fmt::Debug for MappedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedWindow")
            .field("first_record", &self.first_record)
            .field("records_per_page", &self.records_per_page)
            .field("bytes_per_record", &self.bytes_per_record)
            .field("len", &self.data.as_bytes().len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
