//! File mapping for the window pool
//!
//! This module provides the [`FileMapper`] trait the pool loads pages
//! through, the [`MappedWindow`] it hands out, and mapper implementations.

mod memory_mapper;
mod mmap_mapper;
mod read_mapper;
mod traits;
mod window;

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

pub use memory_mapper::MemoryFileMapper;
pub use mmap_mapper::MmapFileMapper;
pub use read_mapper::ReadFileMapper;
pub use traits::FileMapper;
pub use window::MappedWindow;

/// How a store file is brought into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapperKind {
    /// Memory-map each window
    #[default]
    Mmap,
    /// Copy each window with positional reads
    Read,
}

impl MapperKind {
    /// Get the kind as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            MapperKind::Mmap => "mmap",
            MapperKind::Read => "read",
        }
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapperKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mmap" => Ok(MapperKind::Mmap),
            "read" => Ok(MapperKind::Read),
            other => Err(other.to_string()),
        }
    }
}

/// A file-backed mapper chosen at runtime
pub enum StoreFileMapper {
    /// Memory-mapped store file
    Mmap(MmapFileMapper),
    /// Store file read into owned buffers
    Read(ReadFileMapper),
}

impl StoreFileMapper {
    /// Open `path` with the given kind of mapper
    pub fn open(kind: MapperKind, path: impl AsRef<Path>) -> io::Result<Self> {
        match kind {
            MapperKind::Mmap => Ok(StoreFileMapper::Mmap(MmapFileMapper::open(path)?)),
            MapperKind::Read => Ok(StoreFileMapper::Read(ReadFileMapper::open(path)?)),
        }
    }

    /// Kind of this mapper
    pub fn kind(&self) -> MapperKind {
        match self {
            StoreFileMapper::Mmap(_) => MapperKind::Mmap,
            StoreFileMapper::Read(_) => MapperKind::Read,
        }
    }

    /// Path to the store file
    pub fn path(&self) -> &Path {
        match self {
            StoreFileMapper::Mmap(mapper) => mapper.path(),
            StoreFileMapper::Read(mapper) => mapper.path(),
        }
    }
}

impl FileMapper for StoreFileMapper {
    type Window = MappedWindow;

    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<MappedWindow> {
        match self {
            StoreFileMapper::Mmap(mapper) => {
                mapper.map_window(first_record, records_per_page, bytes_per_record)
            }
            StoreFileMapper::Read(mapper) => {
                mapper.map_window(first_record, records_per_page, bytes_per_record)
            }
        }
    }

    fn file_size_in_bytes(&self) -> io::Result<u64> {
        match self {
            StoreFileMapper::Mmap(mapper) => mapper.file_size_in_bytes(),
            StoreFileMapper::Read(mapper) => mapper.file_size_in_bytes(),
        }
    }
}
