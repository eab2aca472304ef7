//! Memory-mapping file mapper

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::MmapOptions;

use crate::mapper::traits::{window_range, FileMapper};
use crate::mapper::window::MappedWindow;

/// Maps windows straight out of the store file with `mmap`.
///
/// Unmapping happens when the last holder of a window drops it.
pub struct MmapFileMapper {
    /// Path to the store file
    path: PathBuf,
    /// The store file, opened read-only
    file: File,
}

impl MmapFileMapper {
    /// Open an existing store file
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Get the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileMapper for MmapFileMapper {
    type Window = MappedWindow;

    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<MappedWindow> {
        let file_len = self.file.metadata()?.len();
        let (offset, len) = window_range(first_record, records_per_page, bytes_per_record, file_len)?;

        // Zero-length maps are rejected by the OS.
        if len == 0 {
            return Ok(MappedWindow::owned(
                first_record,
                records_per_page,
                bytes_per_record,
                Vec::new(),
            ));
        }

        // SAFETY: the store file is only read through this pool; callers must
        // not truncate it while windows are mapped.
        let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map(&self.file)? };
        Ok(MappedWindow::mapped(
            first_record,
            records_per_page,
            bytes_per_record,
            mmap,
        ))
    }

    fn file_size_in_bytes(&self) -> io::Result<u64> {
        self.file.metadata().map(|m| m.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_map_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bytes: Vec<u8> = (0u8..64).collect();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let mapper = MmapFileMapper::open(file.path()).unwrap();
        assert_eq!(mapper.file_size_in_bytes().unwrap(), 64);

        let window = mapper.map_window(2, 2, 8).unwrap();
        assert!(window.is_mapped());
        assert_eq!(window.record(2), Some(&bytes[16..24]));
        assert_eq!(window.record(3), Some(&bytes[24..32]));
    }

    #[test]
    fn test_map_window_past_eof() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 20]).unwrap();
        file.flush().unwrap();

        let mapper = MmapFileMapper::open(file.path()).unwrap();

        let partial = mapper.map_window(2, 4, 8).unwrap();
        assert_eq!(partial.available_records(), 0);
        assert_eq!(partial.as_bytes().len(), 4);

        let empty = mapper.map_window(8, 4, 8).unwrap();
        assert!(!empty.is_mapped());
        assert!(empty.as_bytes().is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MmapFileMapper::open(dir.path().join("missing.db"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
