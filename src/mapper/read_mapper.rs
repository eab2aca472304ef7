//! Positional-read file mapper
//!
//! Copies each window out of the store file. Useful where memory maps are
//! unavailable or undesirable.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::mapper::traits::{window_range, FileMapper};
use crate::mapper::window::MappedWindow;

/// Reads windows into owned buffers.
///
/// Wraps the file with mutex protection for thread-safe access.
pub struct ReadFileMapper {
    /// Path to the store file
    path: PathBuf,
    /// The underlying file
    file: Mutex<File>,
}

impl ReadFileMapper {
    /// Open an existing store file
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Get the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileMapper for ReadFileMapper {
    type Window = MappedWindow;

    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<MappedWindow> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("Failed to lock file"))?;

        let file_len = file.metadata()?.len();
        let (offset, len) = window_range(first_record, records_per_page, bytes_per_record, file_len)?;

        let mut buf = vec![0u8; len];
        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < len {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);

        Ok(MappedWindow::owned(
            first_record,
            records_per_page,
            bytes_per_record,
            buf,
        ))
    }

    fn file_size_in_bytes(&self) -> io::Result<u64> {
        let file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("Failed to lock file"))?;

        file.metadata().map(|m| m.len())
    }
}
