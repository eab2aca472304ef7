//! File mapper trait
//!
//! The window pool never touches the store file itself; it asks a mapper for
//! a window over one page worth of records.

use std::io;

/// Maps byte ranges of a record store file into in-memory windows.
pub trait FileMapper: Send + Sync {
    /// Window type produced by this mapper
    type Window: Send + Sync;

    /// Map the window covering `records_per_page` records of
    /// `bytes_per_record` bytes each, starting at record `first_record`.
    fn map_window(
        &self,
        first_record: u64,
        records_per_page: u32,
        bytes_per_record: u32,
    ) -> io::Result<Self::Window>;

    /// Current size of the store file in bytes
    fn file_size_in_bytes(&self) -> io::Result<u64>;
}

/// Byte range of a window, clamped to the bytes present in the file.
///
/// Returns `(offset, len)`; `len` is 0 when the window lies wholly past the
/// end of the file.
pub(crate) fn window_range(
    first_record: u64,
    records_per_page: u32,
    bytes_per_record: u32,
    file_len: u64,
) -> io::Result<(u64, usize)> {
    let offset = first_record
        .checked_mul(u64::from(bytes_per_record))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("record {first_record} is beyond the addressable file range"),
            )
        })?;
    let wanted = u64::from(records_per_page) * u64::from(bytes_per_record);
    let available = file_len.saturating_sub(offset).min(wanted);
    let len = usize::try_from(available)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "window too large"))?;
    Ok((offset, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_range_inside_file() {
        assert_eq!(window_range(10, 10, 8, 1000).unwrap(), (80, 80));
    }

    #[test]
    fn test_window_range_clamped_at_eof() {
        assert_eq!(window_range(10, 10, 8, 100).unwrap(), (80, 20));
        assert_eq!(window_range(20, 10, 8, 100).unwrap(), (160, 0));
    }

    #[test]
    fn test_window_range_overflow() {
        let err = window_range(u64::MAX, 1, 8, 100).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
