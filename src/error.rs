//! Errors returned by the window pool

use std::io;

use crate::paging::PageLoadError;
use crate::pool::OperationType;

/// Result type used throughout the window pool
pub type Result<T> = std::result::Result<T, WindowPoolError>;

/// Errors returned by window pool operations.
#[derive(Debug, thiserror::Error)]
pub enum WindowPoolError {
    /// Record size does not fit the target page size.
    #[error(
        "number of bytes per record [{bytes_per_record}] is not in the valid range [1-{target_bytes_per_page}]"
    )]
    InvalidRecordSize {
        /// Configured record size.
        bytes_per_record: u32,
        /// Configured target page size.
        target_bytes_per_page: u32,
    },
    /// The pool must be able to hold at least one page.
    #[error("pool capacity must be at least one page, got {0}")]
    InvalidCapacity(usize),
    /// Position maps to a page number outside the page table's index space.
    #[error(
        "position [record {position}] with current page size [{records_per_page} records/page] implies an impossible page number [{page_number}]"
    )]
    PositionOverflow {
        /// Requested record position.
        position: u64,
        /// Records per page of the pool.
        records_per_page: u32,
        /// Page number the position maps to.
        page_number: u64,
    },
    /// Only reads are served.
    #[error("unsupported operation {0}: only READ operations are supported")]
    UnsupportedOperation(OperationType),
    /// The page holding the position could not be loaded.
    #[error("unable to load position[{position}] @[{byte_offset}]")]
    Storage {
        /// Requested record position.
        position: u64,
        /// Byte offset of the record in the store file.
        byte_offset: u64,
        /// Underlying load failure.
        #[source]
        source: PageLoadError,
    },
    /// I/O error from the file mapper outside of a page load.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl WindowPoolError {
    /// Whether the error is a construction-time configuration error
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            WindowPoolError::InvalidRecordSize { .. } | WindowPoolError::InvalidCapacity(_)
        )
    }

    /// Whether the error came from the file mapper
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            WindowPoolError::Storage { .. } | WindowPoolError::Io(_)
        )
    }
}
