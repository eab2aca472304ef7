//! Page table entries
//!
//! A page covers a fixed run of records. Pages live in a dense arena
//! ([`PageTable`](super::PageTable)) for the lifetime of the pool; only their
//! residency changes. Eviction list links are arena indices, not pointers.

use std::fmt;
use std::sync::Arc;

use crate::paging::strategy::PageLoadError;
use crate::paging::utility::TemporalUtility;

/// Index of a page in the page table (its page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PageId(u32);

impl PageId {
    /// Largest representable page number
    pub const MAX: u32 = u32::MAX - 1;

    /// Create a page id from a page number
    #[inline]
    pub const fn new(page_number: u32) -> Self {
        Self(page_number)
    }

    /// The page number
    #[inline]
    pub const fn page_number(self) -> u32 {
        self.0
    }

    /// The arena index
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single page table entry.
pub struct Page<W> {
    /// First record covered by this page
    pub(crate) address: u64,
    /// Used since the last sweep (second chance bit)
    pub(crate) referenced: bool,
    /// Current tier
    pub(crate) utility: TemporalUtility,
    /// Eviction list currently holding this page
    pub(crate) list: Option<TemporalUtility>,
    pub(crate) prev: Option<PageId>,
    pub(crate) next: Option<PageId>,
    /// Mapped window, present while resident
    pub(crate) window: Option<Arc<W>>,
    /// A load for this page is in flight
    pub(crate) loading: bool,
    /// Number of load attempts started for this page
    pub(crate) load_attempt: u64,
    /// Failure of the most recent load attempt
    pub(crate) failure: Option<PageLoadError>,
    /// Threads blocked on an in-flight load
    pub(crate) waiters: usize,
    /// Window of a successful load that was evicted on admission, kept for
    /// the waiters of that attempt
    pub(crate) handoff: Option<(u64, Arc<W>)>,
}

impl<W> Page<W> {
    /// Create a detached, non-resident page
    pub(crate) fn new(address: u64) -> Self {
        Self {
            address,
            referenced: false,
            utility: TemporalUtility::Unknown,
            list: None,
            prev: None,
            next: None,
            window: None,
            loading: false,
            load_attempt: 0,
            failure: None,
            waiters: 0,
            handoff: None,
        }
    }

    /// First record covered by this page
    #[inline]
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Whether the page currently holds a mapped window
    #[inline]
    pub fn is_resident(&self) -> bool {
        self.window.is_some()
    }

    /// Whether the page is linked into an eviction list
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.list.is_some()
    }

    /// Current tier
    #[inline]
    pub fn utility(&self) -> TemporalUtility {
        self.utility
    }

    /// Reference bit
    #[inline]
    pub fn referenced(&self) -> bool {
        self.referenced
    }
}

impl<W> fmt::Debug for Page<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("address", &self.address)
            .field("referenced", &self.referenced)
            .field("utility", &self.utility)
            .field("list", &self.list)
            .field("resident", &self.is_resident())
            .field("loading", &self.loading)
            .field("waiters", &self.waiters)
            .finish()
    }
}

/// Point-in-time view of a page, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Page number
    pub id: PageId,
    /// First record covered by the page
    pub address: u64,
    /// Current tier
    pub utility: TemporalUtility,
    /// Reference bit
    pub referenced: bool,
    /// Whether a window is mapped
    pub resident: bool,
}

impl PageInfo {
    pub(crate) fn of<W>(id: PageId, page: &Page<W>) -> Self {
        Self {
            id,
            address: page.address,
            utility: page.utility,
            referenced: page.referenced,
            resident: page.is_resident(),
        }
    }
}
