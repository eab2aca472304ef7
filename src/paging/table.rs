//! Page table
//!
//! Dense, index-addressed arena of pages plus the per-tier eviction lists and
//! tier counts that thread through it. Grows monotonically and never shrinks.

use crate::paging::list::EvictionLists;
use crate::paging::page::{Page, PageId, PageInfo};
use crate::paging::utility::{TemporalUtility, TemporalUtilityCounter};

/// Page arena shared by the replacement strategy and the window pool.
pub struct PageTable<W> {
    pub(crate) pages: Vec<Page<W>>,
    pub(crate) lists: EvictionLists,
    pub(crate) counter: TemporalUtilityCounter,
}

impl<W> PageTable<W> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            lists: EvictionLists::new(),
            counter: TemporalUtilityCounter::new(),
        }
    }

    /// Number of pages in the table
    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the table has no pages yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Make sure `page_number` exists, creating every missing page up to and
    /// including it. Page `i` covers records starting at `i * records_per_page`.
    pub fn grow_to(&mut self, page_number: u32, records_per_page: u32) -> PageId {
        let required = page_number as usize + 1;
        if required > self.pages.len() {
            self.pages.reserve(required - self.pages.len());
            for index in self.pages.len()..required {
                self.pages
                    .push(Page::new(index as u64 * u64::from(records_per_page)));
            }
        }
        PageId::new(page_number)
    }

    /// Look up a page
    #[inline]
    pub fn page(&self, id: PageId) -> Option<&Page<W>> {
        self.pages.get(id.index())
    }

    /// Snapshot of a page
    pub fn info(&self, id: PageId) -> Option<PageInfo> {
        self.page(id).map(|page| PageInfo::of(id, page))
    }

    /// Pages currently holding a window
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.counter.total()
    }

    /// Per-tier resident counts
    pub fn tier_counts(&self) -> [usize; TemporalUtility::COUNT] {
        self.counter.counts()
    }

    /// Members of a tier's eviction list, head first
    pub fn tier_members(&self, tier: TemporalUtility) -> Vec<PageId> {
        self.lists.members(&self.pages, tier)
    }

    /// Ids of every resident page, in page order
    pub fn resident_pages(&self) -> Vec<PageId> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_resident())
            .map(|(index, _)| PageId::new(index as u32))
            .collect()
    }

    /// Check lists, tier counts and residency against each other.
    ///
    /// # Panics
    /// Panics if any of them disagree.
    pub fn check_integrity(&self) {
        self.lists.check_integrity(&self.pages);
        for tier in TemporalUtility::ALL {
            assert_eq!(
                self.lists.list(tier).len(),
                self.counter.count(tier),
                "{tier} count does not match its list"
            );
        }
        for (index, page) in self.pages.iter().enumerate() {
            assert_eq!(
                page.is_resident(),
                page.is_linked(),
                "page {index} residency does not match list membership"
            );
            if let Some(list) = page.list {
                assert_eq!(list, page.utility, "page {index} is in the wrong tier list");
            }
        }
    }
}

impl<W> Default for PageTable<W> {
    fn default() -> Self {
        Self::new()
    }
}
