//! Scan-resistant page replacement
//!
//! Pages enter the cache at the lowest tier and only climb through repeat
//! hits. Victims are always taken from the head of the lowest populated tier,
//! with a CLOCK-style second chance for pages whose reference bit is set.
//! A sequential scan therefore only ever recycles its own pages.
//!
//! The strategy owns the page arena behind a single mutex. Loads run with
//! the mutex released; a per-page loading marker makes concurrent misses on
//! the same page wait for the one load in flight instead of mapping twice.

use std::io;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::paging::page::{PageId, PageInfo};
use crate::paging::table::PageTable;
use crate::paging::utility::TemporalUtility;

/// Default share of capacity the protected tiers may hold. At 1.0 a hot
/// set filling the whole pool is never displaced by single-use pages.
pub const DEFAULT_PROTECTED_FRACTION: f64 = 1.0;
/// Default share of capacity the top tier may hold
pub const DEFAULT_LONG_TERM_FRACTION: f64 = 0.5;

/// A page could not be loaded.
///
/// Cloneable so that every caller waiting on the same load observes the same
/// failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("page load failed: {source}")]
pub struct PageLoadError {
    #[source]
    source: Arc<io::Error>,
}

impl PageLoadError {
    /// Wrap an I/O error
    pub fn new(source: io::Error) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// The underlying I/O error
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Kind of the underlying I/O error
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl From<io::Error> for PageLoadError {
    fn from(source: io::Error) -> Self {
        Self::new(source)
    }
}

/// Loads the window for a page on a miss.
///
/// `address` is the first record covered by the page. Called without any
/// strategy lock held.
pub trait PageStorage<W> {
    /// Load the window for the page starting at record `address`
    fn load(&self, address: u64) -> Result<W, PageLoadError>;
}

impl<W, F> PageStorage<W> for F
where
    F: Fn(u64) -> Result<W, PageLoadError>,
{
    fn load(&self, address: u64) -> Result<W, PageLoadError> {
        self(address)
    }
}

/// Compute a tier bound from a capacity share.
fn tier_limit(capacity: usize, fraction: f64) -> usize {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        1.0
    };
    ((capacity as f64 * fraction).ceil() as usize).clamp(1, capacity)
}

/// Scan-resistant, tiered CLOCK replacement over a growable page table.
pub struct ScanResistantStrategy<W> {
    /// Maximum resident pages
    capacity: usize,
    /// Maximum pages in `ShortTerm` and `LongTerm` together
    protected_limit: usize,
    /// Maximum pages in `LongTerm`
    long_term_limit: usize,
    table: Mutex<PageTable<W>>,
    /// Signalled whenever a load finishes, successfully or not
    load_complete: Condvar,
}

impl<W> ScanResistantStrategy<W> {
    /// Create a strategy holding at most `capacity` resident pages
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Self::with_fractions(
            capacity,
            DEFAULT_PROTECTED_FRACTION,
            DEFAULT_LONG_TERM_FRACTION,
        )
    }

    /// Create a strategy with explicit tier bounds, given as shares of
    /// `capacity`.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_fractions(capacity: usize, protected_fraction: f64, long_term_fraction: f64) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            capacity,
            protected_limit: tier_limit(capacity, protected_fraction),
            long_term_limit: tier_limit(capacity, long_term_fraction),
            table: Mutex::new(PageTable::new()),
            load_complete: Condvar::new(),
        }
    }

    /// Maximum resident pages
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum pages in the protected tiers
    pub fn protected_limit(&self) -> usize {
        self.protected_limit
    }

    /// Maximum pages in the top tier
    pub fn long_term_limit(&self) -> usize {
        self.long_term_limit
    }

    /// Resolve `page_number`, growing the table through it if needed.
    pub fn page(&self, page_number: u32, records_per_page: u32) -> PageId {
        self.table.lock().grow_to(page_number, records_per_page)
    }

    /// Number of pages in the table
    pub fn page_count(&self) -> usize {
        self.table.lock().len()
    }

    /// Number of resident pages
    pub fn resident_count(&self) -> usize {
        self.table.lock().resident_count()
    }

    /// Resident pages per tier
    pub fn tier_counts(&self) -> [usize; TemporalUtility::COUNT] {
        self.table.lock().tier_counts()
    }

    /// Snapshot of one page
    pub fn info(&self, id: PageId) -> Option<PageInfo> {
        self.table.lock().info(id)
    }

    /// Run `f` against the locked table
    pub fn with_table<R>(&self, f: impl FnOnce(&PageTable<W>) -> R) -> R {
        f(&self.table.lock())
    }

    /// Get a resident window for `id`, loading it through `storage` on a miss.
    ///
    /// A miss may evict other pages, or the new page itself, to stay within
    /// capacity. The returned window stays valid for as long as the caller
    /// holds it, even if the page is evicted meanwhile.
    ///
    /// # Panics
    /// Panics if `id` is not in the table.
    pub fn acquire<S>(&self, id: PageId, storage: &S) -> Result<Arc<W>, PageLoadError>
    where
        S: PageStorage<W> + ?Sized,
    {
        let mut table = self.table.lock();
        assert!(id.index() < table.len(), "page {id} is not in the page table");

        let mut awaited = None;
        loop {
            let page = &mut table.pages[id.index()];

            if let Some(window) = page.window.clone() {
                self.record_hit(&mut table, id);
                return Ok(window);
            }

            if page.loading {
                let attempt = page.load_attempt;
                page.waiters += 1;
                self.load_complete.wait(&mut table);

                let page = &mut table.pages[id.index()];
                page.waiters -= 1;
                let handed = match &page.handoff {
                    Some((loaded, window)) if *loaded == attempt => Some(Arc::clone(window)),
                    _ => None,
                };
                if page.waiters == 0 {
                    page.handoff = None;
                }
                if let Some(window) = handed {
                    return Ok(window);
                }
                awaited = Some(attempt);
                continue;
            }

            // The load we waited on failed and nobody has retried since.
            if let (Some(attempt), Some(failure)) = (awaited, &page.failure) {
                if page.load_attempt == attempt {
                    return Err(failure.clone());
                }
            }

            page.loading = true;
            page.load_attempt += 1;
            page.failure = None;
            let attempt = page.load_attempt;
            let address = page.address;

            let loaded = MutexGuard::unlocked(&mut table, || storage.load(address));

            let page = &mut table.pages[id.index()];
            page.loading = false;
            return match loaded {
                Ok(window) => {
                    let window = Arc::new(window);
                    let evicted = self.admit(&mut table, id, Arc::clone(&window));
                    // Evicted on admission: waiters still get this load's window.
                    let page = &mut table.pages[id.index()];
                    if page.window.is_none() && page.waiters > 0 {
                        page.handoff = Some((attempt, Arc::clone(&window)));
                    }
                    drop(table);
                    self.load_complete.notify_all();
                    drop(evicted);
                    Ok(window)
                }
                Err(err) => {
                    page.failure = Some(err.clone());
                    drop(table);
                    self.load_complete.notify_all();
                    Err(err)
                }
            };
        }
    }

    /// Evict `id` regardless of tier or reference bit. Returns whether a
    /// window was released.
    pub fn force_evict(&self, id: PageId) -> bool {
        let mut table = self.table.lock();
        if id.index() >= table.len() {
            return false;
        }
        let evicted = Self::evict(&mut table, id);
        drop(table);
        evicted.is_some()
    }

    /// Evict every resident page. Returns the number of windows released.
    pub fn force_evict_all(&self) -> usize {
        let mut table = self.table.lock();
        let evicted: Vec<Arc<W>> = table
            .resident_pages()
            .into_iter()
            .filter_map(|id| Self::evict(&mut table, id))
            .collect();
        drop(table);
        evicted.len()
    }

    /// Update reference bit and tier for a hit on a resident page.
    fn record_hit(&self, table: &mut PageTable<W>, id: PageId) {
        let page = &mut table.pages[id.index()];
        let current = page.utility;
        let promote = match current {
            TemporalUtility::Unknown => true,
            TemporalUtility::ShortTerm => page.referenced,
            TemporalUtility::LongTerm => false,
        };
        page.referenced = true;

        if let Some(next) = current.promoted().filter(|_| promote) {
            Self::set_utility(table, id, next);
            self.enforce_tier_limits(table, id);
        }
    }

    /// Demote tier heads until both tier bounds hold again. `pinned` is the
    /// page just promoted and is never demoted here.
    fn enforce_tier_limits(&self, table: &mut PageTable<W>, pinned: PageId) {
        while table.counter.count(TemporalUtility::LongTerm) > self.long_term_limit {
            match table.lists.list(TemporalUtility::LongTerm).head() {
                Some(head) if head != pinned => {
                    Self::set_utility(table, head, TemporalUtility::ShortTerm)
                }
                _ => break,
            }
        }

        while table.counter.count(TemporalUtility::ShortTerm)
            + table.counter.count(TemporalUtility::LongTerm)
            > self.protected_limit
        {
            match table.lists.list(TemporalUtility::ShortTerm).head() {
                Some(head) if head != pinned => {
                    Self::set_utility(table, head, TemporalUtility::Unknown)
                }
                _ => break,
            }
        }
    }

    /// Move a resident page to the tail of `tier`, keeping counts in step.
    fn set_utility(table: &mut PageTable<W>, id: PageId, tier: TemporalUtility) {
        let page = &mut table.pages[id.index()];
        let previous = page.utility;
        page.utility = tier;
        table.counter.transfer(previous, tier);
        table.lists.append(&mut table.pages, id, tier);
    }

    /// Make a freshly loaded page resident, then evict until within capacity.
    /// Returns the evicted windows so they can be dropped outside the lock.
    fn admit(&self, table: &mut PageTable<W>, id: PageId, window: Arc<W>) -> Vec<Arc<W>> {
        let page = &mut table.pages[id.index()];
        page.window = Some(window);
        page.referenced = false;
        page.utility = TemporalUtility::Unknown;
        table.counter.increment(TemporalUtility::Unknown);
        table
            .lists
            .append(&mut table.pages, id, TemporalUtility::Unknown);

        let mut evicted = Vec::new();
        while table.resident_count() > self.capacity {
            let Some(victim) = Self::select_victim(table) else {
                break;
            };
            evicted.extend(Self::evict(table, victim));
        }
        evicted
    }

    /// Pick the next victim from the lowest populated tier, giving
    /// referenced pages a second chance at that tier's tail.
    fn select_victim(table: &mut PageTable<W>) -> Option<PageId> {
        let tier = table.counter.lowest_populated()?;
        loop {
            let head = table.lists.list(tier).head()?;
            let page = &mut table.pages[head.index()];
            if !page.referenced {
                return Some(head);
            }
            page.referenced = false;
            table.lists.append(&mut table.pages, head, tier);
        }
    }

    /// Drop a page's residency. The page itself stays in the table.
    fn evict(table: &mut PageTable<W>, id: PageId) -> Option<Arc<W>> {
        let page = &mut table.pages[id.index()];
        let window = page.window.take()?;
        let tier = page.utility;
        let address = page.address;
        page.utility = TemporalUtility::Unknown;
        page.referenced = false;

        table.counter.decrement(tier);
        table.lists.remove(&mut table.pages, id);

        tracing::trace!(page = %id, address, tier = %tier, "page evicted");
        Some(window)
    }
}
