//! Paging core
//!
//! Page table, per-tier eviction lists, tier bookkeeping and the
//! scan-resistant replacement strategy that ties them together.
//!
//! ```text
//!   Unknown      [head] p7 <-> p8 <-> p9 [tail]     <- victims come from here
//!   ShortTerm    [head] p2 <-> p5 [tail]
//!   LongTerm     [head] p0 [tail]
//! ```
//!
//! Loads enter at the `Unknown` tail. Hits promote one tier at a time, and
//! eviction always drains the head of the lowest populated tier.

mod list;
mod page;
mod strategy;
mod table;
mod utility;

pub use list::{EvictionList, EvictionLists};
pub use page::{Page, PageId, PageInfo};
pub use strategy::{
    PageLoadError, PageStorage, ScanResistantStrategy, DEFAULT_LONG_TERM_FRACTION,
    DEFAULT_PROTECTED_FRACTION,
};
pub use table::PageTable;
pub use utility::{TemporalUtility, TemporalUtilityCounter};
