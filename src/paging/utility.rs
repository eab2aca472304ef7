//! Temporal utility tiers
//!
//! Pages are classified by how much repeat use they have shown. Victims are
//! always taken from the lowest populated tier, so pages that are only ever
//! touched once (sequential scans) never compete with proven pages.

use std::fmt;

/// Utility classification of a resident page, ordered from least to most
/// proven-useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum TemporalUtility {
    /// Loaded but not touched again yet
    #[default]
    Unknown = 0,
    /// Touched again after its load
    ShortTerm = 1,
    /// Touched repeatedly without an intervening sweep
    LongTerm = 2,
}

impl TemporalUtility {
    /// Number of tiers
    pub const COUNT: usize = 3;

    /// All tiers, lowest first (victim search order)
    pub const ALL: [TemporalUtility; Self::COUNT] = [
        TemporalUtility::Unknown,
        TemporalUtility::ShortTerm,
        TemporalUtility::LongTerm,
    ];

    /// Index of the tier in per-tier arrays
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The next tier up, or `None` at the top
    pub const fn promoted(self) -> Option<TemporalUtility> {
        match self {
            TemporalUtility::Unknown => Some(TemporalUtility::ShortTerm),
            TemporalUtility::ShortTerm => Some(TemporalUtility::LongTerm),
            TemporalUtility::LongTerm => None,
        }
    }

    /// The next tier down, or `None` at the bottom
    pub const fn demoted(self) -> Option<TemporalUtility> {
        match self {
            TemporalUtility::Unknown => None,
            TemporalUtility::ShortTerm => Some(TemporalUtility::Unknown),
            TemporalUtility::LongTerm => Some(TemporalUtility::ShortTerm),
        }
    }

    /// Get the tier as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            TemporalUtility::Unknown => "unknown",
            TemporalUtility::ShortTerm => "short_term",
            TemporalUtility::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TemporalUtility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resident page population per tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalUtilityCounter {
    counts: [usize; TemporalUtility::COUNT],
}

impl TemporalUtilityCounter {
    /// Create a counter with every tier empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more resident page at `tier`
    #[inline]
    pub fn increment(&mut self, tier: TemporalUtility) {
        self.counts[tier.index()] += 1;
    }

    /// Count one less resident page at `tier`
    ///
    /// # Panics
    /// Panics if the tier is already empty; that means the eviction lists
    /// and the counter have diverged.
    #[inline]
    pub fn decrement(&mut self, tier: TemporalUtility) {
        let count = &mut self.counts[tier.index()];
        assert!(*count > 0, "temporal utility count for {tier} would go negative");
        *count -= 1;
    }

    /// Move one page's count from `from` to `to`
    pub fn transfer(&mut self, from: TemporalUtility, to: TemporalUtility) {
        self.decrement(from);
        self.increment(to);
    }

    /// Resident pages at `tier`
    #[inline]
    pub fn count(&self, tier: TemporalUtility) -> usize {
        self.counts[tier.index()]
    }

    /// Per-tier population, indexed by [`TemporalUtility::index`]
    pub fn counts(&self) -> [usize; TemporalUtility::COUNT] {
        self.counts
    }

    /// Total resident pages across all tiers
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Lowest tier holding at least one page
    pub fn lowest_populated(&self) -> Option<TemporalUtility> {
        TemporalUtility::ALL
            .into_iter()
            .find(|tier| self.count(*tier) > 0)
    }
}
