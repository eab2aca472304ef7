//! Point-in-time window pool statistics

use std::path::Path;

use serde::Serialize;

use crate::paging::TemporalUtility;

/// Resident pages per utility tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    /// Pages seen once
    pub unknown: usize,
    /// Pages hit at least once since loading
    pub short_term: usize,
    /// Pages hit repeatedly
    pub long_term: usize,
}

impl TierCounts {
    /// Build from counts indexed by [`TemporalUtility::index`]
    pub fn from_array(counts: [usize; TemporalUtility::COUNT]) -> Self {
        Self {
            unknown: counts[TemporalUtility::Unknown.index()],
            short_term: counts[TemporalUtility::ShortTerm.index()],
            long_term: counts[TemporalUtility::LongTerm.index()],
        }
    }

    /// Count for one tier
    pub fn get(&self, utility: TemporalUtility) -> usize {
        match utility {
            TemporalUtility::Unknown => self.unknown,
            TemporalUtility::ShortTerm => self.short_term,
            TemporalUtility::LongTerm => self.long_term,
        }
    }

    /// Sum over all tiers
    pub fn total(&self) -> usize {
        self.unknown + self.short_term + self.long_term
    }
}

/// Snapshot of a window pool's configuration and counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowPoolStats {
    /// File-name component of the store
    pub store_name: String,
    /// Pages in the page table, resident or not
    pub page_table_size: usize,
    /// Bytes covered by one page
    pub bytes_per_page: u64,
    /// Records covered by one page
    pub records_per_page: u32,
    /// Acquisitions served without mapping
    pub hit_count: u64,
    /// Acquisitions that mapped a window
    pub miss_count: u64,
    /// Pages currently holding a window
    pub resident_pages: usize,
    /// Resident pages per tier
    pub tier_counts: TierCounts,
}

impl WindowPoolStats {
    /// Total acquisitions
    pub fn acquire_count(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Hit rate in [0, 1]
    pub fn hit_rate(&self) -> f64 {
        let total = self.acquire_count();
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Last path component of a store name, or the name itself if it has none.
pub fn store_name(store: &str) -> String {
    Path::new(store)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| store.to_string())
}
