//! Intrusive eviction lists
//!
//! Each tier owns one doubly-linked list threaded through the pages
//! themselves. Links are [`PageId`]s into the page arena, so appending and
//! unlinking are O(1) index rewiring and never search.

use crate::paging::page::{Page, PageId};
use crate::paging::utility::TemporalUtility;

/// One ordered list of pages. Head is the next candidate for eviction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionList {
    head: Option<PageId>,
    tail: Option<PageId>,
    size: usize,
}

impl EvictionList {
    /// First page (oldest arrival at the tail)
    #[inline]
    pub fn head(&self) -> Option<PageId> {
        self.head
    }

    /// Last page appended
    #[inline]
    pub fn tail(&self) -> Option<PageId> {
        self.tail
    }

    /// Number of member pages
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the list has no members
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// The eviction list of every tier.
///
/// A page is a member of at most one list; `Page::list` names it.
#[derive(Debug, Clone, Default)]
pub struct EvictionLists {
    lists: [EvictionList; TemporalUtility::COUNT],
}

impl EvictionLists {
    /// Create empty lists for every tier
    pub fn new() -> Self {
        Self::default()
    }

    /// The list for `tier`
    #[inline]
    pub fn list(&self, tier: TemporalUtility) -> &EvictionList {
        &self.lists[tier.index()]
    }

    /// Detach `id` from whatever list holds it, then link it as the tail of
    /// `target`'s list.
    pub fn append<W>(&mut self, pages: &mut [Page<W>], id: PageId, target: TemporalUtility) {
        self.remove(pages, id);

        let list = &mut self.lists[target.index()];
        let tail = list.tail;

        let page = &mut pages[id.index()];
        page.prev = tail;
        page.next = None;
        page.list = Some(target);

        match tail {
            Some(tail) => pages[tail.index()].next = Some(id),
            None => list.head = Some(id),
        }
        list.tail = Some(id);
        list.size += 1;
    }

    /// Unlink `id` from its list. Returns `false` if it was already detached.
    pub fn remove<W>(&mut self, pages: &mut [Page<W>], id: PageId) -> bool {
        let page = &mut pages[id.index()];
        let Some(current) = page.list.take() else {
            return false;
        };
        let prev = page.prev.take();
        let next = page.next.take();

        let list = &mut self.lists[current.index()];
        match prev {
            Some(prev) => pages[prev.index()].next = next,
            None => list.head = next,
        }
        match next {
            Some(next) => pages[next.index()].prev = prev,
            None => list.tail = prev,
        }
        assert!(list.size > 0, "eviction list for {current} is corrupted");
        list.size -= 1;
        true
    }

    /// Members of `tier`'s list from head to tail
    pub fn members<W>(&self, pages: &[Page<W>], tier: TemporalUtility) -> Vec<PageId> {
        let mut members = Vec::with_capacity(self.list(tier).len());
        let mut cursor = self.list(tier).head;
        while let Some(id) = cursor {
            members.push(id);
            cursor = pages[id.index()].next;
        }
        members
    }

    /// Walk every list both ways and check it against the pages' links.
    ///
    /// # Panics
    /// Panics on any broken link, cycle or size mismatch.
    pub fn check_integrity<W>(&self, pages: &[Page<W>]) {
        for tier in TemporalUtility::ALL {
            let list = self.list(tier);

            let forward = self.members(pages, tier);
            assert_eq!(forward.len(), list.size, "{tier} list size mismatch");

            let mut backward = Vec::with_capacity(list.size);
            let mut cursor = list.tail;
            while let Some(id) = cursor {
                assert!(backward.len() < list.size, "{tier} list has a cycle");
                backward.push(id);
                cursor = pages[id.index()].prev;
            }
            backward.reverse();
            assert_eq!(forward, backward, "{tier} list links disagree");

            for id in &forward {
                assert_eq!(pages[id.index()].list, Some(tier), "page {id} not owned by {tier}");
            }
        }

        let linked = pages.iter().filter(|page| page.is_linked()).count();
        let listed: usize = self.lists.iter().map(|list| list.size).sum();
        assert_eq!(linked, listed, "orphaned pages outside every list");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: u32) -> Vec<Page<()>> {
        (0..n).map(|i| Page::new(i as u64 * 10)).collect()
    }

    fn id(n: u32) -> PageId {
        PageId::new(n)
    }

    #[test]
    fn test_append_builds_fifo_order() {
        let mut pages = pages(3);
        let mut lists = EvictionLists::new();

        for n in 0..3 {
            lists.append(&mut pages, id(n), TemporalUtility::Unknown);
        }

        let list = lists.list(TemporalUtility::Unknown);
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(id(0)));
        assert_eq!(list.tail(), Some(id(2)));
        assert_eq!(
            lists.members(&pages, TemporalUtility::Unknown),
            vec![id(0), id(1), id(2)]
        );
        lists.check_integrity(&pages);
    }

    #[test]
    fn test_append_moves_between_lists() {
        let mut pages = pages(3);
        let mut lists = EvictionLists::new();
        for n in 0..3 {
            lists.append(&mut pages, id(n), TemporalUtility::Unknown);
        }

        lists.append(&mut pages, id(1), TemporalUtility::ShortTerm);

        assert_eq!(
            lists.members(&pages, TemporalUtility::Unknown),
            vec![id(0), id(2)]
        );
        assert_eq!(
            lists.members(&pages, TemporalUtility::ShortTerm),
            vec![id(1)]
        );
        assert_eq!(pages[1].list, Some(TemporalUtility::ShortTerm));
        lists.check_integrity(&pages);
    }

    #[test]
    fn test_append_to_same_list_moves_to_tail() {
        let mut pages = pages(3);
        let mut lists = EvictionLists::new();
        for n in 0..3 {
            lists.append(&mut pages, id(n), TemporalUtility::Unknown);
        }

        lists.append(&mut pages, id(0), TemporalUtility::Unknown);

        assert_eq!(
            lists.members(&pages, TemporalUtility::Unknown),
            vec![id(1), id(2), id(0)]
        );
        assert_eq!(lists.list(TemporalUtility::Unknown).len(), 3);
        lists.check_integrity(&pages);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut pages = pages(4);
        let mut lists = EvictionLists::new();
        for n in 0..4 {
            lists.append(&mut pages, id(n), TemporalUtility::LongTerm);
        }

        assert!(lists.remove(&mut pages, id(0)));
        assert!(lists.remove(&mut pages, id(2)));
        assert!(lists.remove(&mut pages, id(3)));

        let list = lists.list(TemporalUtility::LongTerm);
        assert_eq!(list.head(), Some(id(1)));
        assert_eq!(list.tail(), Some(id(1)));
        assert_eq!(list.len(), 1);
        assert!(!pages[0].is_linked());
        assert!(pages[0].prev.is_none() && pages[0].next.is_none());
        lists.check_integrity(&pages);

        assert!(lists.remove(&mut pages, id(1)));
        assert!(lists.list(TemporalUtility::LongTerm).is_empty());
        assert_eq!(lists.list(TemporalUtility::LongTerm).head(), None);
    }

    #[test]
    fn test_remove_detached_is_noop() {
        let mut pages = pages(2);
        let mut lists = EvictionLists::new();
        lists.append(&mut pages, id(0), TemporalUtility::Unknown);

        assert!(!lists.remove(&mut pages, id(1)));
        assert_eq!(lists.list(TemporalUtility::Unknown).len(), 1);
        lists.check_integrity(&pages);
    }
}
