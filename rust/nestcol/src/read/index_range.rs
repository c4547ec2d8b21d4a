//! Index ranges used to drive iteration over entries and collection elements.
//!
//! Both range types are plain values: constructing one never touches storage, and
//! every call to `into_iter()`/`iter()` starts a fresh pass from `start`.

use std::iter::FusedIterator;

use nestcol_format::ids::{ClusterId, ClusterIndex, LinearIndex};

/// Loops over global indexes (entries or collection elements) in `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalIndexRange {
    start: LinearIndex,
    end: LinearIndex,
}

impl GlobalIndexRange {
    /// Creates the range `[start, end)`. A range with `end < start` is empty.
    pub fn new(start: LinearIndex, end: LinearIndex) -> GlobalIndexRange {
        GlobalIndexRange {
            start,
            end: end.max(start),
        }
    }

    pub fn start(&self) -> LinearIndex {
        self.start
    }

    pub fn end(&self) -> LinearIndex {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: LinearIndex) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn iter(&self) -> GlobalIndexIter {
        GlobalIndexIter {
            next: self.start,
            end: self.end,
        }
    }
}

impl IntoIterator for GlobalIndexRange {
    type Item = LinearIndex;
    type IntoIter = GlobalIndexIter;

    fn into_iter(self) -> GlobalIndexIter {
        self.iter()
    }
}

impl IntoIterator for &GlobalIndexRange {
    type Item = LinearIndex;
    type IntoIter = GlobalIndexIter;

    fn into_iter(self) -> GlobalIndexIter {
        self.iter()
    }
}

/// Forward iterator over a [`GlobalIndexRange`].
#[derive(Debug, Clone)]
pub struct GlobalIndexIter {
    next: LinearIndex,
    end: LinearIndex,
}

impl Iterator for GlobalIndexIter {
    type Item = LinearIndex;

    #[inline]
    fn next(&mut self) -> Option<LinearIndex> {
        if self.next < self.end {
            let index = self.next;
            self.next += 1;
            Some(index)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining_hint(self.end - self.next)
    }
}

impl DoubleEndedIterator for GlobalIndexIter {
    fn next_back(&mut self) -> Option<LinearIndex> {
        if self.next < self.end {
            self.end -= 1;
            Some(self.end)
        } else {
            None
        }
    }
}

impl ExactSizeIterator for GlobalIndexIter {}

impl FusedIterator for GlobalIndexIter {}

/// Loops over the elements of collections within a single cluster, `[start, end)`.
///
/// The cluster id is fixed for the whole range; iteration never crosses into
/// another cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterIndexRange {
    cluster_id: ClusterId,
    start: u64,
    end: u64,
}

impl ClusterIndexRange {
    /// Creates the range `[start, end)` within `cluster_id`. A range with
    /// `end < start` is empty.
    pub fn new(cluster_id: ClusterId, start: u64, end: u64) -> ClusterIndexRange {
        ClusterIndexRange {
            cluster_id,
            start,
            end: end.max(start),
        }
    }

    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    pub fn start(&self) -> ClusterIndex {
        ClusterIndex::new(self.cluster_id, self.start)
    }

    pub fn end(&self) -> ClusterIndex {
        ClusterIndex::new(self.cluster_id, self.end)
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> ClusterIndexIter {
        ClusterIndexIter {
            cluster_id: self.cluster_id,
            next: self.start,
            end: self.end,
        }
    }
}

impl IntoIterator for ClusterIndexRange {
    type Item = ClusterIndex;
    type IntoIter = ClusterIndexIter;

    fn into_iter(self) -> ClusterIndexIter {
        self.iter()
    }
}

impl IntoIterator for &ClusterIndexRange {
    type Item = ClusterIndex;
    type IntoIter = ClusterIndexIter;

    fn into_iter(self) -> ClusterIndexIter {
        self.iter()
    }
}

/// Forward iterator over a [`ClusterIndexRange`].
#[derive(Debug, Clone)]
pub struct ClusterIndexIter {
    cluster_id: ClusterId,
    next: u64,
    end: u64,
}

impl Iterator for ClusterIndexIter {
    type Item = ClusterIndex;

    #[inline]
    fn next(&mut self) -> Option<ClusterIndex> {
        if self.next < self.end {
            let index = ClusterIndex::new(self.cluster_id, self.next);
            self.next += 1;
            Some(index)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining_hint(self.end - self.next)
    }
}

impl DoubleEndedIterator for ClusterIndexIter {
    fn next_back(&mut self) -> Option<ClusterIndex> {
        if self.next < self.end {
            self.end -= 1;
            Some(ClusterIndex::new(self.cluster_id, self.end))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for ClusterIndexIter {}

impl FusedIterator for ClusterIndexIter {}

/// Size hint for `remaining` indexes. Lengths beyond `usize::MAX` (possible on
/// 32-bit targets) saturate and report no upper bound.
fn remaining_hint(remaining: u64) -> (usize, Option<usize>) {
    match usize::try_from(remaining) {
        Ok(len) => (len, Some(len)),
        Err(_) => (usize::MAX, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_range_sequence() {
        let range = GlobalIndexRange::new(3, 8);
        assert_eq!(range.len(), 5);
        assert_eq!(range.into_iter().collect::<Vec<_>>(), [3, 4, 5, 6, 7]);
        // Restartable: a second pass yields the same sequence.
        assert_eq!(range.iter().collect::<Vec<_>>(), [3, 4, 5, 6, 7]);
        assert_eq!(range.iter().len(), 5);
    }

    #[test]
    fn test_global_range_empty() {
        let range = GlobalIndexRange::new(4, 4);
        assert!(range.is_empty());
        assert_eq!(range.iter().next(), None);

        let inverted = GlobalIndexRange::new(9, 2);
        assert!(inverted.is_empty());
        assert_eq!(inverted.iter().count(), 0);
    }

    #[test]
    fn test_global_range_for_loop() {
        let range = GlobalIndexRange::new(0, 100);
        let mut sum = 0;
        for i in &range {
            sum += i;
        }
        assert_eq!(sum, 4950);
        assert_eq!(range.iter().rev().next(), Some(99));
        assert!(range.contains(0));
        assert!(!range.contains(100));
    }

    #[test]
    fn test_global_range_lengths() {
        for start in 0..20u64 {
            for end in start..40u64 {
                let range = GlobalIndexRange::new(start, end);
                let items = range.iter().collect::<Vec<_>>();
                assert_eq!(items.len() as u64, end - start);
                assert!(items.iter().copied().eq(start..end));
            }
        }
    }

    #[test]
    fn test_cluster_range_sequence() {
        let cluster = ClusterId::new(7);
        let range = ClusterIndexRange::new(cluster, 2, 5);
        let items = range.iter().collect::<Vec<_>>();
        assert_eq!(
            items,
            [
                ClusterIndex::new(cluster, 2),
                ClusterIndex::new(cluster, 3),
                ClusterIndex::new(cluster, 4)
            ]
        );
        assert!(items.iter().all(|i| i.cluster_id() == cluster));
        assert_eq!(range.into_iter().collect::<Vec<_>>(), items);
        assert_eq!(range.start(), ClusterIndex::new(cluster, 2));
        assert_eq!(range.end(), ClusterIndex::new(cluster, 5));
    }

    #[test]
    fn test_cluster_range_empty() {
        let range = ClusterIndexRange::new(ClusterId::new(0), 6, 6);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().next(), None);
        assert_eq!(range.iter().next_back(), None);
    }

    #[test]
    fn test_size_hint() {
        let mut iter = GlobalIndexRange::new(10, 14).iter();
        iter.next();
        iter.next_back();
        assert_eq!(iter.size_hint(), (2, Some(2)));

        let mut iter = ClusterIndexRange::new(ClusterId::new(1), 0, 3).iter();
        iter.next();
        assert_eq!(iter.len(), 2);

        let wide = GlobalIndexRange::new(0, u64::MAX).iter().size_hint();
        if usize::BITS < u64::BITS {
            assert_eq!(wide, (usize::MAX, None));
        } else {
            assert_eq!(wide, (u64::MAX as usize, Some(u64::MAX as usize)));
        }
    }
}
