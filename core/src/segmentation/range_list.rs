//! Normalized lists of inclusive timestamp ranges.

use serde::Serialize;

use crate::log::Timestamp;

/// Inclusive `[lo, hi]` timestamp interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRange {
    pub lo: Timestamp,
    pub hi: Timestamp,
}

impl TimeRange {
    pub fn new(lo: Timestamp, hi: Timestamp) -> Self {
        Self {
            lo: lo.min(hi),
            hi: lo.max(hi),
        }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.lo <= ts && ts <= self.hi
    }

    pub fn duration(&self) -> i64 {
        self.hi - self.lo
    }

    /// Overlapping or directly adjacent on the millisecond grid
    fn touches(&self, other: &TimeRange) -> bool {
        other.lo <= self.hi.saturating_add(1) && self.lo <= other.hi.saturating_add(1)
    }
}

/// Sorted set of disjoint ranges. Overlapping and adjacent ranges are
/// coalesced on insertion, so the list is always normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RangeList {
    ranges: Vec<TimeRange>,
}

impl RangeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = TimeRange>) -> Self {
        let mut list = Self {
            ranges: ranges.into_iter().collect(),
        };
        list.normalize();
        list
    }

    /// Add a range, merging it with any range it touches.
    pub fn push(&mut self, range: TimeRange) {
        match self.ranges.last_mut() {
            None => self.ranges.push(range),
            Some(last) if range.lo >= last.lo && last.touches(&range) => {
                last.hi = last.hi.max(range.hi);
            }
            Some(last) if range.lo > last.hi => self.ranges.push(range),
            Some(_) => {
                self.ranges.push(range);
                self.normalize();
            }
        }
    }

    /// Merge every range of `other` into this list
    pub fn extend_from(&mut self, other: &RangeList) {
        if other.ranges.is_empty() {
            return;
        }
        self.ranges.extend_from_slice(&other.ranges);
        self.normalize();
    }

    pub fn union(&self, other: &RangeList) -> RangeList {
        let mut merged = self.clone();
        merged.extend_from(other);
        merged
    }

    /// Sort by `lo` and coalesce overlapping or adjacent ranges.
    pub fn normalize(&mut self) {
        if self.ranges.len() < 2 {
            return;
        }
        self.ranges.sort_by_key(|r| (r.lo, r.hi));
        let mut merged: Vec<TimeRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if last.touches(&range) => last.hi = last.hi.max(range.hi),
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        let pos = self.ranges.partition_point(|r| r.lo <= ts);
        pos > 0 && self.ranges[pos - 1].contains(ts)
    }

    /// Sum of `hi - lo` over all ranges
    pub fn total_duration(&self) -> i64 {
        self.ranges.iter().map(TimeRange::duration).sum()
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn first(&self) -> Option<&TimeRange> {
        self.ranges.first()
    }

    pub fn last(&self) -> Option<&TimeRange> {
        self.ranges.last()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(lo: i64, hi: i64) -> TimeRange {
        TimeRange::new(lo, hi)
    }

    #[test]
    fn test_push_merges_overlapping_and_adjacent() {
        let mut list = RangeList::new();
        list.push(r(0, 10));
        list.push(r(5, 20));
        list.push(r(21, 30));
        list.push(r(40, 50));
        assert_eq!(list.ranges(), &[r(0, 30), r(40, 50)]);
    }

    #[test]
    fn test_push_out_of_order_renormalizes() {
        let mut list = RangeList::new();
        list.push(r(100, 200));
        list.push(r(10, 20));
        list.push(r(15, 99));
        assert_eq!(list.ranges(), &[r(10, 200)]);
    }

    #[test]
    fn test_from_ranges_sorts_and_coalesces() {
        let list = RangeList::from_ranges([r(50, 60), r(0, 5), r(3, 8), r(70, 70)]);
        assert_eq!(list.ranges(), &[r(0, 8), r(50, 60), r(70, 70)]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = RangeList::from_ranges([r(9, 12), r(0, 4), r(4, 6), r(30, 31)]);
        let mut twice = once.clone();
        twice.normalize();
        assert_eq!(once, twice);
        assert_eq!(RangeList::from_ranges(once.ranges().iter().copied()), once);
    }

    #[test]
    fn test_contains_and_duration() {
        let list = RangeList::from_ranges([r(0, 10), r(20, 25)]);
        assert!(list.contains(0));
        assert!(list.contains(10));
        assert!(!list.contains(15));
        assert!(list.contains(25));
        assert!(!list.contains(26));
        assert!(!list.contains(-1));
        assert_eq!(list.total_duration(), 15);
    }

    #[test]
    fn test_union() {
        let a = RangeList::from_ranges([r(0, 10), r(40, 50)]);
        let b = RangeList::from_ranges([r(11, 20), r(60, 70)]);
        let u = a.union(&b);
        assert_eq!(u.ranges(), &[r(0, 20), r(40, 50), r(60, 70)]);
        assert_eq!(a.union(&RangeList::new()), a);
    }

    #[test]
    fn test_time_range_orders_endpoints() {
        assert_eq!(TimeRange::new(9, 3), r(3, 9));
    }
}
