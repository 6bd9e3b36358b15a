//! Per-character, per-level time segmentation.
//!
//! For every owned character the segmentation holds, for each level 1..=100,
//! the normalized set of time ranges during which the character was active at
//! that level.

mod builder;
mod range_list;

pub use builder::{SegmentationIndex, build_segmentation};
pub use range_list::{RangeList, TimeRange};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;

/// Range lists indexed by level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSegmentation {
    levels: Vec<RangeList>,
}

impl Default for LevelSegmentation {
    fn default() -> Self {
        Self {
            levels: vec![RangeList::new(); MAX_LEVEL as usize],
        }
    }
}

impl LevelSegmentation {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(level: u8) -> usize {
        (level.clamp(MIN_LEVEL, MAX_LEVEL) - MIN_LEVEL) as usize
    }

    pub fn get(&self, level: u8) -> &RangeList {
        &self.levels[Self::slot(level)]
    }

    pub fn push(&mut self, level: u8, range: TimeRange) {
        self.levels[Self::slot(level)].push(range);
    }

    /// Levels with at least one range, ascending
    pub fn populated(&self) -> impl Iterator<Item = (u8, &RangeList)> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(i, list)| (i as u8 + MIN_LEVEL, list))
    }

    /// Lowest and highest populated level
    pub fn level_bounds(&self) -> Option<(u8, u8)> {
        let mut populated = self.populated().map(|(level, _)| level);
        let first = populated.next()?;
        let last = populated.last().unwrap_or(first);
        Some((first, last))
    }

    /// Union of the ranges of every level in `from..=to`
    pub fn window(&self, from: u8, to: u8) -> RangeList {
        let (from, to) = (from.clamp(MIN_LEVEL, MAX_LEVEL), to.clamp(MIN_LEVEL, MAX_LEVEL));
        let mut merged = RangeList::new();
        if from > to {
            return merged;
        }
        for list in &self.levels[Self::slot(from)..=Self::slot(to)] {
            merged.extend_from(list);
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_merges_levels() {
        let mut seg = LevelSegmentation::new();
        seg.push(1, TimeRange::new(0, 10));
        seg.push(2, TimeRange::new(10, 20));
        seg.push(3, TimeRange::new(20, 30));
        seg.push(5, TimeRange::new(100, 110));

        assert_eq!(seg.window(1, 3).ranges(), &[TimeRange::new(0, 30)]);
        assert_eq!(seg.window(2, 2).ranges(), &[TimeRange::new(10, 20)]);
        assert_eq!(seg.window(1, 100).len(), 2);
        assert!(seg.window(4, 4).is_empty());
        assert!(seg.window(9, 3).is_empty());
    }

    #[test]
    fn test_level_bounds_and_populated() {
        let mut seg = LevelSegmentation::new();
        assert_eq!(seg.level_bounds(), None);
        seg.push(12, TimeRange::new(0, 1));
        assert_eq!(seg.level_bounds(), Some((12, 12)));
        seg.push(100, TimeRange::new(5, 6));
        assert_eq!(seg.level_bounds(), Some((12, 100)));

        let levels: Vec<u8> = seg.populated().map(|(level, _)| level).collect();
        assert_eq!(levels, vec![12, 100]);
    }
}
