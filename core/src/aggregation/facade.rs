//! Read-only queries over a finished build.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::attribution::{Attribution, AttributionSequence, ForeignSet, LevelIndex};
use crate::error::AttributionError;
use crate::log::{CharacterEvent, Timestamp};
use crate::segmentation::{LevelSegmentation, MAX_LEVEL, MIN_LEVEL, RangeList, SegmentationIndex};

use super::summary::{CharacterSummary, summarize};

/// Immutable query surface over the attribution, level and segmentation
/// indices. Every lookup is a binary search; nothing here mutates.
#[derive(Debug, Clone, Default)]
pub struct CharacterAggregation {
    /// Attribution sequence restricted to owned characters
    sequence: AttributionSequence,
    level_index: LevelIndex,
    segmentation: SegmentationIndex,
    campaign_completion: HashMap<String, Timestamp>,
    foreign: ForeignSet,
    summaries: Vec<CharacterSummary>,
}

impl CharacterAggregation {
    pub fn new(attribution: Attribution, segmentation: SegmentationIndex) -> Self {
        let Attribution {
            sequence,
            level_index,
            campaign_completion,
            foreign,
        } = attribution;

        let sequence = sequence.filtered(|name| level_index.contains_key(name));
        let summaries = summarize(&sequence, &level_index, &campaign_completion);

        Self {
            sequence,
            level_index,
            segmentation,
            campaign_completion,
            foreign,
            summaries,
        }
    }

    pub fn is_owned(&self, name: &str) -> bool {
        self.level_index.contains_key(name)
    }

    /// Last attributed event at or before `ts`
    pub fn guess_any_event(&self, ts: Timestamp) -> Option<&CharacterEvent> {
        self.sequence.latest_at(ts)
    }

    /// Last level-defining event at or before `ts` for whoever was active then
    pub fn guess_level_event(
        &self,
        ts: Timestamp,
    ) -> Result<Option<&CharacterEvent>, AttributionError> {
        let Some(active) = self.guess_any_event(ts) else {
            return Ok(None);
        };
        let index = self.level_index.get(active.character()).ok_or_else(|| {
            AttributionError::MissingLevelIndex {
                character: active.character().to_string(),
            }
        })?;
        let pos = index.partition_point(|e| e.ts() <= ts);
        Ok(pos.checked_sub(1).map(|i| &index[i]))
    }

    /// Level of the active character at `ts`, 1 before any data
    pub fn guess_level(&self, ts: Timestamp) -> Result<u8, AttributionError> {
        Ok(self
            .guess_level_event(ts)?
            .and_then(CharacterEvent::level)
            .unwrap_or(MIN_LEVEL))
    }

    /// Time ranges spent within a level window, for one character or merged
    /// across all owned characters. Unknown characters yield an empty list.
    pub fn guess_segmentation(
        &self,
        level_from: Option<u8>,
        level_to: Option<u8>,
        character: Option<&str>,
    ) -> RangeList {
        let from = level_from.unwrap_or(MIN_LEVEL);
        let to = level_to.unwrap_or(MAX_LEVEL);
        match character {
            Some(name) => self
                .segmentation
                .get(name)
                .map(|seg| seg.window(from, to))
                .unwrap_or_default(),
            None => {
                let mut merged = RangeList::new();
                for seg in self.segmentation.values() {
                    merged.extend_from(&seg.window(from, to));
                }
                merged
            }
        }
    }

    /// Per-character segmentation over a level window. Defaults to every
    /// owned character.
    pub fn guess_segmentations(
        &self,
        level_from: Option<u8>,
        level_to: Option<u8>,
        characters: Option<&[&str]>,
    ) -> BTreeMap<String, RangeList> {
        let names: Vec<&str> = match characters {
            Some(names) => names.to_vec(),
            None => self.owned_characters().collect(),
        };
        names
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    self.guess_segmentation(level_from, level_to, Some(name)),
                )
            })
            .collect()
    }

    /// Character summaries, ascending by last played
    pub fn summaries(&self) -> &[CharacterSummary] {
        &self.summaries
    }

    pub fn summary(&self, name: &str) -> Option<&CharacterSummary> {
        self.summaries.iter().find(|s| s.name == name)
    }

    /// Owned character names, ascending by last played
    pub fn owned_characters(&self) -> impl Iterator<Item = &str> {
        self.summaries.iter().map(|s| s.name.as_str())
    }

    pub fn foreign(&self) -> &ForeignSet {
        &self.foreign
    }

    pub fn sequence(&self) -> &AttributionSequence {
        &self.sequence
    }

    pub fn level_events(&self, name: &str) -> Option<&[CharacterEvent]> {
        self.level_index.get(name).map(Vec::as_slice)
    }

    pub fn segmentation(&self, name: &str) -> Option<&LevelSegmentation> {
        self.segmentation.get(name)
    }

    pub fn campaign_completed_at(&self, name: &str) -> Option<Timestamp> {
        self.campaign_completion.get(name).copied()
    }
}
