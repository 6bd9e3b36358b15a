//! Derive level segmentation from a finished attribution.

use hashbrown::HashMap;

use crate::attribution::{AttributionSequence, LevelIndex};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::AttributionError;
use crate::log::CharacterEvent;

use super::{LevelSegmentation, TimeRange};

pub type SegmentationIndex = HashMap<String, LevelSegmentation>;

/// Split the attribution into per-character, per-level time ranges.
///
/// Each maximal run of same-character events becomes one or more ranges,
/// cut wherever a level-defining event changes the level. Characters without
/// a level index (foreign, or never leveled) are skipped.
pub fn build_segmentation(
    sequence: &AttributionSequence,
    level_index: &LevelIndex,
    diagnostics: &mut Diagnostics,
) -> Result<SegmentationIndex, AttributionError> {
    let events: Vec<&CharacterEvent> = sequence
        .iter()
        .filter(|e| level_index.contains_key(e.character()))
        .collect();

    let mut segmentation = SegmentationIndex::new();
    let mut last_level: HashMap<&str, u8> = HashMap::new();

    let mut start = 0;
    while start < events.len() {
        let name = events[start].character();
        let run_len = events[start..]
            .iter()
            .take_while(|e| e.character() == name)
            .count();
        let run = &events[start..start + run_len];

        let mut level = governing_level(run[0], last_level.get(name).copied(), level_index)?;
        let mut lo = run[0].ts();
        let seg = segmentation.entry(name.to_string()).or_default();

        for event in run {
            let Some(event_level) = event.level() else {
                continue;
            };
            if event_level != level {
                seg.push(level, TimeRange::new(lo, event.ts()));
                level = event_level;
                lo = event.ts();
            }
            last_level.insert(name, event_level);
        }
        seg.push(level, TimeRange::new(lo, run[run_len - 1].ts()));

        start += run_len;
    }

    check_segmentation(&segmentation, level_index, diagnostics);
    Ok(segmentation)
}

/// Level in effect at the first event of a run
fn governing_level(
    first: &CharacterEvent,
    previously_seen: Option<u8>,
    level_index: &LevelIndex,
) -> Result<u8, AttributionError> {
    if let Some(level) = first.level().or(previously_seen) {
        return Ok(level);
    }
    // Log starts mid-level: one below the first level we will see
    level_index
        .get(first.character())
        .and_then(|index| index.iter().find_map(CharacterEvent::level))
        .map(|level| level.saturating_sub(1).max(1))
        .ok_or_else(|| AttributionError::UndeterminedLevel {
            character: first.character().to_string(),
            ts: first.ts(),
        })
}

/// Report level gaps and level-ups that landed outside their own level.
fn check_segmentation(
    segmentation: &SegmentationIndex,
    level_index: &LevelIndex,
    diagnostics: &mut Diagnostics,
) {
    let mut names: Vec<&String> = segmentation.keys().collect();
    names.sort_unstable();

    for name in names {
        let seg = &segmentation[name];

        if let Some((lowest, highest)) = seg.level_bounds() {
            for level in lowest..=highest {
                if seg.get(level).is_empty() {
                    diagnostics.warn(Diagnostic::SegmentationGap {
                        character: name.clone(),
                        level,
                    });
                }
            }
        }

        let Some(index) = level_index.get(name) else {
            continue;
        };
        for event in index {
            if let CharacterEvent::LevelUp { ts, level, .. } = event
                && !seg.get(*level).contains(*ts)
            {
                diagnostics.warn(Diagnostic::UnmatchedLevelUp {
                    character: name.clone(),
                    level: *level,
                    ts: *ts,
                });
            }
        }
    }
}
