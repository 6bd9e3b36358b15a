//! Character attribution state machine.
//!
//! Walks the raw events once and decides which owned character was active at
//! every point of the log. Most lines never name the active character, so
//! switches are inferred from three kinds of evidence:
//!
//! - **Creation**: the second level-up of a character always happens in the
//!   starting zone, so a level-2 level-up pins the creation time to the zone
//!   entry that preceded it.
//! - **Inferred switch**: an event for a different character means the player
//!   changed characters somewhere since the last attributed event. The switch
//!   is anchored on the latest hideout entry in that window, else the latest
//!   map entry.
//! - **Boundaries**: every switch emits a synthetic closing boundary for the
//!   outgoing character and an opening boundary for the incoming one, so each
//!   character's span is delimited in both the sequence and its level index.

use hashbrown::HashMap;

use crate::context::{FeatureLookup, LogFeature, ZoneLookup};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::AttributionError;
use crate::log::{CharacterEvent, LogEvent, Timestamp};

use super::classifier::ForeignSet;
use super::sequence::AttributionSequence;

/// Level-defining events (real level-ups and boundaries) per character.
pub type LevelIndex = HashMap<String, Vec<CharacterEvent>>;

/// Finished indices of one attribution pass.
#[derive(Debug, Clone, Default)]
pub struct Attribution {
    /// Every attributed event in timestamp order. Boundaries of characters
    /// purged from the level index stay in here but are inert.
    pub sequence: AttributionSequence,
    pub level_index: LevelIndex,
    /// First campaign-completion zone entry per character
    pub campaign_completion: HashMap<String, Timestamp>,
    pub foreign: ForeignSet,
}

/// Resumable attribution pass over a sorted event batch.
pub struct AttributionBuilder<'a> {
    events: &'a [LogEvent],
    foreign: ForeignSet,
    features: &'a dyn FeatureLookup,
    zones: &'a dyn ZoneLookup,
    cursor: usize,
    sequence: AttributionSequence,
    level_index: LevelIndex,
    campaign_completion: HashMap<String, Timestamp>,
    diagnostics: Diagnostics,
}

impl<'a> AttributionBuilder<'a> {
    pub fn new(
        events: &'a [LogEvent],
        foreign: ForeignSet,
        features: &'a dyn FeatureLookup,
        zones: &'a dyn ZoneLookup,
    ) -> Self {
        Self {
            events,
            foreign,
            features,
            zones,
            cursor: 0,
            sequence: AttributionSequence::new(),
            level_index: LevelIndex::new(),
            campaign_completion: HashMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Process up to `budget` events. Returns true once every event was seen.
    pub fn step(&mut self, budget: usize) -> Result<bool, AttributionError> {
        let events = self.events;
        let end = self.cursor.saturating_add(budget).min(events.len());
        while self.cursor < end {
            let index = self.cursor;
            self.process(index, &events[index])?;
            self.cursor += 1;
        }
        Ok(self.cursor >= events.len())
    }

    /// Close the active span and purge foreign names.
    pub fn finish(mut self) -> Result<(Attribution, Diagnostics), AttributionError> {
        while !self.step(usize::MAX)? {}

        if let (Some(active), Some(last_event)) = (self.active_character(), self.events.last()) {
            let (level, ascendancy) = self.current_level(&active).ok_or_else(|| {
                AttributionError::MissingLevelIndex {
                    character: active.clone(),
                }
            })?;
            let tail =
                CharacterEvent::boundary(last_event.ts(), &active, level, ascendancy.as_deref());
            self.level_index.entry(active).or_default().push(tail.clone());
            self.sequence.push(tail);
        }

        let foreign = &self.foreign;
        self.level_index.retain(|name, _| !foreign.contains(name));

        tracing::debug!(
            attributed = self.sequence.len(),
            characters = self.level_index.len(),
            "Attribution pass complete"
        );

        Ok((
            Attribution {
                sequence: self.sequence,
                level_index: self.level_index,
                campaign_completion: self.campaign_completion,
                foreign: self.foreign,
            },
            self.diagnostics,
        ))
    }

    fn process(&mut self, index: usize, event: &LogEvent) -> Result<(), AttributionError> {
        match event {
            LogEvent::HideoutEntered { ts, area } => {
                self.record_campaign_completion(*ts, area);
                Ok(())
            }
            LogEvent::LevelUp { .. } | LogEvent::Death { .. } | LogEvent::Chat { .. } => {
                let Some(attributed) = CharacterEvent::from_log_event(event) else {
                    return Ok(());
                };
                if self.foreign.contains(attributed.character()) {
                    return Ok(());
                }
                if matches!(attributed, CharacterEvent::LevelUp { level: 2, .. }) {
                    self.on_creation(index, attributed)
                } else {
                    self.on_character_event(index, attributed)
                }
            }
            LogEvent::MapEntered { .. }
            | LogEvent::JoinedArea { .. }
            | LogEvent::LeftArea { .. }
            | LogEvent::Whisper { .. }
            | LogEvent::AreaGenerated { .. }
            | LogEvent::Other { .. } => Ok(()),
        }
    }

    fn on_creation(&mut self, index: usize, event: CharacterEvent) -> Result<(), AttributionError> {
        let ts = event.ts();
        let name = event.character().to_string();

        let creation_ts = match self.nearest_map_entry(index) {
            Some(map_ts) => map_ts,
            None => {
                if self.features.supports(LogFeature::ZoneGeneration, ts) {
                    self.diagnostics.warn(Diagnostic::MissingCreationZone {
                        character: name.clone(),
                        ts,
                    });
                }
                ts - 1
            }
        };

        // Last creation wins for reused names
        if self.level_index.remove(&name).is_some() {
            self.diagnostics.warn(Diagnostic::CharacterNameReused {
                character: name.clone(),
                ts,
            });
        }

        let ascendancy = event.ascendancy().map(str::to_string);
        self.switch_to(index, creation_ts, &name, 1, ascendancy)?;
        self.record(event);
        Ok(())
    }

    fn on_character_event(
        &mut self,
        index: usize,
        event: CharacterEvent,
    ) -> Result<(), AttributionError> {
        let last = self
            .sequence
            .last()
            .map(|e| (e.character() == event.character(), e.ts()));
        let last_ts = match last {
            Some((true, _)) => {
                self.record(event);
                return Ok(());
            }
            Some((false, ts)) if self.sequence.len() >= 2 => ts,
            _ => {
                self.record(event);
                return Ok(());
            }
        };

        let name = event.character().to_string();
        let ts = event.ts();

        let Some(origin_ts) = self.find_origin(index, last_ts) else {
            if self.features.supports(LogFeature::ZoneGeneration, ts) {
                return Err(AttributionError::MissingOrigin { character: name, ts });
            }
            self.diagnostics
                .warn(Diagnostic::MissingOriginLegacy { character: name, ts });
            self.record(event);
            return Ok(());
        };

        let (level, ascendancy) = match self.current_level(&name) {
            Some(known) => known,
            None => match &event {
                CharacterEvent::LevelUp {
                    level, ascendancy, ..
                } => (level.saturating_sub(1).max(1), ascendancy.clone()),
                _ => {
                    self.diagnostics
                        .warn(Diagnostic::UnattributableEvent { character: name, ts });
                    return Ok(());
                }
            },
        };

        self.switch_to(index, origin_ts, &name, level, ascendancy)?;
        self.record(event);
        Ok(())
    }

    /// Hand attribution over to `name` at `switch_ts`.
    fn switch_to(
        &mut self,
        index: usize,
        switch_ts: Timestamp,
        name: &str,
        level: u8,
        ascendancy: Option<String>,
    ) -> Result<(), AttributionError> {
        let previous = self.active_character();

        // Last raw event before the switch, never looking past the cursor
        let before = &self.events[..index];
        let pos = before.partition_point(|e| e.ts() < switch_ts);
        let prev_ts = pos
            .checked_sub(1)
            .map_or(switch_ts - 1, |i| before[i].ts());

        // Only after a creation whose chat lines were attributed first
        let insert = self.sequence.last().is_some_and(|e| e.ts() > prev_ts);

        if let Some(previous) = previous {
            if previous == name {
                return Err(AttributionError::SelfSwitch {
                    character: previous,
                    ts: switch_ts,
                });
            }

            let last_level_ts = self
                .level_index
                .get(&previous)
                .and_then(|index| index.last())
                .map(CharacterEvent::ts);
            let (Some(last_level_ts), Some((prev_level, prev_ascendancy))) =
                (last_level_ts, self.current_level(&previous))
            else {
                return Err(AttributionError::MissingLevelIndex {
                    character: previous,
                });
            };
            if prev_ts < last_level_ts {
                return Err(AttributionError::SwitchBeforeLastLevel {
                    character: previous,
                    closing_ts: prev_ts,
                    last_level_ts,
                });
            }

            let closing = CharacterEvent::boundary(
                prev_ts,
                &previous,
                prev_level,
                prev_ascendancy.as_deref(),
            );
            self.level_index
                .entry(previous)
                .or_default()
                .push(closing.clone());
            self.place(closing, insert);
        }

        let opening = CharacterEvent::boundary(switch_ts, name, level, ascendancy.as_deref());
        self.level_index
            .entry(name.to_string())
            .or_default()
            .push(opening.clone());
        self.place(opening, insert);

        tracing::trace!(character = %name, ts = switch_ts, level, insert, "Character switch");
        Ok(())
    }

    fn place(&mut self, boundary: CharacterEvent, insert: bool) {
        if insert {
            self.sequence.insert_ordered(boundary);
        } else {
            self.sequence.push(boundary);
        }
    }

    fn record(&mut self, event: CharacterEvent) {
        if event.is_level_defining() {
            self.level_index
                .entry(event.character().to_string())
                .or_default()
                .push(event.clone());
        }
        self.sequence.push(event);
    }

    fn record_campaign_completion(&mut self, ts: Timestamp, area: &str) {
        if !self.zones.is_campaign_completion(area) {
            return;
        }
        let Some(last) = self.sequence.last() else {
            return;
        };
        self.campaign_completion
            .entry(last.character().to_string())
            .or_insert(ts);
    }

    /// Most recent attributed character that still owns a level index
    fn active_character(&self) -> Option<String> {
        self.sequence
            .iter()
            .rev()
            .find(|e| self.level_index.contains_key(e.character()))
            .map(|e| e.character().to_string())
    }

    /// Latest level and known ascendancy of a character
    fn current_level(&self, name: &str) -> Option<(u8, Option<String>)> {
        let index = self.level_index.get(name)?;
        let level = index.last()?.level()?;
        let ascendancy = index
            .iter()
            .rev()
            .find_map(CharacterEvent::ascendancy)
            .map(str::to_string);
        Some((level, ascendancy))
    }

    /// Backward linear scan: zone entries are not ordered by any key we can
    /// binary search on.
    fn nearest_map_entry(&self, index: usize) -> Option<Timestamp> {
        self.events[..index].iter().rev().find_map(|e| match e {
            LogEvent::MapEntered { ts, .. } => Some(*ts),
            _ => None,
        })
    }

    /// Zone entry that explains a switch after `last_ts`. Hideouts win over maps.
    fn find_origin(&self, index: usize, last_ts: Timestamp) -> Option<Timestamp> {
        let mut map_entry = None;
        for event in self.events[..index].iter().rev() {
            if event.ts() <= last_ts {
                break;
            }
            match event {
                LogEvent::HideoutEntered { ts, .. } => return Some(*ts),
                LogEvent::MapEntered { ts, .. } if map_entry.is_none() => map_entry = Some(*ts),
                _ => {}
            }
        }
        map_entry
    }
}
