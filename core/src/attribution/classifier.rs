//! Foreign-character classification.
//!
//! A client log mentions every character the account plays plus anyone
//! overheard in chat, seen dying, or joining the instance. This pass decides
//! which names do NOT belong to the account before attribution starts.
//!
//! Signals, strongest first:
//! - `JoinedArea` for a name: always foreign. The client never reports its own
//!   character joining.
//! - Level-ups under modern telemetry: a first observed level of 1-2 means the
//!   character was created in this log. A later start is accepted once two
//!   more contiguous level-ups follow; a skipped level means someone else.
//!   A late start that is never confirmed or contradicted stays undecided.
//! - Level-ups under legacy telemetry: too ambiguous, always foreign.
//! - Chat and deaths: foreign unless confirmed by the level-up rules.

use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::context::{FeatureLookup, LogFeature};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::log::LogEvent;

/// Contiguous level-ups needed to accept a character first seen above level 2
const CONTIGUOUS_LEVELS_TO_OWN: u8 = 2;

/// Highest first-observed level that counts as a fresh character
const CREATION_LEVEL_MAX: u8 = 2;

/// Names believed to belong to other accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ForeignSet {
    names: HashSet<String>,
}

impl ForeignSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names in sorted order, for stable output
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.iter().collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<String> for ForeignSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelTrack {
    Owned,
    Foreign,
    /// First seen above the creation level, waiting for contiguous level-ups
    Pending { last: u8, contiguous: u8 },
}

impl LevelTrack {
    fn first_seen(level: u8) -> Self {
        if level <= CREATION_LEVEL_MAX {
            Self::Owned
        } else {
            Self::Pending {
                last: level,
                contiguous: 0,
            }
        }
    }

    fn advance(self, level: u8) -> Self {
        match self {
            Self::Pending { last, contiguous } if level == last.saturating_add(1) => {
                let contiguous = contiguous + 1;
                if contiguous >= CONTIGUOUS_LEVELS_TO_OWN {
                    Self::Owned
                } else {
                    Self::Pending {
                        last: level,
                        contiguous,
                    }
                }
            }
            Self::Pending { .. } => Self::Foreign,
            settled => settled,
        }
    }
}

/// Resumable forward scan collecting the classification signals.
pub struct ForeignClassifier<'a> {
    events: &'a [LogEvent],
    features: &'a dyn FeatureLookup,
    cursor: usize,
    joined: HashSet<String>,
    maybe_foreign: HashSet<String>,
    legacy: HashSet<String>,
    level_tracks: HashMap<String, LevelTrack>,
}

impl<'a> ForeignClassifier<'a> {
    pub fn new(events: &'a [LogEvent], features: &'a dyn FeatureLookup) -> Self {
        Self {
            events,
            features,
            cursor: 0,
            joined: HashSet::new(),
            maybe_foreign: HashSet::new(),
            legacy: HashSet::new(),
            level_tracks: HashMap::new(),
        }
    }

    /// Classify a whole batch in one go.
    pub fn classify(
        events: &'a [LogEvent],
        features: &'a dyn FeatureLookup,
        diagnostics: &mut Diagnostics,
    ) -> ForeignSet {
        let mut classifier = Self::new(events, features);
        classifier.step(usize::MAX);
        classifier.finish(diagnostics)
    }

    /// Scan up to `budget` events. Returns true once every event was seen.
    pub fn step(&mut self, budget: usize) -> bool {
        let end = self.cursor.saturating_add(budget).min(self.events.len());
        let events = self.events;
        while self.cursor < end {
            self.observe(&events[self.cursor]);
            self.cursor += 1;
        }
        self.cursor >= self.events.len()
    }

    fn observe(&mut self, event: &LogEvent) {
        match event {
            LogEvent::JoinedArea { character, .. } => {
                self.joined.get_or_insert_with(character.as_str(), str::to_string);
            }
            LogEvent::LevelUp {
                ts,
                character,
                level,
                ..
            } => {
                if !self.features.supports(LogFeature::ZoneGeneration, *ts) {
                    self.legacy.get_or_insert_with(character.as_str(), str::to_string);
                    return;
                }
                match self.level_tracks.get_mut(character.as_str()) {
                    Some(track) => *track = track.advance(*level),
                    None => {
                        self.level_tracks
                            .insert(character.clone(), LevelTrack::first_seen(*level));
                    }
                }
            }
            LogEvent::Chat { character, .. } | LogEvent::Death { character, .. } => {
                self.maybe_foreign.get_or_insert_with(character.as_str(), str::to_string);
            }
            LogEvent::HideoutEntered { .. }
            | LogEvent::MapEntered { .. }
            | LogEvent::LeftArea { .. }
            | LogEvent::Whisper { .. }
            | LogEvent::AreaGenerated { .. }
            | LogEvent::Other { .. } => {}
        }
    }

    /// Resolve the collected signals into the foreign set.
    pub fn finish(self, diagnostics: &mut Diagnostics) -> ForeignSet {
        let mut foreign: HashSet<String> = self.joined;
        let mut owned: HashSet<String> = HashSet::new();

        for (name, track) in self.level_tracks {
            match track {
                LevelTrack::Owned => {
                    owned.insert(name);
                }
                LevelTrack::Foreign => {
                    foreign.insert(name);
                }
                // Neither confirmed nor contradicted; only chat or deaths can still mark it
                LevelTrack::Pending { .. } => {}
            }
        }

        foreign.extend(
            self.maybe_foreign
                .into_iter()
                .filter(|name| !owned.contains(name)),
        );

        let mut legacy: Vec<String> = self.legacy.into_iter().collect();
        legacy.sort_unstable();
        for name in legacy {
            if owned.contains(&name) {
                diagnostics.warn(Diagnostic::LegacyOwnedCharacter {
                    character: name.clone(),
                });
            }
            foreign.insert(name);
        }

        tracing::debug!(foreign = foreign.len(), owned = owned.len(), "Classified characters");
        ForeignSet { names: foreign }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FeatureTimeline;
    use crate::log::ChatChannel;

    fn level_up(ts: i64, name: &str, level: u8) -> LogEvent {
        LogEvent::LevelUp {
            ts,
            character: name.to_string(),
            ascendancy: None,
            level,
        }
    }

    fn chat(ts: i64, name: &str) -> LogEvent {
        LogEvent::Chat {
            ts,
            channel: ChatChannel::Local,
            character: name.to_string(),
            message: String::new(),
        }
    }

    fn classify(events: &[LogEvent], features: &FeatureTimeline) -> (ForeignSet, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let foreign = ForeignClassifier::classify(events, features, &mut diagnostics);
        (foreign, diagnostics)
    }

    #[test]
    fn test_fresh_character_is_owned() {
        let events = vec![level_up(1, "X", 2), chat(2, "X"), level_up(3, "X", 3)];
        let (foreign, diagnostics) = classify(&events, &FeatureTimeline::modern());
        assert!(!foreign.contains("X"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_level_jump_marks_foreign() {
        let events = vec![level_up(1, "Y", 5), level_up(2, "Y", 9)];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert!(foreign.contains("Y"));
    }

    #[test]
    fn test_contiguous_levels_after_late_start_are_owned() {
        let events = vec![
            level_up(1, "Z", 40),
            level_up(2, "Z", 41),
            level_up(3, "Z", 42),
            // Settled already; a later gap is not a signal anymore
            level_up(4, "Z", 50),
        ];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert!(!foreign.contains("Z"));
    }

    #[test]
    fn test_unconfirmed_late_start_is_not_foreign() {
        let events = vec![level_up(1, "Q", 70), level_up(2, "Q", 71)];
        let (foreign, diagnostics) = classify(&events, &FeatureTimeline::modern());
        assert!(!foreign.contains("Q"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unconfirmed_late_start_with_chat_is_foreign() {
        let events = vec![level_up(1, "Q", 70), chat(2, "Q"), level_up(3, "Q", 71)];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert!(foreign.contains("Q"));
    }

    #[test]
    fn test_repeated_chat_names_collected_once() {
        let events = vec![chat(1, "Talker"), chat(2, "Talker"), chat(3, "Talker")];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert_eq!(foreign.sorted(), vec!["Talker"]);
    }

    #[test]
    fn test_joined_area_always_foreign() {
        let events = vec![
            level_up(1, "Z", 2),
            level_up(2, "Z", 3),
            LogEvent::JoinedArea {
                ts: 3,
                character: "Z".to_string(),
            },
        ];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert!(foreign.contains("Z"));
    }

    #[test]
    fn test_overheard_chat_is_foreign() {
        let events = vec![
            level_up(1, "Mine", 2),
            chat(2, "Stranger"),
            LogEvent::Death {
                ts: 3,
                character: "Victim".to_string(),
            },
            chat(4, "Mine"),
        ];
        let (foreign, _) = classify(&events, &FeatureTimeline::modern());
        assert!(foreign.contains("Stranger"));
        assert!(foreign.contains("Victim"));
        assert!(!foreign.contains("Mine"));
    }

    #[test]
    fn test_legacy_level_ups_are_foreign() {
        let events = vec![level_up(1, "W", 2), level_up(2, "W", 3), level_up(3, "W", 4)];
        let (foreign, diagnostics) =
            classify(&events, &FeatureTimeline::with_zone_generation_since(1_000));
        assert!(foreign.contains("W"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_legacy_name_that_looked_owned_warns() {
        let events = vec![level_up(10, "W", 30), level_up(1_500, "W", 2)];
        let (foreign, diagnostics) =
            classify(&events, &FeatureTimeline::with_zone_generation_since(1_000));
        assert!(foreign.contains("W"));
        assert_eq!(
            diagnostics.entries(),
            &[Diagnostic::LegacyOwnedCharacter {
                character: "W".to_string()
            }]
        );
    }

    #[test]
    fn test_step_resumes_where_it_left_off() {
        let events = vec![
            level_up(1, "A", 2),
            chat(2, "B"),
            level_up(3, "C", 8),
            level_up(4, "C", 12),
        ];
        let features = FeatureTimeline::modern();
        let mut classifier = ForeignClassifier::new(&events, &features);
        assert!(!classifier.step(1));
        assert!(!classifier.step(2));
        assert!(classifier.step(1));
        let foreign = classifier.finish(&mut Diagnostics::new());
        assert_eq!(foreign.sorted(), vec!["B", "C"]);
    }
}
