//! Soft anomalies collected during a build.
//!
//! Every anomaly is both logged through `tracing` and recorded here so callers
//! and tests can inspect them after the build.

use serde::Serialize;

use crate::log::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A legacy-format name had also looked owned under modern telemetry
    LegacyOwnedCharacter { character: String },
    /// Level-2 level-up without a preceding zone entry under modern telemetry
    MissingCreationZone { character: String, ts: Timestamp },
    /// A character name was created again; the earlier index was discarded
    CharacterNameReused { character: String, ts: Timestamp },
    /// Switch inferred without a zone entry under legacy telemetry
    MissingOriginLegacy { character: String, ts: Timestamp },
    /// Event for a character with no known level
    UnattributableEvent { character: String, ts: Timestamp },
    /// A level between a character's lowest and highest has no range
    SegmentationGap { character: String, level: u8 },
    /// A real level-up not covered by any range for its level
    UnmatchedLevelUp {
        character: String,
        level: u8,
        ts: Timestamp,
    },
}

impl Diagnostic {
    pub fn character(&self) -> &str {
        match self {
            Self::LegacyOwnedCharacter { character }
            | Self::MissingCreationZone { character, .. }
            | Self::CharacterNameReused { character, .. }
            | Self::MissingOriginLegacy { character, .. }
            | Self::UnattributableEvent { character, .. }
            | Self::SegmentationGap { character, .. }
            | Self::UnmatchedLevelUp { character, .. } => character,
        }
    }
}

/// Ordered list of anomalies for one build.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an anomaly and log it as a warning
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::LegacyOwnedCharacter { character } => {
                tracing::warn!(
                    character = %character,
                    "Legacy-format character looked owned, treating as foreign"
                );
            }
            Diagnostic::MissingCreationZone { character, ts } => {
                tracing::warn!(
                    character = %character, ts,
                    "No zone entry before creation level-up"
                );
            }
            Diagnostic::CharacterNameReused { character, ts } => {
                tracing::warn!(
                    character = %character, ts,
                    "Character name reused, discarding earlier level index"
                );
            }
            Diagnostic::MissingOriginLegacy { character, ts } => {
                tracing::warn!(
                    character = %character, ts,
                    "No zone entry before legacy character switch"
                );
            }
            Diagnostic::UnattributableEvent { character, ts } => {
                tracing::warn!(
                    character = %character, ts,
                    "Cannot infer level for event, skipping"
                );
            }
            Diagnostic::SegmentationGap { character, level } => {
                tracing::warn!(character = %character, level, "Gap in level segmentation");
            }
            Diagnostic::UnmatchedLevelUp { character, level, ts } => {
                tracing::warn!(
                    character = %character, level, ts,
                    "Level-up outside its level segmentation"
                );
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics concerning a single character
    pub fn for_character<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.character() == name)
    }
}
