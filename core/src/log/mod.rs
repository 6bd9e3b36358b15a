//! Typed log events consumed by the attribution engine.
//!
//! Raw client log lines are parsed upstream; this module only defines the
//! finished event shapes. Timestamps are milliseconds and must be
//! non-decreasing across a batch.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    Local,
    Party,
    Guild,
}

/// A single parsed client log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEvent {
    Chat {
        ts: Timestamp,
        channel: ChatChannel,
        character: String,
        #[serde(default)]
        message: String,
    },
    LevelUp {
        ts: Timestamp,
        character: String,
        #[serde(default)]
        ascendancy: Option<String>,
        level: u8,
    },
    Death {
        ts: Timestamp,
        character: String,
    },
    HideoutEntered {
        ts: Timestamp,
        area: String,
    },
    MapEntered {
        ts: Timestamp,
        area: String,
    },
    /// Another player joined the current instance
    JoinedArea {
        ts: Timestamp,
        character: String,
    },

    // Kinds the attribution engine passes through untouched
    LeftArea {
        ts: Timestamp,
        character: String,
    },
    Whisper {
        ts: Timestamp,
        character: String,
        #[serde(default)]
        message: String,
    },
    AreaGenerated {
        ts: Timestamp,
        area_level: u8,
        #[serde(default)]
        seed: u64,
    },
    Other {
        ts: Timestamp,
    },
}

impl LogEvent {
    pub fn ts(&self) -> Timestamp {
        match self {
            Self::Chat { ts, .. }
            | Self::LevelUp { ts, .. }
            | Self::Death { ts, .. }
            | Self::HideoutEntered { ts, .. }
            | Self::MapEntered { ts, .. }
            | Self::JoinedArea { ts, .. }
            | Self::LeftArea { ts, .. }
            | Self::Whisper { ts, .. }
            | Self::AreaGenerated { ts, .. }
            | Self::Other { ts } => *ts,
        }
    }
}

/// An event attributed to a character, real or synthetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CharacterEvent {
    LevelUp {
        ts: Timestamp,
        character: String,
        ascendancy: Option<String>,
        level: u8,
    },
    Death {
        ts: Timestamp,
        character: String,
    },
    Chat {
        ts: Timestamp,
        character: String,
        channel: ChatChannel,
    },
    /// Fabricated marker where attribution switches between characters
    Boundary {
        ts: Timestamp,
        character: String,
        level: u8,
        ascendancy: Option<String>,
    },
}

impl CharacterEvent {
    /// Lift the character-carrying subset of log events.
    pub fn from_log_event(event: &LogEvent) -> Option<Self> {
        match event {
            LogEvent::LevelUp {
                ts,
                character,
                ascendancy,
                level,
            } => Some(Self::LevelUp {
                ts: *ts,
                character: character.clone(),
                ascendancy: ascendancy.clone(),
                level: *level,
            }),
            LogEvent::Death { ts, character } => Some(Self::Death {
                ts: *ts,
                character: character.clone(),
            }),
            LogEvent::Chat {
                ts,
                channel,
                character,
                ..
            } => Some(Self::Chat {
                ts: *ts,
                character: character.clone(),
                channel: *channel,
            }),
            _ => None,
        }
    }

    pub fn boundary(ts: Timestamp, character: &str, level: u8, ascendancy: Option<&str>) -> Self {
        Self::Boundary {
            ts,
            character: character.to_string(),
            level,
            ascendancy: ascendancy.map(str::to_string),
        }
    }

    pub fn ts(&self) -> Timestamp {
        match self {
            Self::LevelUp { ts, .. }
            | Self::Death { ts, .. }
            | Self::Chat { ts, .. }
            | Self::Boundary { ts, .. } => *ts,
        }
    }

    pub fn character(&self) -> &str {
        match self {
            Self::LevelUp { character, .. }
            | Self::Death { character, .. }
            | Self::Chat { character, .. }
            | Self::Boundary { character, .. } => character,
        }
    }

    /// Level carried by level-defining events (real level-ups and boundaries).
    pub fn level(&self) -> Option<u8> {
        match self {
            Self::LevelUp { level, .. } | Self::Boundary { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn ascendancy(&self) -> Option<&str> {
        match self {
            Self::LevelUp { ascendancy, .. } | Self::Boundary { ascendancy, .. } => {
                ascendancy.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_level_defining(&self) -> bool {
        self.level().is_some()
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_events() {
        let json = r#"[
            {"kind": "map_entered", "ts": 50, "area": "The Twilight Strand"},
            {"kind": "level_up", "ts": 100, "character": "Ranger_X", "level": 2},
            {"kind": "chat", "ts": 120, "channel": "party", "character": "Other", "message": "hi"},
            {"kind": "other", "ts": 130}
        ]"#;

        let events: Vec<LogEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].ts(), 50);
        assert_eq!(
            events[1],
            LogEvent::LevelUp {
                ts: 100,
                character: "Ranger_X".to_string(),
                ascendancy: None,
                level: 2,
            }
        );
        assert!(matches!(
            events[2],
            LogEvent::Chat {
                channel: ChatChannel::Party,
                ..
            }
        ));
    }

    #[test]
    fn test_character_event_lifts_only_named_kinds() {
        let death = LogEvent::Death {
            ts: 10,
            character: "A".to_string(),
        };
        let map = LogEvent::MapEntered {
            ts: 11,
            area: "Lioneye's Watch".to_string(),
        };
        let joined = LogEvent::JoinedArea {
            ts: 12,
            character: "B".to_string(),
        };

        let lifted = CharacterEvent::from_log_event(&death).unwrap();
        assert_eq!(lifted.character(), "A");
        assert_eq!(lifted.level(), None);
        assert!(CharacterEvent::from_log_event(&map).is_none());
        assert!(CharacterEvent::from_log_event(&joined).is_none());
    }

    #[test]
    fn test_boundary_is_level_defining() {
        let b = CharacterEvent::boundary(5, "A", 12, Some("Juggernaut"));
        assert!(b.is_boundary());
        assert!(b.is_level_defining());
        assert_eq!(b.level(), Some(12));
        assert_eq!(b.ascendancy(), Some("Juggernaut"));
    }
}
