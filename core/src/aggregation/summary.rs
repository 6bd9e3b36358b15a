use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;

use crate::attribution::{AttributionSequence, LevelIndex};
use crate::log::{CharacterEvent, Timestamp};

/// Snapshot of one owned character at the end of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSummary {
    pub name: String,
    pub level: u8,
    pub ascendancy: Option<String>,
    /// First attributed timestamp (the creation boundary for characters made in this log)
    pub created_at: Timestamp,
    pub campaign_completed_at: Option<Timestamp>,
    pub last_played_at: Timestamp,
}

impl CharacterSummary {
    /// Time between the first and last attributed event
    pub fn played_ms(&self) -> i64 {
        self.last_played_at - self.created_at
    }

    pub fn created_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    pub fn last_played_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_played_at)
    }
}

/// Build summaries for every character of the level index, ascending by last played.
pub(crate) fn summarize(
    sequence: &AttributionSequence,
    level_index: &LevelIndex,
    campaign_completion: &HashMap<String, Timestamp>,
) -> Vec<CharacterSummary> {
    let mut spans: HashMap<&str, (Timestamp, Timestamp)> = HashMap::new();
    for event in sequence {
        spans
            .entry(event.character())
            .and_modify(|(_, last)| *last = event.ts())
            .or_insert((event.ts(), event.ts()));
    }

    let mut summaries: Vec<CharacterSummary> = level_index
        .iter()
        .filter_map(|(name, index)| {
            let level = index.last()?.level()?;
            let (created_at, last_played_at) = spans.get(name.as_str()).copied()?;
            Some(CharacterSummary {
                name: name.clone(),
                level,
                ascendancy: index
                    .iter()
                    .rev()
                    .find_map(CharacterEvent::ascendancy)
                    .map(str::to_string),
                created_at,
                campaign_completed_at: campaign_completion.get(name).copied(),
                last_played_at,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.last_played_at
            .cmp(&b.last_played_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}
