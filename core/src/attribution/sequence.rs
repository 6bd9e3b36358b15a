//! Timestamp-ordered list of attributed events.
//!
//! New events are normally appended at the tail. Boundaries that belong to
//! the past (a character created after its first chat lines were already
//! attributed) go through [`AttributionSequence::insert_ordered`] instead.

use serde::Serialize;

use crate::log::{CharacterEvent, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributionSequence {
    events: Vec<CharacterEvent>,
}

impl AttributionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. The event must not precede the current tail.
    pub fn push(&mut self, event: CharacterEvent) {
        debug_assert!(
            self.events.last().is_none_or(|last| last.ts() <= event.ts()),
            "append would break timestamp order"
        );
        self.events.push(event);
    }

    /// Insert after every event with a timestamp at or before the new one.
    /// Returns the position the event landed at.
    pub fn insert_ordered(&mut self, event: CharacterEvent) -> usize {
        let ts = event.ts();
        let pos = self.events.partition_point(|e| e.ts() <= ts);
        self.events.insert(pos, event);
        pos
    }

    /// Last event at or before `ts`
    pub fn latest_at(&self, ts: Timestamp) -> Option<&CharacterEvent> {
        let pos = self.events.partition_point(|e| e.ts() <= ts);
        pos.checked_sub(1).map(|i| &self.events[i])
    }

    /// Copy keeping only the events whose character passes `keep`
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            events: self
                .events
                .iter()
                .filter(|e| keep(e.character()))
                .cloned()
                .collect(),
        }
    }

    pub fn last(&self) -> Option<&CharacterEvent> {
        self.events.last()
    }

    pub fn events(&self) -> &[CharacterEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CharacterEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a AttributionSequence {
    type Item = &'a CharacterEvent;
    type IntoIter = std::slice::Iter<'a, CharacterEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::ChatChannel;

    fn chat(ts: i64, name: &str) -> CharacterEvent {
        CharacterEvent::Chat {
            ts,
            character: name.to_string(),
            channel: ChatChannel::Local,
        }
    }

    #[test]
    fn test_insert_ordered_places_before_later_events() {
        let mut seq = AttributionSequence::new();
        seq.push(chat(10, "A"));
        seq.push(chat(60, "X"));

        let pos = seq.insert_ordered(CharacterEvent::boundary(40, "A", 5, None));
        assert_eq!(pos, 1);
        let pos = seq.insert_ordered(CharacterEvent::boundary(50, "X", 1, None));
        assert_eq!(pos, 2);

        let ts: Vec<i64> = seq.iter().map(CharacterEvent::ts).collect();
        assert_eq!(ts, vec![10, 40, 50, 60]);
        assert_eq!(seq.last().map(CharacterEvent::character), Some("X"));
    }

    #[test]
    fn test_insert_ordered_goes_after_equal_timestamps() {
        let mut seq = AttributionSequence::new();
        seq.push(chat(10, "A"));
        seq.push(chat(20, "A"));

        let pos = seq.insert_ordered(CharacterEvent::boundary(10, "A", 3, None));
        assert_eq!(pos, 1);
        assert!(seq.events()[1].is_boundary());

        // Inserting past the tail behaves like an append
        let pos = seq.insert_ordered(chat(30, "B"));
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_latest_at() {
        let mut seq = AttributionSequence::new();
        seq.push(chat(10, "A"));
        seq.push(chat(20, "B"));

        assert!(seq.latest_at(9).is_none());
        assert_eq!(seq.latest_at(10).map(|e| e.character()), Some("A"));
        assert_eq!(seq.latest_at(19).map(|e| e.character()), Some("A"));
        assert_eq!(seq.latest_at(500).map(|e| e.character()), Some("B"));
    }

    #[test]
    fn test_filtered() {
        let mut seq = AttributionSequence::new();
        seq.push(chat(1, "A"));
        seq.push(chat(2, "B"));
        seq.push(chat(3, "A"));

        let only_a = seq.filtered(|name| name == "A");
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|e| e.character() == "A"));
    }
}
