//! Static zone metadata lookup.
//!
//! Zones are indexed by area name as it appears in the client log. Only the
//! campaign-completion flag is consulted by the attribution builder; the rest
//! of the definition is carried for reporting.

use hashbrown::HashMap;
use pathlog_types::ZoneDefinition;

/// Read-only answer to "what do we know about this area".
pub trait ZoneLookup: Send + Sync {
    fn zone(&self, area_name: &str) -> Option<&ZoneDefinition>;

    /// Whether entering `area_name` means the campaign has been completed.
    /// Unknown areas never are.
    fn is_campaign_completion(&self, area_name: &str) -> bool {
        self.zone(area_name).is_some_and(|z| z.campaign_completion)
    }
}

/// Zone definitions keyed by area name.
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    zones: HashMap<String, ZoneDefinition>,
}

impl ZoneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from definitions, returns it with any duplicated names.
    /// Later definitions override earlier ones.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ZoneDefinition>,
    ) -> (Self, Vec<String>) {
        let mut index = Self::new();
        let mut duplicates = Vec::new();
        for def in definitions {
            if let Some(previous) = index.insert(def) {
                duplicates.push(previous.name);
            }
        }
        (index, duplicates)
    }

    /// Insert or replace a definition, returning the replaced one
    pub fn insert(&mut self, definition: ZoneDefinition) -> Option<ZoneDefinition> {
        self.zones.insert(definition.name.clone(), definition)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl ZoneLookup for ZoneIndex {
    fn zone(&self, area_name: &str) -> Option<&ZoneDefinition> {
        self.zones.get(area_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, campaign_completion: bool) -> ZoneDefinition {
        ZoneDefinition {
            name: name.to_string(),
            campaign_completion,
            ..Default::default()
        }
    }

    #[test]
    fn test_campaign_completion_lookup() {
        let (index, duplicates) = ZoneIndex::from_definitions([
            zone("Karui Shores", true),
            zone("Lioneye's Watch", false),
        ]);
        assert!(duplicates.is_empty());
        assert_eq!(index.len(), 2);
        assert!(index.is_campaign_completion("Karui Shores"));
        assert!(!index.is_campaign_completion("Lioneye's Watch"));
        assert!(!index.is_campaign_completion("Unknown Hideout"));
    }

    #[test]
    fn test_duplicate_definitions_override() {
        let (index, duplicates) = ZoneIndex::from_definitions([
            zone("Oriath", false),
            zone("Oriath", true),
        ]);
        assert_eq!(duplicates, vec!["Oriath".to_string()]);
        assert_eq!(index.len(), 1);
        assert!(index.is_campaign_completion("Oriath"));
    }
}
