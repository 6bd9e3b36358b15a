//! Log-format feature lookup.
//!
//! Older game clients did not emit every line the attribution heuristics rely
//! on. The engine asks this collaborator, per timestamp, whether a feature was
//! present in the log format of the time.

use pathlog_types::FeatureConfig;

use crate::log::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFeature {
    /// "Generating level N area" lines emitted on every zone entry
    ZoneGeneration,
}

/// Read-only answer to "did the log format support `feature` at `ts`".
pub trait FeatureLookup: Send + Sync {
    fn supports(&self, feature: LogFeature, ts: Timestamp) -> bool;
}

/// Feature availability keyed on the first timestamp each feature appeared.
#[derive(Debug, Clone, Default)]
pub struct FeatureTimeline {
    zone_generation_since: Option<Timestamp>,
}

impl FeatureTimeline {
    /// Timeline where every feature is always available.
    pub fn modern() -> Self {
        Self::default()
    }

    /// Timeline where zone generation only appears from `since` onwards.
    pub fn with_zone_generation_since(since: Timestamp) -> Self {
        Self {
            zone_generation_since: Some(since),
        }
    }

    pub fn from_config(config: &FeatureConfig) -> Self {
        Self {
            zone_generation_since: config.zone_generation_since,
        }
    }
}

impl FeatureLookup for FeatureTimeline {
    fn supports(&self, feature: LogFeature, ts: Timestamp) -> bool {
        match feature {
            LogFeature::ZoneGeneration => {
                self.zone_generation_since.is_none_or(|since| ts >= since)
            }
        }
    }
}
