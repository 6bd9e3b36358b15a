//! Shared configuration types for pathlog.
//!
//! These types are deserialized from the engine's TOML configuration file and
//! shared between the core engine and the worker binary.

pub mod formatting;

use serde::{Deserialize, Serialize};

/// Default number of events processed per cooperative work unit.
pub const DEFAULT_WORK_UNIT: usize = 4096;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub build: BuildSettings,

    /// Static zone metadata, one entry per area name
    #[serde(default, rename = "zone")]
    pub zones: Vec<ZoneDefinition>,
}

/// First timestamps (milliseconds since epoch) at which the game client
/// started emitting a given log feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Zone-generation telemetry ("Generating level N area ...").
    /// `None` means every log is treated as modern.
    #[serde(default)]
    pub zone_generation_since: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Events processed before the async driver yields back to the runtime
    #[serde(default = "default_work_unit")]
    pub work_unit: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            work_unit: DEFAULT_WORK_UNIT,
        }
    }
}

fn default_work_unit() -> usize {
    DEFAULT_WORK_UNIT
}

/// Static attributes of a single zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub name: String,

    /// Campaign act the zone belongs to, if any
    #[serde(default)]
    pub act: Option<u8>,

    #[serde(default)]
    pub area_level: Option<u8>,

    #[serde(default)]
    pub town: bool,

    #[serde(default)]
    pub hideout: bool,

    /// Entering this zone means the campaign has been completed
    #[serde(default)]
    pub campaign_completion: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_config() {
        let toml = r#"
[features]
zone_generation_since = 1600000000000

[build]
work_unit = 512

[[zone]]
name = "Karui Shores"
act = 10
area_level = 67
town = true
campaign_completion = true

[[zone]]
name = "Celestial Hideout"
hideout = true
"#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.features.zone_generation_since, Some(1_600_000_000_000));
        assert_eq!(config.build.work_unit, 512);
        assert_eq!(config.zones.len(), 2);
        assert!(config.zones[0].campaign_completion);
        assert_eq!(config.zones[0].act, Some(10));
        assert!(config.zones[1].hideout);
        assert!(!config.zones[1].campaign_completion);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.features.zone_generation_since, None);
        assert_eq!(config.build.work_unit, DEFAULT_WORK_UNIT);
        assert!(config.zones.is_empty());
    }
}
