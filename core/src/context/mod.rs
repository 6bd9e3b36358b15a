mod config;
mod features;
mod zones;

pub use config::{
    ConfigError, EngineContext, default_config_path, load_config, load_config_or_default,
};
pub use features::{FeatureLookup, FeatureTimeline, LogFeature};
pub use zones::{ZoneIndex, ZoneLookup};
