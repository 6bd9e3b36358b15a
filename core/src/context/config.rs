//! Configuration loading for the attribution engine.
//!
//! The engine configuration is a single TOML file holding feature cutoffs,
//! build settings and static zone definitions. It lives in the user's config
//! directory unless a path is given explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use pathlog_types::EngineConfig;

use super::features::FeatureTimeline;
use super::zones::ZoneIndex;

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load an engine config from a TOML file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config at `path`, falling back to the default location.
/// Returns the built-in defaults when no file exists.
pub fn load_config_or_default(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let resolved = path.map(Path::to_path_buf).or_else(default_config_path);
    match resolved {
        Some(p) if p.exists() => load_config(&p),
        Some(p) if path.is_some() => Err(ConfigError::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            path: p,
        }),
        _ => {
            tracing::debug!("No engine config found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pathlog").join("engine.toml"))
}

/// Collaborators built from a loaded config.
#[derive(Debug, Clone, Default)]
pub struct EngineContext {
    pub features: FeatureTimeline,
    pub zones: ZoneIndex,
    pub work_unit: usize,
}

impl EngineContext {
    pub fn from_config(config: EngineConfig) -> Self {
        let (zones, duplicates) = ZoneIndex::from_definitions(config.zones);
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "Duplicate zone definitions in config");
        }
        Self {
            features: FeatureTimeline::from_config(&config.features),
            zones,
            work_unit: config.build.work_unit.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FeatureLookup, LogFeature, ZoneLookup};

    #[test]
    fn test_context_from_config() {
        let toml = r#"
[features]
zone_generation_since = 1000

[build]
work_unit = 0

[[zone]]
name = "Karui Shores"
campaign_completion = true
"#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        let ctx = EngineContext::from_config(config);
        assert!(ctx.zones.is_campaign_completion("Karui Shores"));
        assert!(!ctx.features.supports(LogFeature::ZoneGeneration, 999));
        // A zero work unit would never make progress
        assert_eq!(ctx.work_unit, 1);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let missing = Path::new("/nonexistent/pathlog/engine.toml");
        let err = load_config_or_default(Some(missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("pathlog-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");
        fs::write(&path, "[build]\nwork_unit = 64\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.build.work_unit, 64);

        fs::write(&path, "[build\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        fs::remove_dir_all(&dir).ok();
    }
}
