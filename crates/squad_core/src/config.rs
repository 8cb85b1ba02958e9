//! Engine configuration loaded from YAML.
//!
//! Resolution order for [`EngineConfig::from_env`]:
//! 1) `SQUAD_CONFIG_PATH` if set and non-empty
//! 2) built-in defaults

use crate::error::{Result, SquadError};
use crate::models::{Formation, Role, RoleLimits, DEFAULT_CONFIDENCE};
use crate::trades::TradeOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Canonical env var for overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "SQUAD_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: "pretty".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub role_limits: RoleLimits,
    /// Confidence given to imported predictions that carry none.
    pub default_confidence: f64,
    /// Ignore predictions below this confidence when allocating or trading.
    pub min_confidence: Option<f64>,
    pub default_formation: Formation,
    pub trades: TradeOptions,
    pub store_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role_limits: RoleLimits::default(),
            default_confidence: DEFAULT_CONFIDENCE,
            min_confidence: None,
            default_formation: Formation::default(),
            trades: TradeOptions::default(),
            store_dir: PathBuf::from("saves"),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(text).map_err(|e| SquadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SquadError::Config(format!("failed to read config at '{}': {e}", path.display()))
        })?;
        let config = Self::from_yaml(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            let most_slots = Formation::ALL.iter().map(|f| f.slot_count(role)).max().unwrap_or(0);
            let limit = self.role_limits.limit(role);
            if limit < most_slots {
                return Err(SquadError::Config(format!(
                    "{role} limit {limit} cannot fill formations needing {most_slots}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(SquadError::Config(format!(
                "default_confidence {} outside [0, 1]",
                self.default_confidence
            )));
        }
        if let Some(min) = self.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(SquadError::Config(format!("min_confidence {min} outside [0, 1]")));
            }
        }
        if !self.trades.budget.is_finite() || !self.trades.min_improvement.is_finite() {
            return Err(SquadError::Config("trade budget and threshold must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trades.max_transfers, 2);
        assert_eq!(config.default_formation, Formation::F343);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml(
            "default_formation: 4-4-2\nmin_confidence: 0.5\ntrades:\n  budget: 25.0\n",
        )
        .unwrap();
        assert_eq!(config.default_formation, Formation::F442);
        assert_eq!(config.min_confidence, Some(0.5));
        assert_eq!(config.trades.budget, 25.0);
        assert_eq!(config.trades.max_transfers, 2);
        assert_eq!(config.role_limits, RoleLimits::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EngineConfig::from_yaml("default_formation: 4-4-4\n").is_err());
        assert!(EngineConfig::from_yaml("min_confidence: 1.5\n").is_err());
        assert!(EngineConfig::from_yaml("role_limits:\n  FWD: 2\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "store_dir: /tmp/rosters\nlogging:\n  format: json\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/rosters"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(EngineConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
