use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::pool::EnergyPool;

/// Declarative description of a pool, loadable from YAML or JSON.
///
/// Rate precedence: an explicit `max_receive`/`max_extract` wins over
/// `max_transfer`, which wins over the capacity default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub capacity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_transfer: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_receive: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_extract: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_stored: Option<i64>,
}

impl PoolConfig {
    /// Config for an empty pool with rates equal to `capacity`.
    pub fn new(capacity: i64) -> Self {
        Self {
            capacity,
            max_transfer: None,
            max_receive: None,
            max_extract: None,
            initial_stored: None,
        }
    }

    pub fn resolved_max_receive(&self) -> i64 {
        self.max_receive
            .or(self.max_transfer)
            .unwrap_or(self.capacity)
    }

    pub fn resolved_max_extract(&self) -> i64 {
        self.max_extract
            .or(self.max_transfer)
            .unwrap_or(self.capacity)
    }

    /// Reject values a pool would otherwise silently repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity <= 0 {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        for (field, value) in [
            ("max_transfer", self.max_transfer),
            ("max_receive", self.max_receive),
            ("max_extract", self.max_extract),
        ] {
            if let Some(value) = value.filter(|v| *v < 0) {
                return Err(ConfigError::NegativeRate { field, value });
            }
        }
        if let Some(stored) = self.initial_stored {
            if !(0..=self.capacity).contains(&stored) {
                return Err(ConfigError::StoredOutOfRange {
                    stored,
                    capacity: self.capacity,
                });
            }
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the parser from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let contents = match ext.as_deref() {
            Some("yaml" | "yml" | "json") => std::fs::read_to_string(path)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "loading pool config");
        if ext.as_deref() == Some("json") {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

impl EnergyPool {
    /// Build a pool from a validated config.
    pub fn from_config(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut pool = Self::with_rates(
            config.capacity,
            config.resolved_max_receive(),
            config.resolved_max_extract(),
        );
        if let Some(stored) = config.initial_stored {
            pool.set_stored(stored);
        }
        Ok(pool)
    }

    /// Snapshot of this pool's configuration, including its current fill.
    pub fn config(&self) -> PoolConfig {
        PoolConfig {
            capacity: self.capacity(),
            max_transfer: None,
            max_receive: Some(self.max_receive()),
            max_extract: Some(self.max_extract()),
            initial_stored: Some(self.stored()),
        }
    }
}
