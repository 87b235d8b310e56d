//! World configuration.

use serde::{Deserialize, Serialize};

use crate::entity::EntityID;
use crate::error::ConfigError;

/// Settings fixed when a `World` is built.
///
/// Can be loaded from TOML:
///
/// ```toml
/// capacity = 1024
/// pack_on_refactor = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// The maximum number of live entities.
    pub capacity: usize,
    /// Whether `World::refactor` also packs component pools afterwards.
    pub pack_on_refactor: bool,
}

impl WorldConfig {
    /// Create a config with the given capacity and default settings.
    pub fn with_capacity(capacity: usize) -> WorldConfig {
        WorldConfig {
            capacity,
            ..WorldConfig::default()
        }
    }

    /// Parse and validate a config from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<WorldConfig, ConfigError> {
        let config: WorldConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings can be used to build a world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if self.capacity > EntityID::MAX_ENTITIES {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: EntityID::MAX_ENTITIES,
            });
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        WorldConfig {
            capacity: 4096,
            pack_on_refactor: true,
        }
    }
}
