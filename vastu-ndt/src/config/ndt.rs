//! Top-level NdtConfig and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mapping::{MapperConfig, OccupancyConfig};
use crate::matching::NdtMatcherConfig;

use super::error::{ConfigError, ConfigLoadError};

/// Default location searched by [`NdtConfig::load_default`].
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

/// Full configuration loaded from YAML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NdtConfig {
    /// Scan matcher settings
    #[serde(default)]
    pub matcher: NdtMatcherConfig,

    /// Mapper settings
    #[serde(default)]
    pub mapper: MapperConfig,

    /// Occupancy raster settings
    #[serde(default)]
    pub occupancy: OccupancyConfig,
}

impl NdtConfig {
    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from `configs/config.yaml`, or defaults if the file does not exist.
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matcher.validate()?;
        self.mapper.validate()?;
        self.occupancy.validate()
    }
}
