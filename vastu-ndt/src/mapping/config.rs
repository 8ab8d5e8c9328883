//! Mapper and occupancy raster configuration.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Configuration for the rolling-window mapper.
///
/// A scan is inserted when the robot has moved at least
/// `minimum_travel_distance` OR turned at least `minimum_travel_rotation`
/// since the last inserted scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Distance gate (meters).
    #[serde(default = "default_minimum_travel_distance")]
    pub minimum_travel_distance: f64,

    /// Rotation gate (radians).
    #[serde(default = "default_minimum_travel_rotation")]
    pub minimum_travel_rotation: f64,

    /// Most recent scans the new scan is matched against.
    #[serde(default = "default_rolling_depth")]
    pub rolling_depth: usize,

    /// Matches scoring at or below this keep the odometry estimate.
    #[serde(default = "default_min_match_score")]
    pub min_match_score: f64,

    /// Rebuild and publish the full map after this many inserts.
    /// 0 = only when [`Mapper::publish`](super::Mapper::publish) is called.
    #[serde(default = "default_publish_every")]
    pub publish_every: usize,
}

fn default_minimum_travel_distance() -> f64 {
    0.1
}

fn default_minimum_travel_rotation() -> f64 {
    1.0
}

fn default_rolling_depth() -> usize {
    10
}

fn default_min_match_score() -> f64 {
    0.0
}

fn default_publish_every() -> usize {
    1
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            minimum_travel_distance: default_minimum_travel_distance(),
            minimum_travel_rotation: default_minimum_travel_rotation(),
            rolling_depth: default_rolling_depth(),
            min_match_score: default_min_match_score(),
            publish_every: default_publish_every(),
        }
    }
}

impl MapperConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_non_negative("minimum_travel_distance", self.minimum_travel_distance)?;
        ConfigError::require_non_negative("minimum_travel_rotation", self.minimum_travel_rotation)?;
        ConfigError::require_non_negative("min_match_score", self.min_match_score)?;
        if self.rolling_depth == 0 {
            return Err(ConfigError::Zero {
                name: "rolling_depth",
            });
        }
        Ok(())
    }
}

/// Likelihood thresholds for rasterising the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyConfig {
    /// Raster cell size (meters).
    #[serde(default = "default_occupancy_resolution")]
    pub resolution: f64,

    /// Likelihood must exceed this to be occupied.
    #[serde(default = "default_occupied_min")]
    pub occupied_min: f64,

    /// Likelihood must not exceed this to be occupied.
    #[serde(default = "default_occupied_max")]
    pub occupied_max: f64,
}

fn default_occupancy_resolution() -> f64 {
    0.05
}

fn default_occupied_min() -> f64 {
    0.0
}

fn default_occupied_max() -> f64 {
    1.0
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            resolution: default_occupancy_resolution(),
            occupied_min: default_occupied_min(),
            occupied_max: default_occupied_max(),
        }
    }
}

impl OccupancyConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("occupancy.resolution", self.resolution)?;
        ConfigError::require_finite("occupied_min", self.occupied_min)?;
        ConfigError::require_finite("occupied_max", self.occupied_max)?;
        if self.occupied_min >= self.occupied_max {
            return Err(ConfigError::EmptyRange {
                name: "occupied",
                min: self.occupied_min,
                max: self.occupied_max,
            });
        }
        Ok(())
    }

    /// Whether a likelihood value counts as occupied.
    #[inline]
    pub fn is_occupied(&self, likelihood: f64) -> bool {
        likelihood > self.occupied_min && likelihood <= self.occupied_max
    }
}
