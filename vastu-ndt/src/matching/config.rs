//! NDT matcher configuration.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::ndt::grid::{cells_along, checked_cell_count};

/// Configuration for the NDT correlative scan matcher.
///
/// The matcher builds an NDT grid at `resolution` and searches a box of
/// `±linear_size` in x and y and `±angular_size` in theta around the initial
/// pose, stepping by `linear_resolution` and `angular_resolution`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NdtMatcherConfig {
    /// NDT cell edge length (meters).
    #[serde(default = "default_resolution")]
    pub resolution: f64,

    /// Angular search step (radians).
    #[serde(default = "default_angular_resolution")]
    pub angular_resolution: f64,

    /// Angular half-window (radians).
    #[serde(default = "default_angular_size")]
    pub angular_size: f64,

    /// Linear search step in x and y (meters).
    #[serde(default = "default_linear_resolution")]
    pub linear_resolution: f64,

    /// Linear half-window in x and y (meters).
    #[serde(default = "default_linear_size")]
    pub linear_size: f64,

    /// Points farther than this from the sensor are ignored (meters).
    /// Also the padding around scan poses when the grid is built.
    #[serde(default = "default_range_max")]
    pub range_max: f64,

    /// Points used per match when driven through [`ScanMatcher`](super::ScanMatcher).
    /// 0 = use all.
    #[serde(default = "default_scan_points_to_use")]
    pub scan_points_to_use: usize,
}

fn default_resolution() -> f64 {
    0.25
}

fn default_angular_resolution() -> f64 {
    0.0025 // ~0.14 degrees
}

fn default_angular_size() -> f64 {
    0.1 // ~5.7 degrees
}

fn default_linear_resolution() -> f64 {
    0.005 // 5mm steps
}

fn default_linear_size() -> f64 {
    0.05
}

fn default_range_max() -> f64 {
    12.0
}

fn default_scan_points_to_use() -> usize {
    100
}

impl Default for NdtMatcherConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            angular_resolution: default_angular_resolution(),
            angular_size: default_angular_size(),
            linear_resolution: default_linear_resolution(),
            linear_size: default_linear_size(),
            range_max: default_range_max(),
            scan_points_to_use: default_scan_points_to_use(),
        }
    }
}

impl NdtMatcherConfig {
    /// Coarser search for real-time use with good odometry.
    pub fn fast() -> Self {
        Self {
            angular_resolution: 0.01,
            linear_resolution: 0.01,
            scan_points_to_use: 60,
            ..Default::default()
        }
    }

    /// Wider, finer search for poor odometry.
    pub fn thorough() -> Self {
        Self {
            angular_size: 0.2,
            linear_size: 0.15,
            scan_points_to_use: 0,
            ..Default::default()
        }
    }

    /// Check every field. All reals must be positive and finite, each
    /// search step must be smaller than its window, and the map around a
    /// single pose (`2 * range_max` per side) must fit in a grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("resolution", self.resolution)?;
        ConfigError::require_positive("angular_resolution", self.angular_resolution)?;
        ConfigError::require_positive("angular_size", self.angular_size)?;
        ConfigError::require_positive("linear_resolution", self.linear_resolution)?;
        ConfigError::require_positive("linear_size", self.linear_size)?;
        ConfigError::require_positive("range_max", self.range_max)?;

        if self.angular_resolution >= self.angular_size {
            return Err(ConfigError::StepExceedsWindow {
                resolution_name: "angular_resolution",
                resolution: self.angular_resolution,
                size_name: "angular_size",
                size: self.angular_size,
            });
        }
        if self.linear_resolution >= self.linear_size {
            return Err(ConfigError::StepExceedsWindow {
                resolution_name: "linear_resolution",
                resolution: self.linear_resolution,
                size_name: "linear_size",
                size: self.linear_size,
            });
        }

        let side = cells_along(2.0 * self.range_max, self.resolution);
        checked_cell_count(side, side)?;
        Ok(())
    }

    /// Steps on each side of zero for a window (`floor(size / res)`).
    pub(crate) fn half_steps(size: f64, resolution: f64) -> usize {
        // 0.05 / 0.005 evaluates just below 10
        (size / resolution + 1e-9).floor() as usize
    }

    /// Linear steps either side of the initial guess.
    pub fn linear_steps(&self) -> usize {
        Self::half_steps(self.linear_size, self.linear_resolution)
    }

    /// Angular steps either side of the initial guess.
    pub fn angular_steps(&self) -> usize {
        Self::half_steps(self.angular_size, self.angular_resolution)
    }

    /// Number of candidate poses one match evaluates.
    pub fn search_space_size(&self) -> usize {
        let linear = 2 * self.linear_steps() + 1;
        let angular = 2 * self.angular_steps() + 1;
        linear * linear * angular
    }
}
