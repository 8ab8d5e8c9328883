//! Configuration loading for vastu-ndt.
//!
//! Loads all settings from a single YAML file; every section and field
//! falls back to its default when omitted.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vastu_ndt::config::NdtConfig;
//!
//! // Load from default path (configs/config.yaml)
//! let config = NdtConfig::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = NdtConfig::default();
//!
//! let matcher = NdtScanMatcher::new(config.matcher.clone())?;
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Type | Description |
//! |---------|------|-------------|
//! | `matcher` | [`NdtMatcherConfig`](crate::matching::NdtMatcherConfig) | NDT resolution, search window, range limit |
//! | `mapper` | [`MapperConfig`](crate::mapping::MapperConfig) | Travel gating, rolling window depth |
//! | `occupancy` | [`OccupancyConfig`](crate::mapping::OccupancyConfig) | Raster resolution and likelihood band |
//!
//! ## Example YAML
//!
//! ```yaml
//! matcher:
//!   resolution: 0.25          # NDT cell size (m)
//!   angular_resolution: 0.0025
//!   angular_size: 0.1         # ±5.7°
//!   linear_resolution: 0.005
//!   linear_size: 0.05         # ±5cm
//!   range_max: 12.0
//!   scan_points_to_use: 100
//! mapper:
//!   minimum_travel_distance: 0.1
//!   minimum_travel_rotation: 1.0
//!   rolling_depth: 10
//!   publish_every: 1
//!   min_match_score: 0.0
//! occupancy:
//!   resolution: 0.05
//!   occupied_min: 0.0
//!   occupied_max: 1.0
//! ```
//!
//! ## Validation
//!
//! Loaded files are validated; violations surface as
//! [`ConfigLoadError::Invalid`] wrapping a [`ConfigError`].

mod error;
mod ndt;

pub use error::{ConfigError, ConfigLoadError};
pub use ndt::{DEFAULT_CONFIG_PATH, NdtConfig};
