//! Incremental mapping on top of the matcher.
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Mapper`] | Travel gating, odometry prediction, rolling-window matching |
//! | [`SharedMap`] | Publishes immutable full-map snapshots to readers |
//! | [`OccupancyRaster`] | Thresholded likelihood raster of a map |
//!
//! ## Example
//!
//! ```rust
//! use vastu_ndt::config::NdtConfig;
//! use vastu_ndt::core::{Point2D, Pose2D};
//! use vastu_ndt::mapping::Mapper;
//!
//! let mut mapper = Mapper::new(&NdtConfig::default()).unwrap();
//! let reader = mapper.shared_map();
//!
//! let wall: Vec<Point2D> = (0..40).map(|i| Point2D::new(2.0, -1.0 + 0.05 * i as f64)).collect();
//! mapper.add_scan(Pose2D::identity(), wall);
//!
//! assert_eq!(reader.generation(), 1);
//! ```

mod config;
mod mapper;
mod occupancy;
mod shared;

pub use config::{MapperConfig, OccupancyConfig};
pub use mapper::{InsertResult, Mapper};
pub use occupancy::{FREE, OCCUPIED, OccupancyRaster};
pub use shared::{MapSnapshot, SharedMap};
