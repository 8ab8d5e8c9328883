//! # vastu-ndt
//!
//! 2D Normal Distributions Transform mapping and correlative scan matching.
//!
//! ## Overview
//!
//! Space is split into square cells; each cell summarises the scan points
//! that fell into it as a Gaussian (mean + covariance). A candidate pose is
//! scored by evaluating those Gaussians at the transformed scan points, and
//! the matcher searches a discrete window of poses for the best score.
//!
//! ## Features
//!
//! - **NDT map**: Incremental per-cell statistics with idempotent finalisation
//! - **Scan matching**: Exhaustive (θ, y, x) search with a score-surface covariance
//! - **Pose graph container**: Sequential and loop-closure constraints, nearest-scan lookup
//! - **Rolling mapper**: Travel gating, odometry prediction, published map snapshots
//! - **Occupancy raster**: Likelihood-thresholded grid for display and planning
//!
//! ## Quick Start
//!
//! ```rust
//! use vastu_ndt::{NdtMatcherConfig, NdtScanMatcher, Point2D, Pose2D, ScanStore};
//!
//! let mut store = ScanStore::new();
//! let wall: Vec<Point2D> = (0..40).map(|i| Point2D::new(1.5, -1.0 + 0.05 * i as f64)).collect();
//! store.push(Pose2D::identity(), wall.clone());
//!
//! let mut matcher = NdtScanMatcher::new(NdtMatcherConfig::default()).unwrap();
//! matcher.add_scans(store.with_poses());
//!
//! let id = store.push(Pose2D::new(0.02, 0.0, 0.0), wall);
//! let scan = store.get(id).unwrap();
//! let result = matcher.match_scan(scan, scan.pose, 100);
//! println!("pose {:?} score {:.2}", result.pose, result.score);
//! ```
//!
//! ## Coordinate System
//!
//! Uses ROS REP-103 convention:
//! - X: Forward (positive ahead of robot)
//! - Y: Left (positive to robot's left)
//! - Theta: Rotation in radians, CCW positive from +X axis

#![warn(missing_docs)]

// Geometry and scans
pub mod core;

// NDT cells and grid
pub mod ndt;

// Unified configuration
pub mod config;

// Correlative NDT matcher
pub mod matching;

// Constraints and scan container
pub mod graph;

// Rolling mapper, map hand-off, occupancy raster
pub mod mapping;

// Re-export commonly used types
pub use crate::core::{Point2D, Pose2D, Scan, ScanId, ScanStore};

pub use ndt::{Cell, NdtGrid};

pub use config::{ConfigError, ConfigLoadError, NdtConfig};

pub use matching::{Covariance3, MatchResult, NdtMatcherConfig, NdtScanMatcher, ScanMatcher};

pub use graph::{Constraint, ConstraintKind, GraphError, PoseGraph};

pub use mapping::{Mapper, MapperConfig, OccupancyConfig, OccupancyRaster, SharedMap};
