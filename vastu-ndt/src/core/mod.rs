//! Core geometric types.
//!
//! All types follow the ROS REP-103 coordinate convention:
//! - **X-axis**: Forward (positive ahead of robot)
//! - **Y-axis**: Left (positive to robot's left)
//! - **Theta**: Counter-clockwise rotation from +X axis (radians)
//!
//! ## Types
//!
//! - [`Point2D`]: Point in meters (sensor or world frame)
//! - [`Pose2D`]: Position and heading, with compose/inverse/between
//! - [`Scan`]: Sensor-frame points plus the pose they were taken at
//! - [`ScanStore`]: Append-only arena of scans addressed by [`ScanId`]
//!
//! ## Example
//!
//! ```rust
//! use vastu_ndt::core::{Point2D, Pose2D};
//!
//! // Robot pose: 1m forward, 2m left, facing 90° CCW
//! let pose = Pose2D::new(1.0, 2.0, std::f64::consts::FRAC_PI_2);
//!
//! // 1m ahead in the robot frame lands at (1.0, 3.0) in the world
//! let world = pose.transform_point(&Point2D::new(1.0, 0.0));
//! assert!((world.y - 3.0).abs() < 1e-12);
//! ```

mod point;
mod pose;
mod scan;

pub use point::Point2D;
pub use pose::{Pose2D, normalize_angle, shortest_angular_distance};
pub use scan::{Scan, ScanId, ScanStore};
