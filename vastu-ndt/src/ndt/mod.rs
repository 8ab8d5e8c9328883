//! Normal Distributions Transform map.
//!
//! Space is split into square cells; each cell summarises the points that
//! fell into it as a 2D Gaussian. A query point is scored by the Gaussian
//! of the cell it lands in.
//!
//! ## Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Cell`] | Running statistics and finalisation state |
//! | [`Gaussian2D`] | Mean, covariance and information of a valid cell |
//! | [`NdtGrid`] | Fixed-extent array of cells with likelihood queries |
//!
//! ## Example
//!
//! ```rust
//! use vastu_ndt::core::{Point2D, Pose2D};
//! use vastu_ndt::ndt::NdtGrid;
//!
//! let mut grid = NdtGrid::new(1.0, 10.0, 10.0, -5.0, -5.0).unwrap();
//! let points = [
//!     Point2D::new(3.5, 3.5),
//!     Point2D::new(3.45, 3.4),
//!     Point2D::new(3.55, 3.6),
//! ];
//! grid.add_points(&points, &Pose2D::identity());
//! grid.compute();
//!
//! let l = grid.likelihood(&Point2D::new(3.5, 3.5));
//! assert!((l - 1.0).abs() < 1e-9);
//! ```

mod cell;
pub(crate) mod grid;

pub use cell::{Cell, CellState, Gaussian2D, MIN_DETERMINANT, MIN_POINTS};
pub use grid::{MAX_CELLS, NdtGrid};
