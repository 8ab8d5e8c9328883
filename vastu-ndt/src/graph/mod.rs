//! Pose graph container.
//!
//! Scans are nodes; [`Constraint`]s are edges carrying the relative pose
//! measured by scan matching and its information matrix.
//!
//! ```text
//!   scan#0 ──seq──▶ scan#1 ──seq──▶ scan#2 ──seq──▶ scan#3
//!     ▲                                                │
//!     └──────────────────── loop closure ──────────────┘
//! ```
//!
//! No optimiser lives here; the graph is the hand-off point to one.

mod constraint;
mod pose_graph;

pub use constraint::{Constraint, ConstraintKind};
pub use pose_graph::{GraphError, NearestMode, PoseGraph};
