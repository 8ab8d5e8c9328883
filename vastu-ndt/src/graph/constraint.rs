//! Relative-pose constraints between scans.

use serde::{Deserialize, Serialize};

use crate::core::{Pose2D, Scan, ScanId};
use crate::matching::Covariance3;

/// Origin of a constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Consecutive scans linked by matching against the rolling window
    Sequential,
    /// Revisit of an earlier part of the map
    LoopClosure,
}

/// Measured pose of `end` in the frame of `begin`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Reference scan
    pub begin: ScanId,
    /// Constrained scan
    pub end: ScanId,
    /// (dx, dy, dθ) of `end` expressed in `begin`'s frame
    pub transform: Pose2D,
    /// Inverse covariance of `transform`
    pub information: [[f64; 3]; 3],
    /// Constraint kind
    pub kind: ConstraintKind,
    /// May be disabled by a robust back-end
    pub switchable: bool,
}

impl Constraint {
    /// Sequential constraint from the current poses of two scans.
    ///
    /// The information is the inverse of `covariance`; a singular covariance
    /// gives zero information, which constrains nothing.
    pub fn between(begin: &Scan, end: &Scan, covariance: &Covariance3) -> Self {
        Self {
            begin: begin.id,
            end: end.id,
            transform: begin.pose.between(&end.pose),
            information: covariance.inverse().unwrap_or([[0.0; 3]; 3]),
            kind: ConstraintKind::Sequential,
            switchable: false,
        }
    }

    /// Same constraint with a different kind.
    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.kind = kind;
        self
    }

    /// Pose of `end` predicted from a pose of `begin`.
    pub fn predict(&self, begin_pose: &Pose2D) -> Pose2D {
        begin_pose.compose(&self.transform)
    }
}
