//! Match result types.

use serde::{Deserialize, Serialize};

use crate::core::Pose2D;

/// Symmetric 3x3 covariance over (x, y, theta).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Covariance3(pub [[f64; 3]; 3]);

impl Covariance3 {
    /// All-zero matrix.
    pub const ZERO: Covariance3 = Covariance3([[0.0; 3]; 3]);

    /// Diagonal matrix from per-axis variances.
    pub fn diagonal(var_x: f64, var_y: f64, var_theta: f64) -> Self {
        Self([
            [var_x, 0.0, 0.0],
            [0.0, var_y, 0.0],
            [0.0, 0.0, var_theta],
        ])
    }

    /// Variances (x, y, theta).
    pub fn variances(&self) -> [f64; 3] {
        [self.0[0][0], self.0[1][1], self.0[2][2]]
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> f64 {
        self.0[0][0] + self.0[1][1] + self.0[2][2]
    }

    /// Determinant.
    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Matrix inverse by cofactors, `None` when singular.
    pub fn inverse(&self) -> Option<[[f64; 3]; 3]> {
        let m = &self.0;
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-30 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ])
    }
}

impl Default for Covariance3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Result of matching a scan against the NDT map.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Best pose found (absolute, world frame)
    pub pose: Pose2D,
    /// Summed likelihood of the scan points at `pose`; 0 when nothing matched
    pub score: f64,
    /// Uncertainty of `pose`
    pub covariance: Covariance3,
    /// Scan points used after range filtering and sub-sampling
    pub points_used: usize,
    /// Candidate poses evaluated
    pub candidates: usize,
}

impl MatchResult {
    /// No match: the initial pose with score 0.
    pub fn failed(initial_pose: Pose2D, covariance: Covariance3, points_used: usize) -> Self {
        Self {
            pose: initial_pose,
            score: 0.0,
            covariance,
            points_used,
            candidates: 0,
        }
    }

    /// A positive score was found.
    pub fn is_match(&self) -> bool {
        self.score > 0.0
    }

    /// Mean per-point likelihood, in [0, 1].
    pub fn normalized_score(&self) -> f64 {
        if self.points_used == 0 {
            0.0
        } else {
            self.score / self.points_used as f64
        }
    }
}
