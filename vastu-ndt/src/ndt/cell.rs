//! NDT cell: running point statistics and the Gaussian they define.
//!
//! A cell accumulates points incrementally and is finalised by
//! [`Cell::compute`]. Only finalised cells with a usable covariance score
//! points; everything else scores 0.
//!
//! ```text
//!   add_point ──► Pending ──compute──► Valid(Gaussian2D)
//!       ▲            │                    │
//!       │            └──compute──► Degenerate  (n < 3 or no spread)
//!       └─────────────────────────────────┘
//! ```
//!
//! ## Score
//!
//! ```text
//! score(p) = exp(-½ · qᵀ Σ⁻¹ q),   q = p − μ
//! ```
//!
//! Exactly 1.0 at the mean, falling monotonically with Mahalanobis distance.
//!
//! ## Thin cells
//!
//! Cells on a straight wall hold nearly collinear points, so the raw
//! covariance determinant is ~0. The inverse uses `adj(Σ) / max(det, MIN_DETERMINANT)`
//! which keeps such cells usable: they score sharply across the wall and
//! softly along it.

use crate::core::Point2D;

/// Fewer points than this never produce a Gaussian.
pub const MIN_POINTS: usize = 3;

/// Floor applied to the covariance determinant before inversion.
pub const MIN_DETERMINANT: f64 = 5e-7;

/// Below this total variance (m²) the points are treated as coincident.
const MIN_SPREAD: f64 = 1e-10;

/// Finalised normal distribution of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gaussian2D {
    /// Mean (world frame)
    pub mean: Point2D,
    /// Covariance `[[xx, xy], [xy, yy]]`
    pub covariance: [[f64; 2]; 2],
    /// Inverse covariance used for scoring
    pub information: [[f64; 2]; 2],
}

impl Gaussian2D {
    /// Build from mean and covariance. `None` if the covariance is singular.
    pub fn from_moments(mean: Point2D, cov_xx: f64, cov_xy: f64, cov_yy: f64) -> Option<Self> {
        let spread = cov_xx + cov_yy;
        if !spread.is_finite() || !cov_xy.is_finite() || spread < MIN_SPREAD {
            return None;
        }

        let det = (cov_xx * cov_yy - cov_xy * cov_xy).max(MIN_DETERMINANT);
        Some(Self {
            mean,
            covariance: [[cov_xx, cov_xy], [cov_xy, cov_yy]],
            information: [[cov_yy / det, -cov_xy / det], [-cov_xy / det, cov_xx / det]],
        })
    }

    /// Squared Mahalanobis distance of `p` from the mean.
    #[inline]
    pub fn mahalanobis_squared(&self, p: &Point2D) -> f64 {
        let qx = p.x - self.mean.x;
        let qy = p.y - self.mean.y;
        let i = &self.information;
        (qx * (i[0][0] * qx + i[0][1] * qy) + qy * (i[1][0] * qx + i[1][1] * qy)).max(0.0)
    }

    /// Unnormalised likelihood of `p`, in [0, 1].
    #[inline]
    pub fn score(&self, p: &Point2D) -> f64 {
        (-0.5 * self.mahalanobis_squared(p)).exp()
    }
}

/// Finalisation state of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CellState {
    /// No points yet
    #[default]
    Empty,
    /// Points added since the last compute
    Pending,
    /// Too few points or no spread; never scores
    Degenerate,
    /// Usable Gaussian
    Valid(Gaussian2D),
}

/// One NDT grid cell.
///
/// Statistics are kept as a running mean and running co-moments so that
/// large world coordinates do not cancel out the covariance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cell {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    // Σ (x - mean_x)², Σ (x - mean_x)(y - mean_y), Σ (y - mean_y)²
    m_xx: f64,
    m_xy: f64,
    m_yy: f64,
    state: CellState,
}

impl Cell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a world-frame point into the statistics.
    pub fn add_point(&mut self, p: &Point2D) {
        self.count += 1;
        let n = self.count as f64;
        let dx = p.x - self.mean_x;
        let dy = p.y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        // Second factor uses the updated mean
        self.m_xx += dx * (p.x - self.mean_x);
        self.m_xy += dx * (p.y - self.mean_y);
        self.m_yy += dy * (p.y - self.mean_y);
        self.state = CellState::Pending;
    }

    /// Finalise the Gaussian. No-op unless points were added since the last call.
    pub fn compute(&mut self) {
        if self.state != CellState::Pending {
            return;
        }
        if self.count < MIN_POINTS {
            self.state = CellState::Degenerate;
            return;
        }
        let (xx, xy, yy) = self.covariance();
        self.state = match Gaussian2D::from_moments(self.mean(), xx, xy, yy) {
            Some(g) => CellState::Valid(g),
            None => CellState::Degenerate,
        };
    }

    /// Likelihood of `p` under this cell. 0 unless the cell is valid.
    #[inline]
    pub fn score(&self, p: &Point2D) -> f64 {
        match &self.state {
            CellState::Valid(g) => g.score(p),
            _ => 0.0,
        }
    }

    /// Number of points folded in.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean (origin when empty).
    #[inline]
    pub fn mean(&self) -> Point2D {
        Point2D::new(self.mean_x, self.mean_y)
    }

    /// Population covariance `(xx, xy, yy)`; zeros when empty.
    pub fn covariance(&self) -> (f64, f64, f64) {
        if self.count == 0 {
            return (0.0, 0.0, 0.0);
        }
        let n = self.count as f64;
        (self.m_xx / n, self.m_xy / n, self.m_yy / n)
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> &CellState {
        &self.state
    }

    /// Finalised Gaussian, if valid.
    #[inline]
    pub fn gaussian(&self) -> Option<&Gaussian2D> {
        match &self.state {
            CellState::Valid(g) => Some(g),
            _ => None,
        }
    }

    /// Holds a usable Gaussian.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self.state, CellState::Valid(_))
    }

    /// Finalised without a usable Gaussian.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self.state, CellState::Degenerate)
    }

    /// Points added since the last compute.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, CellState::Pending)
    }
}
