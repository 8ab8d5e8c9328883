//! Fixed-extent grid of NDT cells.
//!
//! ## Layout
//!
//! ```text
//!  origin + (size_x, size_y)
//!            ┌────┬────┬────┬────┐ ◄─ last row absorbs points on the upper edge
//!            │    │    │    │    │
//!            ├────┼────┼────┼────┤
//!            │    │ μ,Σ│    │    │    row-major: index = row * width + col
//!            ├────┼────┼────┼────┤
//!            │    │    │    │    │
//!            └────┴────┴────┴────┘
//!  origin ───┘
//! ```
//!
//! Cells per axis are `ceil(size / resolution)`. A point is inside when it lies
//! in the closed rectangle `[origin, origin + size]`; anything else is dropped
//! on insert and scores 0 on lookup. The grid is never resized.

use log::trace;

use crate::config::ConfigError;
use crate::core::{Point2D, Pose2D, Scan};

use super::cell::Cell;

/// Largest number of cells a grid may hold (a 1 km square at 0.25 m).
pub const MAX_CELLS: usize = 1 << 24;

/// Grid of NDT cells over a fixed world rectangle.
#[derive(Clone, Debug)]
pub struct NdtGrid {
    resolution: f64,
    origin: Point2D,
    size_x: f64,
    size_y: f64,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl NdtGrid {
    /// Create an empty grid covering `[origin_x, origin_x + size_x] × [origin_y, origin_y + size_y]`.
    pub fn new(
        resolution: f64,
        size_x: f64,
        size_y: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<Self, ConfigError> {
        ConfigError::require_positive("resolution", resolution)?;
        ConfigError::require_positive("size_x", size_x)?;
        ConfigError::require_positive("size_y", size_y)?;
        ConfigError::require_finite("origin_x", origin_x)?;
        ConfigError::require_finite("origin_y", origin_y)?;

        let width = cells_along(size_x, resolution);
        let height = cells_along(size_y, resolution);
        let count = checked_cell_count(width, height)?;
        trace!(
            "[NdtGrid] {}x{} cells at {:.3}m, origin ({:.2}, {:.2})",
            width, height, resolution, origin_x, origin_y
        );

        Ok(Self {
            resolution,
            origin: Point2D::new(origin_x, origin_y),
            size_x,
            size_y,
            width,
            height,
            cells: vec![Cell::new(); count],
        })
    }

    /// Smallest grid containing every pose position ± `padding`.
    ///
    /// Returns `Ok(None)` when `poses` is empty.
    pub fn covering<I>(poses: I, padding: f64, resolution: f64) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = Pose2D>,
    {
        ConfigError::require_positive("padding", padding)?;

        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for pose in poses {
            ConfigError::require_finite("pose.x", pose.x)?;
            ConfigError::require_finite("pose.y", pose.y)?;
            bounds = Some(match bounds {
                None => (pose.x, pose.y, pose.x, pose.y),
                Some((min_x, min_y, max_x, max_y)) => (
                    min_x.min(pose.x),
                    min_y.min(pose.y),
                    max_x.max(pose.x),
                    max_y.max(pose.y),
                ),
            });
        }

        let Some((min_x, min_y, max_x, max_y)) = bounds else {
            return Ok(None);
        };

        Self::new(
            resolution,
            max_x - min_x + 2.0 * padding,
            max_y - min_y + 2.0 * padding,
            min_x - padding,
            min_y - padding,
        )
        .map(Some)
    }

    // ========================================================================
    // Indexing
    // ========================================================================

    /// (column, row) of the cell containing `point`, or `None` outside the extent.
    #[inline]
    pub fn cell_index(&self, point: &Point2D) -> Option<(usize, usize)> {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        // Negated comparisons also reject NaN
        if !(dx >= 0.0 && dx <= self.size_x && dy >= 0.0 && dy <= self.size_y) {
            return None;
        }
        let col = ((dx / self.resolution).floor() as usize).min(self.width - 1);
        let row = ((dy / self.resolution).floor() as usize).min(self.height - 1);
        Some((col, row))
    }

    #[inline]
    fn flat_index(&self, point: &Point2D) -> Option<usize> {
        self.cell_index(point).map(|(col, row)| row * self.width + col)
    }

    /// Cell at (column, row).
    #[inline]
    pub fn cell_at(&self, col: usize, row: usize) -> Option<&Cell> {
        if col < self.width && row < self.height {
            self.cells.get(row * self.width + col)
        } else {
            None
        }
    }

    /// Cell containing a world point.
    #[inline]
    pub fn cell_containing(&self, point: &Point2D) -> Option<&Cell> {
        self.flat_index(point).map(|i| &self.cells[i])
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert a world-frame point. Returns false if it lies outside the grid.
    pub fn add_point(&mut self, point: &Point2D) -> bool {
        match self.flat_index(point) {
            Some(i) => {
                self.cells[i].add_point(point);
                true
            }
            None => false,
        }
    }

    /// Insert sensor-frame points observed from `pose`. Returns the number inserted.
    pub fn add_points(&mut self, points: &[Point2D], pose: &Pose2D) -> usize {
        points
            .iter()
            .filter(|p| self.add_point(&pose.transform_point(p)))
            .count()
    }

    /// Insert a scan's points at `pose` (which need not be `scan.pose`).
    pub fn add_scan(&mut self, scan: &Scan, pose: &Pose2D) -> usize {
        self.add_points(&scan.points, pose)
    }

    /// Finalise every pending cell. Idempotent.
    pub fn compute(&mut self) {
        for cell in &mut self.cells {
            cell.compute();
        }
    }

    // ========================================================================
    // Likelihood
    // ========================================================================

    /// Score of the cell covering a world point; 0 outside or for unusable cells.
    #[inline]
    pub fn likelihood(&self, point: &Point2D) -> f64 {
        self.cell_containing(point).map_or(0.0, |c| c.score(point))
    }

    /// Sum of per-point likelihoods for world-frame points.
    pub fn likelihood_sum<'a, I>(&self, points: I) -> f64
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        points.into_iter().map(|p| self.likelihood(p)).sum()
    }

    /// Sum of likelihoods of sensor-frame points placed at `pose`.
    pub fn likelihood_at(&self, points: &[Point2D], pose: &Pose2D) -> f64 {
        points
            .iter()
            .map(|p| self.likelihood(&pose.transform_point(p)))
            .sum()
    }

    /// Likelihood of a scan at its own pose.
    pub fn likelihood_scan(&self, scan: &Scan) -> f64 {
        self.likelihood_at(&scan.points, &scan.pose)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Cell edge length in meters.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// (width, height) in cells.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Lower-left corner.
    #[inline]
    pub fn origin(&self) -> Point2D {
        self.origin
    }

    /// World extent as (min corner, max corner).
    pub fn bounds(&self) -> (Point2D, Point2D) {
        (
            self.origin,
            Point2D::new(self.origin.x + self.size_x, self.origin.y + self.size_y),
        )
    }

    /// Number of cells holding a usable Gaussian.
    pub fn valid_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_valid()).count()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Cells needed to span `size`. Saturates at `usize::MAX`.
pub(crate) fn cells_along(size: f64, resolution: f64) -> usize {
    // Tolerate ratios like 0.3 / 0.1 = 2.9999999999999996
    ((size / resolution - 1e-9).ceil() as usize).max(1)
}

/// `width * height`, or [`ConfigError::GridTooLarge`] above [`MAX_CELLS`].
pub(crate) fn checked_cell_count(width: usize, height: usize) -> Result<usize, ConfigError> {
    width
        .checked_mul(height)
        .filter(|&count| count <= MAX_CELLS)
        .ok_or(ConfigError::GridTooLarge {
            width,
            height,
            max: MAX_CELLS,
        })
}
