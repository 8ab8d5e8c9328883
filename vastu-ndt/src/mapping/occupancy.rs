//! Occupancy raster sampled from NDT likelihood.
//!
//! The raster covers the grid extent at its own (usually finer) resolution.
//! Each raster cell takes the likelihood at its lower-left corner and is
//! marked occupied when that value falls inside the configured band.

use crate::core::Point2D;
use crate::ndt::NdtGrid;

use super::config::OccupancyConfig;

/// Value of an occupied raster cell.
pub const OCCUPIED: i8 = 100;

/// Value of a free raster cell.
pub const FREE: i8 = 0;

/// Row-major raster of occupancy values.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyRaster {
    /// Cell size (meters)
    pub resolution: f64,
    /// Cells along x
    pub width: usize,
    /// Cells along y
    pub height: usize,
    /// World position of cell (0, 0)'s lower-left corner
    pub origin: Point2D,
    /// [`OCCUPIED`] or [`FREE`] per cell
    pub data: Vec<i8>,
}

impl OccupancyRaster {
    /// Sample `grid` over its full extent.
    pub fn sample(grid: &NdtGrid, config: &OccupancyConfig) -> Self {
        let (min, max) = grid.bounds();
        let resolution = config.resolution;
        let width = cells_along(max.x - min.x, resolution);
        let height = cells_along(max.y - min.y, resolution);

        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            let y = min.y + row as f64 * resolution;
            for col in 0..width {
                let x = min.x + col as f64 * resolution;
                let l = grid.likelihood(&Point2D::new(x, y));
                data.push(if config.is_occupied(l) { OCCUPIED } else { FREE });
            }
        }

        Self {
            resolution,
            width,
            height,
            origin: min,
            data,
        }
    }

    /// Value at (column, row).
    pub fn get(&self, col: usize, row: usize) -> Option<i8> {
        if col < self.width && row < self.height {
            self.data.get(row * self.width + col).copied()
        } else {
            None
        }
    }

    /// Value of the raster cell containing a world point.
    pub fn at(&self, point: &Point2D) -> Option<i8> {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        self.get(
            (dx / self.resolution).floor() as usize,
            (dy / self.resolution).floor() as usize,
        )
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == OCCUPIED).count()
    }
}

fn cells_along(size: f64, resolution: f64) -> usize {
    ((size / resolution - 1e-9).ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;

    #[test]
    fn test_populated_cells_are_occupied() {
        let mut grid = NdtGrid::new(0.5, 4.0, 4.0, 0.0, 0.0).unwrap();
        let wall: Vec<Point2D> = (0..20)
            .map(|i| Point2D::new(0.05 + 0.02 * i as f64, 1.25 + 0.005 * (i % 3) as f64))
            .collect();
        grid.add_points(&wall, &Pose2D::identity());
        grid.compute();

        let raster = OccupancyRaster::sample(&grid, &OccupancyConfig::default());
        assert_eq!(raster.width, 80);
        assert_eq!(raster.height, 80);
        assert!(raster.occupied_count() > 0);
        assert_eq!(raster.at(&Point2D::new(0.25, 1.25)), Some(OCCUPIED));
        // Far from any data
        assert_eq!(raster.at(&Point2D::new(3.0, 3.0)), Some(FREE));
        assert_eq!(raster.at(&Point2D::new(-1.0, 0.0)), None);
    }

    #[test]
    fn test_empty_grid_is_free() {
        let grid = NdtGrid::new(0.5, 2.0, 2.0, 0.0, 0.0).unwrap();
        let raster = OccupancyRaster::sample(&grid, &OccupancyConfig::default());
        assert_eq!(raster.occupied_count(), 0);
    }
}
