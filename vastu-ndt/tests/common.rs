//! Test utilities for vastu-ndt.
//!
//! Synthetic scans are produced by ray casting against axis-aligned walls.

#![allow(dead_code)]

use std::f64::consts::{PI, TAU};

use vastu_ndt::{Point2D, Pose2D};

/// Axis-aligned wall segment.
#[derive(Clone, Copy, Debug)]
pub enum Wall {
    /// x = value, for y in [min, max]
    Vertical { x: f64, min: f64, max: f64 },
    /// y = value, for x in [min, max]
    Horizontal { y: f64, min: f64, max: f64 },
}

/// Four walls of a `width` x `height` room with its corner at the origin.
pub fn room(width: f64, height: f64) -> Vec<Wall> {
    vec![
        Wall::Vertical { x: 0.0, min: 0.0, max: height },
        Wall::Vertical { x: width, min: 0.0, max: height },
        Wall::Horizontal { y: 0.0, min: 0.0, max: width },
        Wall::Horizontal { y: height, min: 0.0, max: width },
    ]
}

/// Two long walls at y = 0 and y = `width`.
pub fn corridor(width: f64) -> Vec<Wall> {
    vec![
        Wall::Horizontal { y: 0.0, min: -1000.0, max: 1000.0 },
        Wall::Horizontal { y: width, min: -1000.0, max: 1000.0 },
    ]
}

/// Polar ranges seen from `pose`, starting at -π with `num_points` even steps.
///
/// Rays that hit nothing within `max_range` read `f64::INFINITY`.
pub fn cast_ranges(walls: &[Wall], pose: Pose2D, num_points: usize, max_range: f64) -> Vec<f64> {
    let increment = TAU / num_points as f64;
    (0..num_points)
        .map(|i| {
            let angle = pose.theta - PI + i as f64 * increment;
            let (sin_a, cos_a) = angle.sin_cos();
            let mut range = f64::INFINITY;

            for wall in walls {
                let hit = match *wall {
                    Wall::Vertical { x, min, max } if cos_a.abs() > 1e-12 => {
                        let t = (x - pose.x) / cos_a;
                        let y = pose.y + t * sin_a;
                        (t > 0.0 && y >= min && y <= max).then_some(t)
                    }
                    Wall::Horizontal { y, min, max } if sin_a.abs() > 1e-12 => {
                        let t = (y - pose.y) / sin_a;
                        let x = pose.x + t * cos_a;
                        (t > 0.0 && x >= min && x <= max).then_some(t)
                    }
                    _ => None,
                };
                if let Some(t) = hit {
                    range = range.min(t);
                }
            }

            if range <= max_range { range } else { f64::INFINITY }
        })
        .collect()
}

/// Sensor-frame points seen from `pose`.
pub fn cast_points(walls: &[Wall], pose: Pose2D, num_points: usize, max_range: f64) -> Vec<Point2D> {
    let increment = TAU / num_points as f64;
    cast_ranges(walls, pose, num_points, max_range)
        .into_iter()
        .enumerate()
        .filter(|(_, r)| r.is_finite())
        .map(|(i, r)| {
            let a = -PI + i as f64 * increment;
            Point2D::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

/// Straight trajectory along +x.
pub fn straight_trajectory(start: Pose2D, n: usize, spacing: f64) -> Vec<Pose2D> {
    (0..n)
        .map(|i| Pose2D::new(start.x + i as f64 * spacing, start.y, start.theta))
        .collect()
}

/// Assert two poses agree within linear and angular tolerances.
pub fn assert_poses_close(actual: &Pose2D, expected: &Pose2D, linear_tol: f64, angular_tol: f64) {
    let dx = (actual.x - expected.x).abs();
    let dy = (actual.y - expected.y).abs();
    let dt = vastu_ndt::core::normalize_angle(actual.theta - expected.theta).abs();
    assert!(
        dx <= linear_tol && dy <= linear_tol && dt <= angular_tol,
        "pose {:?} not within ({}, {}) of {:?}",
        actual,
        linear_tol,
        angular_tol,
        expected
    );
}
