//! Rigid 2D transforms.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::Point2D;

/// Normalize an angle to (-π, π].
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Shortest signed angular distance from `from` to `to`.
#[inline]
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Robot pose in 2D space.
///
/// Position (x, y) in meters and heading (theta) in radians, CCW positive
/// from +X. `new` stores theta as given; the composition operators
/// normalize their output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose.
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Position component.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Euclidean distance between the positions of two poses.
    #[inline]
    pub fn distance(&self, other: &Pose2D) -> f64 {
        self.position().distance(&other.position())
    }

    /// Same pose with theta normalized to (-π, π].
    #[inline]
    pub fn normalized(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, normalize_angle(self.theta))
    }

    /// Compose two poses: self ⊕ other
    ///
    /// ```text
    /// C = A ⊕ B:
    ///   C.x = A.x + B.x * cos(A.θ) - B.y * sin(A.θ)
    ///   C.y = A.y + B.x * sin(A.θ) + B.y * cos(A.θ)
    ///   C.θ = normalize(A.θ + B.θ)
    /// ```
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            normalize_angle(self.theta + other.theta),
        )
    }

    /// Inverse of this pose, so that `p.compose(&p.inverse())` is identity.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            normalize_angle(-self.theta),
        )
    }

    /// Relative transform from `self` to `other`, expressed in `self`'s frame.
    ///
    /// Equivalent to `self.inverse().compose(other)`: (dx, dy, dθ).
    #[inline]
    pub fn between(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        Pose2D::new(
            cos_t * dx + sin_t * dy,
            -sin_t * dx + cos_t * dy,
            shortest_angular_distance(self.theta, other.theta),
        )
    }

    /// Transform a point from this pose's local frame to the parent frame.
    #[inline]
    pub fn transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Point2D::new(
            self.x + point.x * cos_t - point.y * sin_t,
            self.y + point.x * sin_t + point.y * cos_t,
        )
    }

    /// Transform a point from the parent frame into this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        Point2D::new(dx * cos_t + dy * sin_t, -dx * sin_t + dy * cos_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(PI), PI);
        assert_relative_eq!(normalize_angle(-PI), PI);
        assert_relative_eq!(normalize_angle(TAU + 0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-TAU - 0.5), -0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(PI + 0.5), -PI + 0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-FRAC_PI_2), -FRAC_PI_2);
    }

    #[test]
    fn test_shortest_angular_distance_wraps() {
        let d = shortest_angular_distance(PI - 0.1, -PI + 0.1);
        assert_relative_eq!(d, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&Pose2D::identity());
        assert_relative_eq!(result.x, p.x);
        assert_relative_eq!(result.y, p.y);
        assert_relative_eq!(result.theta, p.theta);
    }

    #[test]
    fn test_compose_rotated() {
        let a = Pose2D::new(1.0, 0.0, FRAC_PI_2);
        let b = Pose2D::new(1.0, 0.0, 0.0);
        let c = a.compose(&b);
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.theta, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let p = Pose2D::new(1.5, -0.7, 2.3);
        let id = p.compose(&p.inverse());
        assert_relative_eq!(id.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(id.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(id.theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_between_matches_inverse_compose() {
        let a = Pose2D::new(1.0, 2.0, 0.3);
        let b = Pose2D::new(-0.5, 3.0, -1.2);
        let rel = a.between(&b);
        let expected = a.inverse().compose(&b);
        assert_relative_eq!(rel.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(rel.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(rel.theta, expected.theta, epsilon = 1e-12);

        let back = a.compose(&rel);
        assert_relative_eq!(back.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, b.y, epsilon = 1e-12);
        assert_relative_eq!(back.theta, b.theta, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_point_roundtrip() {
        let pose = Pose2D::new(1.0, 2.0, FRAC_PI_2);
        let local = Point2D::new(1.0, 0.0);
        let world = pose.transform_point(&local);
        assert_relative_eq!(world.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(world.y, 3.0, epsilon = 1e-12);

        let back = pose.inverse_transform_point(&world);
        assert_relative_eq!(back.x, local.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, local.y, epsilon = 1e-12);
    }
}
