//! Laser scans and the scan arena.
//!
//! A [`Scan`] is an immutable set of sensor-frame points plus the pose the
//! scan was taken at. Scans are owned by a [`ScanStore`] and referred to by
//! [`ScanId`], a stable index that is never reused.
//!
//! ```text
//! ScanStore
//!   ┌──────────┬──────────┬──────────┐
//!   │ ScanId 0 │ ScanId 1 │ ScanId 2 │ ...   push() appends, ids never move
//!   └──────────┴──────────┴──────────┘
//!        ▲                      ▲
//!        └──── Constraint ──────┘          graph edges refer to ids only
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Point2D, Pose2D};

/// Stable identifier of a scan inside a [`ScanStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScanId(pub usize);

impl ScanId {
    /// Position of the scan in its store.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scan#{}", self.0)
    }
}

/// A single 2D laser scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scan {
    /// Identifier assigned by the owning store
    pub id: ScanId,
    /// Pose the scan was taken at (world frame)
    pub pose: Pose2D,
    /// Points in the sensor-local frame
    pub points: Vec<Point2D>,
}

impl Scan {
    /// Create a scan from sensor-frame points.
    pub fn new(id: ScanId, pose: Pose2D, points: Vec<Point2D>) -> Self {
        Self { id, pose, points }
    }

    /// Convert polar range readings to a scan.
    ///
    /// Reading `i` lies at `angle_min + i * angle_increment`. Non-finite
    /// ranges (no return) are dropped.
    pub fn from_ranges(
        id: ScanId,
        pose: Pose2D,
        ranges: &[f64],
        angle_min: f64,
        angle_increment: f64,
    ) -> Self {
        let points = ranges
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_finite())
            .map(|(i, &r)| {
                let angle = angle_min + i as f64 * angle_increment;
                let (sin_a, cos_a) = angle.sin_cos();
                Point2D::new(r * cos_a, r * sin_a)
            })
            .collect();
        Self { id, pose, points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the scan holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points transformed into the world frame at `pose`.
    pub fn world_points(&self, pose: &Pose2D) -> impl Iterator<Item = Point2D> + '_ {
        let pose = *pose;
        self.points.iter().map(move |p| pose.transform_point(p))
    }

    /// Pose located at the centroid of the scan's world-frame points.
    ///
    /// Heading is that of `pose`. An empty scan yields `pose` unchanged.
    pub fn barycenter_pose(&self, pose: &Pose2D) -> Pose2D {
        if self.points.is_empty() {
            return *pose;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .world_points(pose)
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Pose2D::new(sx / n, sy / n, pose.theta)
    }

    /// Barycenter at the scan's own pose.
    pub fn barycenter(&self) -> Pose2D {
        self.barycenter_pose(&self.pose)
    }
}

/// Append-only arena of scans.
#[derive(Clone, Debug, Default)]
pub struct ScanStore {
    scans: Vec<Scan>,
}

impl ScanStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed scan will receive.
    #[inline]
    pub fn next_id(&self) -> ScanId {
        ScanId(self.scans.len())
    }

    /// Store a scan built from `pose` and `points`, returning its id.
    pub fn push(&mut self, pose: Pose2D, points: Vec<Point2D>) -> ScanId {
        let id = self.next_id();
        self.scans.push(Scan::new(id, pose, points));
        id
    }

    /// Look up a scan.
    #[inline]
    pub fn get(&self, id: ScanId) -> Option<&Scan> {
        self.scans.get(id.0)
    }

    /// True if `id` names a stored scan.
    #[inline]
    pub fn contains(&self, id: ScanId) -> bool {
        id.0 < self.scans.len()
    }

    /// Overwrite the pose of a stored scan. Returns false for unknown ids.
    pub fn set_pose(&mut self, id: ScanId, pose: Pose2D) -> bool {
        match self.scans.get_mut(id.0) {
            Some(scan) => {
                scan.pose = pose;
                true
            }
            None => false,
        }
    }

    /// Number of stored scans.
    #[inline]
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// True if nothing has been stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Most recently stored scan.
    pub fn last(&self) -> Option<&Scan> {
        self.scans.last()
    }

    /// All scans in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Scan> + '_ {
        self.scans.iter()
    }

    /// The last `depth` scans (fewer if the store is smaller).
    pub fn tail(&self, depth: usize) -> &[Scan] {
        let start = self.scans.len().saturating_sub(depth);
        &self.scans[start..]
    }

    /// Scans paired with their stored pose, ready for map building.
    pub fn with_poses(&self) -> impl Iterator<Item = (&Scan, Pose2D)> + '_ {
        self.scans.iter().map(|s| (s, s.pose))
    }
}
