//! Trait for scan-to-map matchers.
//!
//! The mapping layer drives matching through this interface so that other
//! map representations can be dropped in behind it.

use crate::core::{Point2D, Pose2D, Scan};

use super::NdtScanMatcher;
use super::types::MatchResult;

/// A matcher that owns a map built from a set of scans.
///
/// # Example
///
/// ```rust
/// use vastu_ndt::core::{Pose2D, Scan};
/// use vastu_ndt::matching::ScanMatcher;
///
/// fn localize<M: ScanMatcher>(matcher: &M, scan: &Scan, initial: Pose2D) -> Pose2D {
///     let result = matcher.match_scan(scan, initial);
///     if result.is_match() { result.pose } else { initial }
/// }
/// ```
pub trait ScanMatcher: Send + Sync {
    /// Rebuild the map from scans placed at their paired poses.
    /// Returns the number of points inserted.
    fn add_scans(&mut self, scans: &[(&Scan, Pose2D)]) -> usize;

    /// Match a scan around `initial_pose` with the matcher's default point budget.
    fn match_scan(&self, scan: &Scan, initial_pose: Pose2D) -> MatchResult;

    /// Summed likelihood of sensor-frame points placed at `pose`.
    fn score_points(&self, points: &[Point2D], pose: &Pose2D) -> f64;

    /// Drop the map.
    fn reset(&mut self);

    /// Name for logging.
    fn name(&self) -> &str;
}

impl ScanMatcher for NdtScanMatcher {
    fn add_scans(&mut self, scans: &[(&Scan, Pose2D)]) -> usize {
        NdtScanMatcher::add_scans(self, scans.iter().copied())
    }

    fn match_scan(&self, scan: &Scan, initial_pose: Pose2D) -> MatchResult {
        NdtScanMatcher::match_scan(self, scan, initial_pose, self.config().scan_points_to_use)
    }

    fn score_points(&self, points: &[Point2D], pose: &Pose2D) -> f64 {
        NdtScanMatcher::score_points(self, points, pose)
    }

    fn reset(&mut self) {
        NdtScanMatcher::reset(self)
    }

    fn name(&self) -> &str {
        "ndt"
    }
}
