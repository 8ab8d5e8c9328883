//! NDT correlative scan matcher.

use log::{debug, trace, warn};

use crate::config::ConfigError;
use crate::core::{Point2D, Pose2D, Scan, normalize_angle};
use crate::ndt::NdtGrid;

use super::config::NdtMatcherConfig;
use super::search::{BestCandidate, SearchWindow, SurfaceMoments};
use super::types::MatchResult;

/// Scan matcher over an NDT map of previously inserted scans.
///
/// The map is rebuilt from scratch by every [`add_scans`](Self::add_scans)
/// call; a matcher with no map returns the initial pose with score 0.
#[derive(Clone, Debug)]
pub struct NdtScanMatcher {
    config: NdtMatcherConfig,
    grid: Option<NdtGrid>,
}

impl NdtScanMatcher {
    /// Create a matcher with no map. Fails on an invalid configuration.
    pub fn new(config: NdtMatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, grid: None })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: NdtMatcherConfig::default(),
            grid: None,
        }
    }

    /// Get configuration.
    pub fn config(&self) -> &NdtMatcherConfig {
        &self.config
    }

    /// Current map, if any.
    pub fn grid(&self) -> Option<&NdtGrid> {
        self.grid.as_ref()
    }

    /// True once a map has been built.
    pub fn has_map(&self) -> bool {
        self.grid.is_some()
    }

    /// Maximum sensor range used for filtering and grid padding.
    pub fn range_max(&self) -> f64 {
        self.config.range_max
    }

    /// Change the range limit. Applies to scoring immediately and to the next map build.
    pub fn set_range_max(&mut self, range_max: f64) -> Result<(), ConfigError> {
        let config = NdtMatcherConfig {
            range_max,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Drop the map.
    pub fn reset(&mut self) {
        self.grid = None;
    }

    // ========================================================================
    // Map building
    // ========================================================================

    /// Replace the map with one built from `scans`, each placed at its paired pose.
    ///
    /// Returns the number of points inserted. An empty input leaves the
    /// matcher without a map.
    pub fn add_scans<'a, I>(&mut self, scans: I) -> usize
    where
        I: IntoIterator<Item = (&'a Scan, Pose2D)>,
    {
        let scans: Vec<(&Scan, Pose2D)> = scans.into_iter().collect();
        self.grid = Self::build_grid(&self.config, &scans);
        self.grid.as_ref().map_or(0, |grid| {
            let inserted: usize = grid.cells().iter().map(|c| c.count()).sum();
            debug!(
                "[NdtScanMatcher] map from {} scans: {} points, {} valid cells",
                scans.len(),
                inserted,
                grid.valid_cells()
            );
            inserted
        })
    }

    /// Build and finalise a grid covering every pose ± `range_max`.
    ///
    /// Scans with a non-finite pose are skipped. `None` if nothing is left.
    pub fn build_grid(config: &NdtMatcherConfig, scans: &[(&Scan, Pose2D)]) -> Option<NdtGrid> {
        let usable: Vec<(&Scan, Pose2D)> = scans
            .iter()
            .filter(|(scan, pose)| {
                let finite = pose.x.is_finite() && pose.y.is_finite() && pose.theta.is_finite();
                if !finite {
                    warn!("[NdtScanMatcher] skipping {} with non-finite pose", scan.id);
                }
                finite
            })
            .copied()
            .collect();

        let poses = usable.iter().map(|(_, pose)| *pose);
        let mut grid = match NdtGrid::covering(poses, config.range_max, config.resolution) {
            Ok(Some(grid)) => grid,
            Ok(None) => return None,
            Err(e) => {
                warn!("[NdtScanMatcher] cannot size map: {}", e);
                return None;
            }
        };

        for (scan, pose) in &usable {
            for p in in_range(&scan.points, config.range_max) {
                grid.add_point(&pose.transform_point(p));
            }
        }
        grid.compute();
        Some(grid)
    }

    // ========================================================================
    // Scoring
    // ========================================================================

    /// Likelihood of a scan at its own pose.
    pub fn score_scan(&self, scan: &Scan) -> f64 {
        self.score_points(&scan.points, &scan.pose)
    }

    /// Likelihood of a scan placed at `pose`.
    pub fn score_scan_at(&self, scan: &Scan, pose: &Pose2D) -> f64 {
        self.score_points(&scan.points, pose)
    }

    /// Summed likelihood of in-range sensor-frame points placed at `pose`.
    /// 0 without a map.
    pub fn score_points(&self, points: &[Point2D], pose: &Pose2D) -> f64 {
        let Some(grid) = &self.grid else {
            return 0.0;
        };
        in_range(points, self.config.range_max)
            .map(|p| grid.likelihood(&pose.transform_point(p)))
            .sum()
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Search the window around `initial_pose` for the best-scoring pose.
    ///
    /// At most `scan_points_to_use` in-range points are scored per candidate
    /// (0 = all). The returned pose is absolute. With no map, no usable
    /// points, or no positive score the initial pose comes back with score 0.
    pub fn match_scan(
        &self,
        scan: &Scan,
        initial_pose: Pose2D,
        scan_points_to_use: usize,
    ) -> MatchResult {
        let window = SearchWindow::from_config(&self.config);
        let points = self.select_points(&scan.points, scan_points_to_use);

        let Some(grid) = &self.grid else {
            trace!("[NdtScanMatcher] no map, returning initial pose");
            return MatchResult::failed(initial_pose, window.uniform_covariance(), points.len());
        };
        if points.is_empty() {
            trace!("[NdtScanMatcher] {} has no usable points", scan.id);
            return MatchResult::failed(initial_pose, window.uniform_covariance(), 0);
        }

        let mut moments = SurfaceMoments::new();
        let mut best = BestCandidate::new();
        let mut candidates = 0usize;
        let mut rotated = Vec::with_capacity(points.len());

        // theta outermost so each rotation is computed once
        for dtheta in window.angular_offsets() {
            let (sin_t, cos_t) = (initial_pose.theta + dtheta).sin_cos();
            rotated.clear();
            rotated.extend(
                points
                    .iter()
                    .map(|p| Point2D::new(p.x * cos_t - p.y * sin_t, p.x * sin_t + p.y * cos_t)),
            );

            for dy in window.linear_offsets() {
                let y = initial_pose.y + dy;
                for dx in window.linear_offsets() {
                    let x = initial_pose.x + dx;
                    let score: f64 = rotated
                        .iter()
                        .map(|p| grid.likelihood(&Point2D::new(p.x + x, p.y + y)))
                        .sum();

                    candidates += 1;
                    moments.add(score, [dx, dy, dtheta]);
                    best.offer(score, [dx, dy, dtheta]);
                }
            }
        }

        let BestCandidate {
            score: best_score,
            offset: best_offset,
        } = best;
        if best_score <= 0.0 {
            debug!(
                "[NdtScanMatcher] {} scored 0 over {} candidates",
                scan.id, candidates
            );
            return MatchResult {
                candidates,
                ..MatchResult::failed(initial_pose, window.uniform_covariance(), points.len())
            };
        }

        let pose = Pose2D::new(
            initial_pose.x + best_offset[0],
            initial_pose.y + best_offset[1],
            normalize_angle(initial_pose.theta + best_offset[2]),
        );
        let covariance = moments.covariance(&window);

        trace!(
            "[NdtScanMatcher] offset ({:.4}, {:.4}, {:.4}) surface weight {:.2}",
            best_offset[0],
            best_offset[1],
            best_offset[2],
            moments.total_weight()
        );
        debug!(
            "[NdtScanMatcher] {} matched at ({:.3}, {:.3}, {:.3}) score {:.2} from {} points",
            scan.id,
            pose.x,
            pose.y,
            pose.theta,
            best_score,
            points.len()
        );

        MatchResult {
            pose,
            score: best_score,
            covariance,
            points_used: points.len(),
            candidates,
        }
    }

    /// In-range points, deterministically sub-sampled to at most `budget` (0 = all).
    fn select_points(&self, points: &[Point2D], budget: usize) -> Vec<Point2D> {
        let usable: Vec<Point2D> = in_range(points, self.config.range_max).copied().collect();
        subsample(usable, budget)
    }
}

/// Finite points no farther than `range_max` from the sensor.
fn in_range(points: &[Point2D], range_max: f64) -> impl Iterator<Item = &Point2D> + '_ {
    points
        .iter()
        .filter(move |p| p.is_finite() && p.norm() <= range_max)
}

/// Keep `budget` points at indices `floor(i · n / budget)`.
fn subsample(points: Vec<Point2D>, budget: usize) -> Vec<Point2D> {
    let n = points.len();
    if budget == 0 || budget >= n {
        return points;
    }
    (0..budget).map(|i| points[i * n / budget]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScanId;
    use approx::assert_relative_eq;

    /// Points along the walls of a 4m x 3m box seen from its centre.
    fn box_points(spacing: f64) -> Vec<Point2D> {
        let mut points = Vec::new();
        let (hx, hy) = (2.0, 1.5);
        let mut t = -hx;
        while t <= hx {
            points.push(Point2D::new(t, hy));
            points.push(Point2D::new(t, -hy));
            t += spacing;
        }
        let mut t = -hy;
        while t <= hy {
            points.push(Point2D::new(hx, t));
            points.push(Point2D::new(-hx, t));
            t += spacing;
        }
        points
    }

    fn mapped_matcher() -> (NdtScanMatcher, Scan) {
        let mut matcher = NdtScanMatcher::with_defaults();
        let scan = Scan::new(ScanId(0), Pose2D::identity(), box_points(0.02));
        matcher.add_scans([(&scan, scan.pose)]);
        (matcher, scan)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = NdtMatcherConfig {
            linear_size: -1.0,
            ..Default::default()
        };
        assert!(NdtScanMatcher::new(config).is_err());
        assert!(NdtScanMatcher::new(NdtMatcherConfig::default()).is_ok());
    }

    #[test]
    fn test_oversized_map_is_refused_not_allocated() {
        let config = NdtMatcherConfig {
            resolution: 1e-7,
            ..Default::default()
        };
        assert!(matches!(
            NdtScanMatcher::new(config),
            Err(ConfigError::GridTooLarge { .. })
        ));

        let mut matcher = NdtScanMatcher::with_defaults();
        assert!(matches!(
            matcher.set_range_max(1e9),
            Err(ConfigError::GridTooLarge { .. })
        ));
        assert_eq!(matcher.range_max(), 12.0);

        // Poses 5km apart need more cells than a grid may hold
        let near = Scan::new(ScanId(0), Pose2D::identity(), box_points(0.1));
        let far = Scan::new(ScanId(1), Pose2D::new(5000.0, 5000.0, 0.0), box_points(0.1));
        let inserted = matcher.add_scans([(&near, near.pose), (&far, far.pose)]);
        assert_eq!(inserted, 0);
        assert!(!matcher.has_map());
    }

    #[test]
    fn test_unmapped_matcher_returns_initial_pose() {
        let matcher = NdtScanMatcher::with_defaults();
        let scan = Scan::new(ScanId(0), Pose2D::identity(), box_points(0.1));
        let initial = Pose2D::new(0.3, -0.2, 0.1);
        let result = matcher.match_scan(&scan, initial, 50);
        assert_eq!(result.pose, initial);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.candidates, 0);
        assert_eq!(matcher.score_scan(&scan), 0.0);
    }

    #[test]
    fn test_empty_scan_list_leaves_matcher_unmapped() {
        let mut matcher = NdtScanMatcher::with_defaults();
        let inserted = matcher.add_scans(std::iter::empty());
        assert_eq!(inserted, 0);
        assert!(!matcher.has_map());
    }

    #[test]
    fn test_identity_match_stays_put() {
        let (matcher, scan) = mapped_matcher();
        let result = matcher.match_scan(&scan, Pose2D::identity(), 0);
        assert!(result.is_match());
        assert_relative_eq!(result.pose.x, 0.0, epsilon = 0.005);
        assert_relative_eq!(result.pose.y, 0.0, epsilon = 0.005);
        assert_relative_eq!(result.pose.theta, 0.0, epsilon = 0.0025);
        assert_eq!(result.candidates, matcher.config().search_space_size());
    }

    #[test]
    fn test_out_of_range_points_are_ignored() {
        let (mut matcher, scan) = mapped_matcher();
        let full = matcher.score_scan(&scan);
        assert!(full > 0.0);
        matcher.set_range_max(1.0).unwrap();
        // Every wall point is at least 1.5m away
        assert_eq!(matcher.score_scan(&scan), 0.0);
        assert!(matcher.set_range_max(0.0).is_err());
    }

    #[test]
    fn test_score_scan_at_other_pose() {
        let (matcher, scan) = mapped_matcher();
        let aligned = matcher.score_scan(&scan);
        let shifted = matcher.score_scan_at(&scan, &Pose2D::new(0.05, 0.05, 0.0));
        assert!(aligned > shifted);
    }

    #[test]
    fn test_reset_drops_map() {
        let (mut matcher, scan) = mapped_matcher();
        assert!(matcher.has_map());
        matcher.reset();
        assert!(matcher.grid().is_none());
        assert_eq!(matcher.score_scan(&scan), 0.0);
    }

    #[test]
    fn test_subsample_indices() {
        let points: Vec<Point2D> = (0..10).map(|i| Point2D::new(i as f64, 0.0)).collect();
        let picked = subsample(points.clone(), 4);
        let xs: Vec<f64> = picked.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 5.0, 7.0]);
        assert_eq!(subsample(points.clone(), 0).len(), 10);
        assert_eq!(subsample(points, 20).len(), 10);
    }
}
