//! Rolling-window NDT mapper.
//!
//! ## Insertion
//!
//! ```text
//! odometry pose + points
//!        │
//!        ▼
//!  travel gate ── below both thresholds ──▶ skipped
//!        │
//!        ▼
//!  predict: last corrected pose + odometry delta (rotated into the corrected frame)
//!        │
//!        ▼
//!  match against the last `rolling_depth` scans
//!        │
//!        ▼
//!  store scan, add sequential constraint
//!        │
//!        ▼
//!  every `publish_every` inserts (or on `publish()`): rebuild full map, publish snapshot
//! ```

use log::{debug, info, warn};

use crate::config::{ConfigError, NdtConfig};
use crate::core::{Point2D, Pose2D, Scan, ScanId, normalize_angle};
use crate::graph::{Constraint, PoseGraph};
use crate::matching::{MatchResult, NdtMatcherConfig, NdtScanMatcher, ScanMatcher};

use super::config::MapperConfig;
use super::shared::SharedMap;

/// Outcome of inserting a scan.
#[derive(Clone, Debug)]
pub struct InsertResult {
    /// Id of the stored scan
    pub id: ScanId,
    /// Corrected pose the scan was stored at
    pub pose: Pose2D,
    /// Pose predicted from odometry before matching
    pub predicted: Pose2D,
    /// Match against the rolling window, if there was one to match against
    pub matched: Option<MatchResult>,
    /// Generation of the latest published map once the insert is done
    pub generation: u64,
}

/// Odometry and corrected pose of the last inserted scan.
#[derive(Clone, Copy, Debug)]
struct LastInsert {
    id: ScanId,
    odom: Pose2D,
    corrected: Pose2D,
}

/// Incremental mapper producing a pose graph and a published NDT map.
pub struct Mapper<M: ScanMatcher = NdtScanMatcher> {
    config: MapperConfig,
    map_config: NdtMatcherConfig,
    matcher: M,
    graph: PoseGraph,
    shared: SharedMap,
    last: Option<LastInsert>,
    unpublished: usize,
}

impl Mapper<NdtScanMatcher> {
    /// Mapper using the NDT matcher for both the rolling window and the full map.
    pub fn new(config: &NdtConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let matcher = NdtScanMatcher::new(config.matcher.clone())?;
        Self::with_matcher(matcher, config.mapper.clone(), config.matcher.clone())
    }
}

impl<M: ScanMatcher> Mapper<M> {
    /// Mapper driving a custom matcher. `map_config` sizes the published full map.
    pub fn with_matcher(
        matcher: M,
        config: MapperConfig,
        map_config: NdtMatcherConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        map_config.validate()?;
        Ok(Self {
            config,
            map_config,
            matcher,
            graph: PoseGraph::new(),
            shared: SharedMap::new(),
            last: None,
            unpublished: 0,
        })
    }

    /// Handle for readers of the published map.
    pub fn shared_map(&self) -> SharedMap {
        self.shared.clone()
    }

    /// Scans and constraints recorded so far.
    pub fn graph(&self) -> &PoseGraph {
        &self.graph
    }

    /// Mapper configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Corrected pose of the last inserted scan.
    pub fn current_pose(&self) -> Option<Pose2D> {
        self.last.map(|l| l.corrected)
    }

    /// Rebuild the full map from every stored scan and publish it.
    ///
    /// Does nothing when no scan was inserted since the last publish.
    /// Returns the current generation.
    pub fn publish(&mut self) -> u64 {
        if self.unpublished == 0 {
            return self.shared.generation();
        }
        self.unpublished = 0;
        self.publish_full_map()
    }

    /// Offer a scan taken at `odom_pose`.
    ///
    /// Returns `None` when the robot has not moved far enough since the
    /// last inserted scan.
    pub fn add_scan(&mut self, odom_pose: Pose2D, points: Vec<Point2D>) -> Option<InsertResult> {
        let Some(last) = self.last else {
            return Some(self.insert(odom_pose, odom_pose, points, None));
        };

        if !self.travelled_enough(&last.odom, &odom_pose) {
            debug!(
                "[Mapper] skipping scan, moved {:.3}m / {:.3}rad",
                last.odom.distance(&odom_pose),
                normalize_angle(odom_pose.theta - last.odom.theta).abs()
            );
            return None;
        }

        let predicted = Self::predict(&last, &odom_pose);
        let candidate = Scan::new(self.graph.scans().next_id(), predicted, points);
        let result = self.matcher.match_scan(&candidate, predicted);

        let corrected = if result.score > self.config.min_match_score {
            result.pose
        } else {
            warn!(
                "[Mapper] {} match rejected (score {:.3} <= {:.3}), keeping odometry",
                candidate.id, result.score, self.config.min_match_score
            );
            predicted
        };

        let Scan { points, .. } = candidate;
        Some(self.insert(odom_pose, corrected, points, Some((last.id, result, predicted))))
    }

    /// Gate: distance OR rotation since the last insert.
    fn travelled_enough(&self, from: &Pose2D, to: &Pose2D) -> bool {
        let distance = from.distance(to);
        let rotation = normalize_angle(to.theta - from.theta).abs();
        distance >= self.config.minimum_travel_distance
            || rotation >= self.config.minimum_travel_rotation
    }

    /// Apply the odometry delta since the last insert to its corrected pose.
    ///
    /// The world-frame odometry displacement is rotated by the heading
    /// correction accumulated so far.
    fn predict(last: &LastInsert, odom_pose: &Pose2D) -> Pose2D {
        let offset = normalize_angle(last.corrected.theta - last.odom.theta);
        let (sin_o, cos_o) = offset.sin_cos();
        let dx = odom_pose.x - last.odom.x;
        let dy = odom_pose.y - last.odom.y;
        let dtheta = normalize_angle(odom_pose.theta - last.odom.theta);
        Pose2D::new(
            last.corrected.x + dx * cos_o - dy * sin_o,
            last.corrected.y + dx * sin_o + dy * cos_o,
            normalize_angle(last.corrected.theta + dtheta),
        )
    }

    fn insert(
        &mut self,
        odom_pose: Pose2D,
        corrected: Pose2D,
        points: Vec<Point2D>,
        matched: Option<(ScanId, MatchResult, Pose2D)>,
    ) -> InsertResult {
        let id = self.graph.add_scan(corrected, points);
        let predicted = matched.as_ref().map_or(corrected, |m| m.2);

        let matched = match matched {
            Some((previous, result, _)) if result.score > self.config.min_match_score => {
                self.add_sequential(previous, id, &result);
                Some(result)
            }
            Some((_, result, _)) => Some(result),
            None => None,
        };

        self.last = Some(LastInsert {
            id,
            odom: odom_pose,
            corrected,
        });

        self.rebuild_rolling_window();
        self.unpublished += 1;
        let every = self.config.publish_every;
        let generation = if every > 0 && self.unpublished >= every {
            self.publish()
        } else {
            self.shared.generation()
        };

        info!(
            "[Mapper] inserted {} at ({:.3}, {:.3}, {:.3}), map generation {}",
            id, corrected.x, corrected.y, corrected.theta, generation
        );

        InsertResult {
            id,
            pose: corrected,
            predicted,
            matched,
            generation,
        }
    }

    fn add_sequential(&mut self, previous: ScanId, id: ScanId, result: &MatchResult) {
        let (Some(begin), Some(end)) = (self.graph.scan(previous), self.graph.scan(id)) else {
            return;
        };
        let constraint = Constraint::between(begin, end, &result.covariance);
        if let Err(e) = self.graph.add_constraint(constraint) {
            warn!("[Mapper] dropping constraint {} -> {}: {}", previous, id, e);
        }
    }

    fn rebuild_rolling_window(&mut self) {
        let window: Vec<(&Scan, Pose2D)> = self
            .graph
            .scans()
            .tail(self.config.rolling_depth)
            .iter()
            .map(|s| (s, s.pose))
            .collect();
        let inserted = self.matcher.add_scans(&window);
        debug!(
            "[Mapper] rolling window of {} scans via {}: {} points",
            window.len(),
            self.matcher.name(),
            inserted
        );
    }

    fn publish_full_map(&self) -> u64 {
        let scans: Vec<(&Scan, Pose2D)> = self.graph.scans().with_poses().collect();
        match NdtScanMatcher::build_grid(&self.map_config, &scans) {
            Some(grid) => self.shared.publish(grid, scans.len()),
            None => self.shared.generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn last(odom: Pose2D, corrected: Pose2D) -> LastInsert {
        LastInsert {
            id: ScanId(0),
            odom,
            corrected,
        }
    }

    #[test]
    fn test_predict_without_correction_follows_odometry() {
        let l = last(Pose2D::new(1.0, 2.0, 0.3), Pose2D::new(1.0, 2.0, 0.3));
        let p = Mapper::<NdtScanMatcher>::predict(&l, &Pose2D::new(1.5, 2.2, 0.4));
        assert_relative_eq!(p.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.2, epsilon = 1e-12);
        assert_relative_eq!(p.theta, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_rotates_delta_by_heading_correction() {
        // Corrected frame is turned 90° relative to odometry
        let l = last(Pose2D::new(0.0, 0.0, 0.0), Pose2D::new(5.0, 5.0, FRAC_PI_2));
        let p = Mapper::<NdtScanMatcher>::predict(&l, &Pose2D::new(1.0, 0.0, 0.1));
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 6.0, epsilon = 1e-12);
        assert_relative_eq!(p.theta, FRAC_PI_2 + 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_first_scan_is_inserted_at_odometry() {
        let mut mapper = Mapper::new(&NdtConfig::default()).unwrap();
        let pose = Pose2D::new(0.5, -0.5, 0.2);
        let points: Vec<Point2D> = (0..30)
            .map(|i| Point2D::new(2.0, -1.5 + 0.1 * i as f64))
            .collect();
        let result = mapper.add_scan(pose, points).unwrap();
        assert_eq!(result.id, ScanId(0));
        assert_eq!(result.pose, pose);
        assert!(result.matched.is_none());
        assert_eq!(result.generation, 1);
        assert_eq!(mapper.current_pose(), Some(pose));
    }

    fn wall(x: f64) -> Vec<Point2D> {
        (0..30).map(|i| Point2D::new(x, -1.5 + 0.1 * i as f64)).collect()
    }

    #[test]
    fn test_publish_every_batches_rebuilds() {
        let mut config = NdtConfig::default();
        config.mapper.publish_every = 3;
        let mut mapper = Mapper::new(&config).unwrap();

        let generations: Vec<u64> = (0..7)
            .filter_map(|i| {
                let pose = Pose2D::new(0.2 * i as f64, 0.0, 0.0);
                mapper.add_scan(pose, wall(2.0 - 0.2 * i as f64))
            })
            .map(|r| r.generation)
            .collect();
        assert_eq!(generations, vec![0, 0, 1, 1, 1, 2, 2]);
        assert_eq!(mapper.shared_map().latest().unwrap().scan_count, 6);

        // Flush the seventh scan, then nothing is pending
        assert_eq!(mapper.publish(), 3);
        assert_eq!(mapper.shared_map().latest().unwrap().scan_count, 7);
        assert_eq!(mapper.publish(), 3);
    }

    #[test]
    fn test_publish_only_on_demand() {
        let mut config = NdtConfig::default();
        config.mapper.publish_every = 0;
        let mut mapper = Mapper::new(&config).unwrap();
        let reader = mapper.shared_map();

        assert_eq!(mapper.publish(), 0);
        let result = mapper.add_scan(Pose2D::identity(), wall(2.0)).unwrap();
        assert_eq!(result.generation, 0);
        assert!(reader.latest().is_none());

        assert_eq!(mapper.publish(), 1);
        assert_eq!(reader.generation(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = NdtConfig::default();
        config.mapper.rolling_depth = 0;
        assert!(Mapper::new(&config).is_err());
    }
}
