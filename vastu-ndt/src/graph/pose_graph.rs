//! Scan container with relative-pose constraints.
//!
//! The graph only stores nodes and edges; it does not optimise. A back-end
//! consumes [`PoseGraph::constraints`] and writes corrected poses back with
//! [`PoseGraph::set_pose`].

use thiserror::Error;

use crate::core::{Point2D, Pose2D, Scan, ScanId, ScanStore};

use super::constraint::{Constraint, ConstraintKind};

/// Pose graph errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The id does not name a stored scan
    #[error("unknown scan {0}")]
    UnknownScan(ScanId),
}

/// How [`PoseGraph::find_nearest`] measures scan positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NearestMode {
    /// Scan poses
    #[default]
    Pose,
    /// Centroids of the scans' world-frame points
    Barycenter,
}

/// Scans plus sequential and loop-closure constraints.
#[derive(Clone, Debug, Default)]
pub struct PoseGraph {
    scans: ScanStore,
    sequential: Vec<Constraint>,
    loop_closures: Vec<Constraint>,
}

impl PoseGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scan node.
    pub fn add_scan(&mut self, pose: Pose2D, points: Vec<Point2D>) -> ScanId {
        self.scans.push(pose, points)
    }

    /// Add an edge. Both ends must be stored scans.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), GraphError> {
        for id in [constraint.begin, constraint.end] {
            if !self.scans.contains(id) {
                return Err(GraphError::UnknownScan(id));
            }
        }
        match constraint.kind {
            ConstraintKind::Sequential => self.sequential.push(constraint),
            ConstraintKind::LoopClosure => self.loop_closures.push(constraint),
        }
        Ok(())
    }

    /// Look up a scan.
    pub fn scan(&self, id: ScanId) -> Option<&Scan> {
        self.scans.get(id)
    }

    /// All scans.
    pub fn scans(&self) -> &ScanStore {
        &self.scans
    }

    /// Overwrite a scan pose.
    pub fn set_pose(&mut self, id: ScanId, pose: Pose2D) -> Result<(), GraphError> {
        if self.scans.set_pose(id, pose) {
            Ok(())
        } else {
            Err(GraphError::UnknownScan(id))
        }
    }

    /// Sequential edges in insertion order.
    pub fn sequential(&self) -> &[Constraint] {
        &self.sequential
    }

    /// Loop-closure edges in insertion order.
    pub fn loop_closures(&self) -> &[Constraint] {
        &self.loop_closures
    }

    /// Every edge, sequential first.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.sequential.iter().chain(self.loop_closures.iter())
    }

    /// Number of scans.
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// True if the graph holds no scans.
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Scans within `max_distance` of scan `id`, nearest first.
    ///
    /// Only scans with an index below `before` are considered when it is
    /// given (typically to skip recent scans when looking for loop
    /// closures). The query scan itself is never returned.
    pub fn find_nearest(
        &self,
        id: ScanId,
        max_distance: f64,
        before: Option<ScanId>,
        mode: NearestMode,
    ) -> Result<Vec<(ScanId, f64)>, GraphError> {
        let query = self.scans.get(id).ok_or(GraphError::UnknownScan(id))?;
        let anchor = Self::position(query, mode);
        let limit = before.map_or(self.scans.len(), |b| b.index().min(self.scans.len()));

        // Linear scan: trajectories often share a coordinate exactly, which
        // bucketed k-d trees handle poorly
        let mut nearest: Vec<(ScanId, f64)> = self
            .scans
            .iter()
            .take(limit)
            .filter(|s| s.id != id)
            .map(|s| (s.id, anchor.distance(&Self::position(s, mode))))
            .filter(|&(_, d)| d <= max_distance)
            .collect();

        nearest.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(nearest)
    }

    fn position(scan: &Scan, mode: NearestMode) -> Point2D {
        match mode {
            NearestMode::Pose => scan.pose.position(),
            NearestMode::Barycenter => scan.barycenter().position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Covariance3;

    fn line_graph(n: usize) -> PoseGraph {
        let mut graph = PoseGraph::new();
        for i in 0..n {
            graph.add_scan(Pose2D::new(i as f64, 0.0, 0.0), vec![Point2D::new(0.0, 1.0)]);
        }
        graph
    }

    #[test]
    fn test_add_constraint_checks_ids() {
        let mut graph = line_graph(2);
        let a = graph.scan(ScanId(0)).cloned().unwrap();
        let b = graph.scan(ScanId(1)).cloned().unwrap();
        let c = Constraint::between(&a, &b, &Covariance3::diagonal(0.01, 0.01, 0.01));
        assert!(graph.add_constraint(c.clone()).is_ok());
        assert_eq!(graph.sequential().len(), 1);

        let mut bad = c.clone();
        bad.end = ScanId(9);
        assert_eq!(
            graph.add_constraint(bad),
            Err(GraphError::UnknownScan(ScanId(9)))
        );

        graph
            .add_constraint(c.with_kind(ConstraintKind::LoopClosure))
            .unwrap();
        assert_eq!(graph.loop_closures().len(), 1);
        assert_eq!(graph.constraints().count(), 2);
    }

    #[test]
    fn test_find_nearest_sorted_and_bounded() {
        let graph = line_graph(6);
        let found = graph
            .find_nearest(ScanId(2), 1.5, None, NearestMode::Pose)
            .unwrap();
        let ids: Vec<ScanId> = found.iter().map(|(id, _)| *id).collect();
        // Equal distances break ties by id
        assert_eq!(ids, vec![ScanId(1), ScanId(3)]);

        let found = graph
            .find_nearest(ScanId(5), 10.0, None, NearestMode::Pose)
            .unwrap();
        assert_eq!(found.first().map(|f| f.0), Some(ScanId(4)));
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_find_nearest_respects_index_limit() {
        let graph = line_graph(6);
        let found = graph
            .find_nearest(ScanId(5), 10.0, Some(ScanId(3)), NearestMode::Pose)
            .unwrap();
        let ids: Vec<ScanId> = found.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![ScanId(2), ScanId(1), ScanId(0)]);
    }

    #[test]
    fn test_find_nearest_barycenter() {
        let mut graph = PoseGraph::new();
        // Looking at the same wall point from opposite sides
        let a = graph.add_scan(Pose2D::new(0.0, 0.0, 0.0), vec![Point2D::new(2.0, 0.0)]);
        let b = graph.add_scan(Pose2D::new(4.0, 0.0, std::f64::consts::PI), vec![Point2D::new(2.0, 0.0)]);

        let by_pose = graph.find_nearest(a, 1.0, None, NearestMode::Pose).unwrap();
        assert!(by_pose.is_empty());

        let by_center = graph
            .find_nearest(a, 1.0, None, NearestMode::Barycenter)
            .unwrap();
        assert_eq!(by_center.len(), 1);
        assert_eq!(by_center[0].0, b);
        assert!(by_center[0].1 < 1e-9);
    }

    #[test]
    fn test_unknown_query() {
        let graph = line_graph(1);
        assert!(graph
            .find_nearest(ScanId(4), 1.0, None, NearestMode::Pose)
            .is_err());
    }
}
