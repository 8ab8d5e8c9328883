//! Rolling mapper behaviour on simulated trajectories.

mod common;

use std::thread;

use common::{assert_poses_close, cast_points, room, straight_trajectory};
use vastu_ndt::graph::{ConstraintKind, NearestMode};
use vastu_ndt::mapping::{FREE, Mapper, OccupancyRaster};
use vastu_ndt::matching::NdtMatcherConfig;
use vastu_ndt::{NdtConfig, Point2D, Pose2D, ScanId};

const RAYS: usize = 360;

/// Coarse search steps keep the runs short.
fn config() -> NdtConfig {
    NdtConfig {
        matcher: NdtMatcherConfig::fast(),
        ..Default::default()
    }
}

#[test]
fn test_travel_gate_skips_small_moves() {
    let walls = room(6.0, 4.0);
    let mut mapper = Mapper::new(&config()).unwrap();

    let start = Pose2D::new(2.9, 1.9, 0.0);
    assert!(mapper.add_scan(start, cast_points(&walls, start, RAYS, 12.0)).is_some());

    // 5cm and 0.5rad are both under the thresholds
    let small = Pose2D::new(2.95, 1.9, 0.0);
    assert!(mapper.add_scan(small, cast_points(&walls, small, RAYS, 12.0)).is_none());
    let turn = Pose2D::new(2.9, 1.9, 0.5);
    assert!(mapper.add_scan(turn, cast_points(&walls, turn, RAYS, 12.0)).is_none());

    // Rotation alone past the threshold inserts
    let big_turn = Pose2D::new(2.9, 1.9, 1.1);
    let result = mapper
        .add_scan(big_turn, cast_points(&walls, big_turn, RAYS, 12.0))
        .unwrap();
    assert_eq!(result.id, ScanId(1));
    assert_eq!(mapper.graph().len(), 2);
}

#[test]
fn test_straight_run_builds_sequential_chain() {
    let walls = room(6.0, 4.0);
    let mut mapper = Mapper::new(&config()).unwrap();
    let reader = mapper.shared_map();

    let trajectory = straight_trajectory(Pose2D::new(2.4, 1.9, 0.0), 21, 0.06);
    let mut inserted = Vec::new();
    for pose in &trajectory {
        if let Some(result) = mapper.add_scan(*pose, cast_points(&walls, *pose, RAYS, 12.0)) {
            inserted.push((*pose, result));
        }
    }

    // 6cm steps: every other pose clears the 0.1m gate
    assert_eq!(inserted.len(), 11);
    let graph = mapper.graph();
    assert_eq!(graph.sequential().len(), 10);
    assert!(graph.loop_closures().is_empty());
    assert!(
        graph
            .sequential()
            .iter()
            .all(|c| c.kind == ConstraintKind::Sequential && c.end.index() == c.begin.index() + 1)
    );

    for (truth, result) in &inserted {
        assert_poses_close(&result.pose, truth, 0.02, 0.01);
    }

    // Generations count inserts
    let generations: Vec<u64> = inserted.iter().map(|(_, r)| r.generation).collect();
    assert!(generations.windows(2).all(|w| w[1] == w[0] + 1));
    let snapshot = reader.latest().unwrap();
    assert_eq!(snapshot.generation, 11);
    assert_eq!(snapshot.scan_count, 11);

    let nearest = graph
        .find_nearest(ScanId(10), 0.25, None, NearestMode::Pose)
        .unwrap();
    assert_eq!(nearest.first().map(|n| n.0), Some(ScanId(9)));
}

#[test]
fn test_odometry_drift_is_corrected() {
    let walls = room(6.0, 4.0);
    let mut mapper = Mapper::new(&config()).unwrap();

    let start = Pose2D::new(2.4, 1.9, 0.0);
    mapper.add_scan(start, cast_points(&walls, start, RAYS, 12.0));

    // Odometry claims 0.15m but the robot moved 0.12m
    let truth = Pose2D::new(2.52, 1.9, 0.0);
    let odom = Pose2D::new(2.55, 1.9, 0.0);
    let result = mapper
        .add_scan(odom, cast_points(&walls, truth, RAYS, 12.0))
        .unwrap();

    assert_poses_close(&result.predicted, &odom, 1e-9, 1e-9);
    assert!(result.matched.as_ref().is_some_and(|m| m.is_match()));
    assert_poses_close(&result.pose, &truth, 0.011, 0.011);
}

#[test]
fn test_snapshots_are_readable_from_other_threads() {
    let walls = room(6.0, 4.0);
    let mut mapper = Mapper::new(&config()).unwrap();
    let reader = mapper.shared_map();

    let watcher = thread::spawn(move || {
        let mut last = 0;
        while last < 3 {
            if let Some(snapshot) = reader.latest() {
                assert!(snapshot.generation >= last);
                assert!(snapshot.grid.valid_cells() > 0);
                last = snapshot.generation;
            }
            thread::yield_now();
        }
        last
    });

    for pose in straight_trajectory(Pose2D::new(2.4, 1.9, 0.0), 3, 0.15) {
        mapper.add_scan(pose, cast_points(&walls, pose, RAYS, 12.0));
    }
    assert_eq!(watcher.join().unwrap(), 3);
}

#[test]
fn test_published_map_rasterises_walls() {
    let walls = room(6.0, 4.0);
    let config = config();
    let mut mapper = Mapper::new(&config).unwrap();
    let pose = Pose2D::new(2.9, 1.9, 0.0);
    mapper.add_scan(pose, cast_points(&walls, pose, RAYS, 12.0));

    let snapshot = mapper.shared_map().latest().unwrap();
    let raster = OccupancyRaster::sample(&snapshot.grid, &config.occupancy);
    assert!(raster.occupied_count() > 0);
    // The room centre is open space
    assert_eq!(
        raster.at(&Point2D::new(3.0, 2.0)),
        Some(FREE)
    );
}
