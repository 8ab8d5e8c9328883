//! Rolling NDT mapper on a simulated L-shaped drive with drifting odometry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example rolling_mapper -- [config.yaml]
//! ```
//!
//! Prints corrected and odometry errors per inserted scan, then the final
//! occupancy raster as ASCII.

use std::f64::consts::{PI, TAU};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vastu_ndt::mapping::OCCUPIED;
use vastu_ndt::{Mapper, NdtConfig, OccupancyRaster, Pose2D, Scan, ScanId};

const NUM_RAYS: usize = 360;
const ROOM: (f64, f64) = (8.0, 6.0);

/// Ranges from `pose` to the walls of the room and a pillar.
fn simulate_ranges(pose: &Pose2D, rng: &mut StdRng, max_range: f64) -> Vec<f64> {
    let increment = TAU / NUM_RAYS as f64;
    // Pillar occupying [4.0, 4.6] x [2.4, 3.0]
    let boxes = [(0.0, 0.0, ROOM.0, ROOM.1, true), (4.0, 2.4, 4.6, 3.0, false)];

    (0..NUM_RAYS)
        .map(|i| {
            let angle = pose.theta - PI + i as f64 * increment;
            let (sin_a, cos_a) = angle.sin_cos();
            let mut range = f64::INFINITY;

            for &(min_x, min_y, max_x, max_y, _) in &boxes {
                for x in [min_x, max_x] {
                    if cos_a.abs() > 1e-12 {
                        let t = (x - pose.x) / cos_a;
                        let y = pose.y + t * sin_a;
                        if t > 0.0 && y >= min_y && y <= max_y {
                            range = range.min(t);
                        }
                    }
                }
                for y in [min_y, max_y] {
                    if sin_a.abs() > 1e-12 {
                        let t = (y - pose.y) / sin_a;
                        let x = pose.x + t * cos_a;
                        if t > 0.0 && x >= min_x && x <= max_x {
                            range = range.min(t);
                        }
                    }
                }
            }

            if range > max_range {
                // No return
                f64::NAN
            } else {
                range + rng.random_range(-0.005..0.005)
            }
        })
        .collect()
}

/// Ground truth: east along y = 1.5, then a quarter turn and north.
fn trajectory() -> Vec<Pose2D> {
    let mut poses = Vec::new();
    for i in 0..=40 {
        poses.push(Pose2D::new(1.5 + 0.1 * i as f64, 1.5, 0.0));
    }
    for i in 1..=20 {
        poses.push(Pose2D::new(5.5, 1.5, (PI / 2.0) * i as f64 / 20.0));
    }
    for i in 1..=30 {
        poses.push(Pose2D::new(5.5, 1.5 + 0.1 * i as f64, PI / 2.0));
    }
    poses
}

fn print_raster(raster: &OccupancyRaster) {
    // One character per 4x4 raster cells
    for row in (0..raster.height).step_by(4).rev() {
        let line: String = (0..raster.width)
            .step_by(4)
            .map(|col| match raster.get(col, row) {
                Some(OCCUPIED) => '#',
                _ => '.',
            })
            .collect();
        if line.contains('#') {
            println!("{}", line.trim_end_matches('.'));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => NdtConfig::load(Path::new(&path))?,
        None => NdtConfig::load_default()?,
    };
    log::info!(
        "Matcher: {} candidates per match, {} points",
        config.matcher.search_space_size(),
        config.matcher.scan_points_to_use
    );

    let mut mapper = Mapper::new(&config)?;
    let map = mapper.shared_map();
    let mut rng = StdRng::seed_from_u64(7);

    // Odometry over-reports distance by 4% and drifts in heading
    let truth = trajectory();
    let mut odom = truth[0];
    let mut previous = truth[0];
    let mut inserted = 0usize;

    for pose in &truth {
        let delta = previous.inverse().compose(pose);
        let noisy = Pose2D::new(delta.x * 1.04, delta.y * 1.04, delta.theta + 0.002);
        odom = odom.compose(&noisy);
        previous = *pose;

        let ranges = simulate_ranges(pose, &mut rng, config.matcher.range_max);
        let scan = Scan::from_ranges(ScanId(0), odom, &ranges, -PI, TAU / NUM_RAYS as f64);

        if let Some(result) = mapper.add_scan(odom, scan.points) {
            inserted += 1;
            println!(
                "{:>8}  corrected err {:.3}m  odometry err {:.3}m  score {:.1}",
                result.id.to_string(),
                result.pose.distance(pose),
                odom.distance(pose),
                result.matched.as_ref().map_or(0.0, |m| m.score),
            );
        }
    }

    let Some(snapshot) = map.latest() else {
        log::warn!("No map was published");
        return Ok(());
    };
    log::info!(
        "Inserted {} scans, {} constraints, map generation {} with {} valid cells",
        inserted,
        mapper.graph().constraints().count(),
        snapshot.generation,
        snapshot.grid.valid_cells()
    );

    let raster = OccupancyRaster::sample(&snapshot.grid, &config.occupancy);
    println!(
        "\nOccupancy {}x{} at {}m, {} occupied",
        raster.width,
        raster.height,
        raster.resolution,
        raster.occupied_count()
    );
    print_raster(&raster);
    Ok(())
}
