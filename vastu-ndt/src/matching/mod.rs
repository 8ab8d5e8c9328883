//! NDT scan matching.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     NDT MATCHING PIPELINE                        │
//! │                                                                  │
//! │  reference scans + poses          new scan + initial pose        │
//! │       │                                 │                        │
//! │       ▼                                 ▼                        │
//! │  ┌───────────────┐              ┌───────────────┐                │
//! │  │  add_scans    │              │ range filter  │                │
//! │  │ (grid ± range)│              │ + sub-sample  │                │
//! │  └───────────────┘              └───────────────┘                │
//! │       │                                 │                        │
//! │       ▼                                 ▼                        │
//! │    NdtGrid ───────────────────▶ correlative search (θ, y, x)     │
//! │                                         │                        │
//! │                                         ▼                        │
//! │                         MatchResult { pose, score, covariance }  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`NdtMatcherConfig`] | Grid resolution, search window, range limit |
//! | [`NdtScanMatcher`] | Map building, scoring and exhaustive search |
//! | [`SearchWindow`] | Candidate offsets and enumeration order |
//! | [`SurfaceMoments`] | Covariance from the score surface |
//! | [`ScanMatcher`] | Matcher interface used by the mapper |
//!
//! ## Example
//!
//! ```rust
//! use vastu_ndt::core::{Point2D, Pose2D, ScanStore};
//! use vastu_ndt::matching::{NdtMatcherConfig, NdtScanMatcher};
//!
//! let mut store = ScanStore::new();
//! let wall: Vec<Point2D> = (0..40)
//!     .map(|i| Point2D::new(1.0, -1.0 + 0.05 * i as f64))
//!     .collect();
//! store.push(Pose2D::identity(), wall.clone());
//! let id = store.push(Pose2D::identity(), wall);
//!
//! let mut matcher = NdtScanMatcher::new(NdtMatcherConfig::default()).unwrap();
//! matcher.add_scans(store.with_poses().take(1));
//!
//! let scan = store.get(id).unwrap();
//! let result = matcher.match_scan(scan, scan.pose, 0);
//! assert!(result.score > 0.0);
//! ```

mod config;
mod matcher;
mod search;
mod traits;
mod types;

pub use config::NdtMatcherConfig;
pub use matcher::NdtScanMatcher;
pub use search::{BestCandidate, SearchWindow, SurfaceMoments};
pub use traits::ScanMatcher;
pub use types::{Covariance3, MatchResult};
