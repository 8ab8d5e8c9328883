//! Latest-map hand-off between the mapper and readers.
//!
//! The mapper builds a complete [`NdtGrid`] off to the side and swaps it in
//! as an immutable [`MapSnapshot`]. Readers clone the `Arc` under a short
//! lock and query it without blocking the producer. Each publish bumps the
//! generation so a reader can tell whether it has seen the latest map.
//!
//! ```text
//!   Mapper ──publish(grid)──▶ Mutex<Option<Arc<MapSnapshot>>> ──latest()──▶ readers
//!                               generation: 1, 2, 3, ...
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::ndt::NdtGrid;

/// Immutable published map.
#[derive(Debug)]
pub struct MapSnapshot {
    /// Publish counter, starting at 1
    pub generation: u64,
    /// Number of scans the map was built from
    pub scan_count: usize,
    /// The map
    pub grid: NdtGrid,
}

/// Cloneable handle to the most recently published map.
#[derive(Clone, Debug, Default)]
pub struct SharedMap {
    latest: Arc<Mutex<Option<Arc<MapSnapshot>>>>,
}

impl SharedMap {
    /// Handle with nothing published.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current map. Returns the new generation.
    pub fn publish(&self, grid: NdtGrid, scan_count: usize) -> u64 {
        let mut latest = self.latest.lock();
        let generation = latest.as_ref().map_or(1, |s| s.generation + 1);
        *latest = Some(Arc::new(MapSnapshot {
            generation,
            scan_count,
            grid,
        }));
        generation
    }

    /// Current map, if one has been published.
    pub fn latest(&self) -> Option<Arc<MapSnapshot>> {
        self.latest.lock().clone()
    }

    /// Generation of the current map; 0 before the first publish.
    pub fn generation(&self) -> u64 {
        self.latest.lock().as_ref().map_or(0, |s| s.generation)
    }

    /// Forget the current map. The generation counter restarts.
    pub fn clear(&self) {
        *self.latest.lock() = None;
    }
}
