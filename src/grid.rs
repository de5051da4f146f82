use std::collections::HashMap;

/// Cell radius used for the daily infection pass.
pub const INFECTION_CHECK_RADIUS: i32 = 2;

/// Uniform hash grid over continuous 2D space. Buckets hold indices into
/// the pool that was inserted, never owned particles; the grid is cleared
/// and rebuilt before every use.
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn cell(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Drop all bucketed indices. Bucket allocations are retained so the
    /// per-tick rebuild does not churn the allocator.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    pub fn insert(&mut self, index: usize, x: f64, y: f64) {
        let cell = self.cell(x, y);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Collect every index in the (2r+1)^2 cell block centered on the query
    /// point. O(found), unordered, duplicate-free as long as each index was
    /// inserted once per rebuild.
    pub fn query_into(&self, x: f64, y: f64, radius: i32, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell(x, y);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    pub fn nearby(&self, x: f64, y: f64, radius: i32) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(x, y, radius, &mut out);
        out
    }

    /// Smallest cell radius whose block covers a world-space distance.
    pub fn cells_for_distance(&self, distance: f64) -> i32 {
        (distance / self.cell_size).ceil() as i32
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        // 0.2 world units per cell: slightly above the default infection
        // radius, so a radius-1 block already covers direct contacts.
        Self::new(0.2)
    }
}
