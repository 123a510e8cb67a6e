//! Uniform-grid broad phase
//!
//! Buckets ball indices by the cell holding their centre. With cells at least
//! one max ball diameter wide, two overlapping balls always share a cell or sit
//! in neighbouring ones, so a 3x3 query around either finds the other.
//!
//! The grid is scratch state: cleared and refilled every sub-step. Bucket
//! vectors keep their capacity so steady-state rebuilds do not allocate.

use glam::Vec2;

use super::bounds::Bounds;

/// Upper limit on cells per axis; huge worlds get larger cells instead
pub const MAX_CELLS_PER_AXIS: usize = 1024;

/// Dense bucket grid over the world bounds
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    min_cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
    /// Cells touched since the last clear
    occupied: Vec<usize>,
    len: usize,
}

impl SpatialGrid {
    /// `min_cell_size` must be at least the largest ball diameter
    pub fn new(min_cell_size: f32, bounds: &Bounds) -> Self {
        let mut grid = Self {
            cell_size: min_cell_size,
            min_cell_size,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            occupied: Vec::new(),
            len: 0,
        };
        grid.resize(bounds);
        grid
    }

    /// Re-lay the grid over new bounds (drops all entries)
    pub fn resize(&mut self, bounds: &Bounds) {
        let cap = MAX_CELLS_PER_AXIS as f32;
        self.cell_size = self
            .min_cell_size
            .max(bounds.width / cap)
            .max(bounds.height / cap);
        self.cols = ((bounds.width / self.cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        self.rows = ((bounds.height / self.cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        self.cells.clear();
        self.cells.resize_with(self.cols * self.rows, Vec::new);
        self.occupied.clear();
        self.len = 0;
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Number of inserted entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cell coordinate for a position, clamped into the grid.
    ///
    /// Clamping is monotone, so two positions at most one cell apart stay at
    /// most one cell apart. Positions outside the bounds (a dragged ball, a
    /// contact push past a wall) land in edge cells.
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> (usize, usize) {
        let inv = 1.0 / self.cell_size;
        // `as` saturates and maps NaN to 0
        let cx = ((position.x * inv).floor() as i64).clamp(0, self.cols as i64 - 1);
        let cy = ((position.y * inv).floor() as i64).clamp(0, self.rows as i64 - 1);
        (cx as usize, cy as usize)
    }

    /// Remove all entries. O(occupied cells).
    pub fn clear(&mut self) {
        for &cell in &self.occupied {
            self.cells[cell].clear();
        }
        self.occupied.clear();
        self.len = 0;
    }

    /// Bucket an index by its centre. O(1).
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let (cx, cy) = self.cell_of(position);
        let cell = cy * self.cols + cx;
        let bucket = &mut self.cells[cell];
        if bucket.is_empty() {
            self.occupied.push(cell);
        }
        bucket.push(index);
        self.len += 1;
    }

    /// Fill `out` with every index in the 3x3 block around `position`.
    ///
    /// The querying entity's own index is included when it was inserted;
    /// callers filter self-pairs.
    pub fn query_nearby(&self, position: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_of(position);
        let x0 = cx.saturating_sub(1);
        let x1 = (cx + 1).min(self.cols - 1);
        let y0 = cy.saturating_sub(1);
        let y1 = (cy + 1).min(self.rows - 1);
        for y in y0..=y1 {
            let row = y * self.cols;
            for x in x0..=x1 {
                out.extend_from_slice(&self.cells[row + x]);
            }
        }
    }
}
