//! # Spatial Hash Grid
//!
//! Maps integer cell coordinates to the keys whose bounding square touches
//! that cell. Updates are incremental: the caller keeps the [`CellRange`] a
//! key was last inserted with and hands it back on `relocate`/`remove`, so
//! only movers pay, and only when they cross a cell border.
//!
//! Empty cells are pruned immediately; the map never holds an empty set.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use skirmish_shared::Vec2;

/// Integer cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Cell {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing `point` for the given `cell_size` (floor division).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(point: Vec2, cell_size: f32) -> Self {
        Self::new(
            (point.x / cell_size).floor() as i32,
            (point.y / cell_size).floor() as i32,
        )
    }
}

/// Inclusive rectangle of cells, the footprint of one bounding square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Lowest corner (inclusive)
    pub min: Cell,
    /// Highest corner (inclusive)
    pub max: Cell,
}

impl CellRange {
    /// Footprint of the square `center ± radius`.
    #[must_use]
    pub fn around(center: Vec2, radius: f32, cell_size: f32) -> Self {
        let extent = Vec2::splat(radius);
        Self {
            min: Cell::containing(center - extent, cell_size),
            max: Cell::containing(center + extent, cell_size),
        }
    }

    /// True if `cell` lies inside the range.
    #[inline]
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Number of cells covered.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = (self.max.x - self.min.x + 1).unsigned_abs() as usize;
        let height = (self.max.y - self.min.y + 1).unsigned_abs() as usize;
        width * height
    }

    /// Every cell in the range, row by row.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| Cell::new(x, y)))
    }
}

/// Uniform-grid spatial hash over keys of type `K`.
///
/// # Example
///
/// ```rust
/// use skirmish_core::{Cell, SpatialHashGrid};
/// use skirmish_shared::Vec2;
///
/// let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(64.0);
/// let range = grid.insert(1, Vec2::ZERO, 10.0);
/// assert_eq!(range.cell_count(), 4);
/// assert!(grid.contains(1, Cell::new(-1, -1)));
///
/// grid.remove(1, range);
/// assert!(grid.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct SpatialHashGrid<K> {
    cell_size: f32,
    cells: HashMap<Cell, BTreeSet<K>>,
}

impl<K: Copy + Eq + Hash + Ord> SpatialHashGrid<K> {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics unless `cell_size` is finite and positive.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size must be positive, got {cell_size}"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Edge length of one cell.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Footprint of a circle in this grid.
    #[inline]
    #[must_use]
    pub fn range_of(&self, center: Vec2, radius: f32) -> CellRange {
        CellRange::around(center, radius, self.cell_size)
    }

    /// Adds `key` to every cell its bounding square covers and returns the
    /// range to cache.
    pub fn insert(&mut self, key: K, center: Vec2, radius: f32) -> CellRange {
        let range = self.range_of(center, radius);
        for cell in range.cells() {
            self.cells.entry(cell).or_default().insert(key);
        }
        range
    }

    /// Updates membership of `key` after it moved. `previous` is the range
    /// returned by the last `insert`/`relocate`. Returns the new range.
    pub fn relocate(&mut self, key: K, previous: CellRange, center: Vec2, radius: f32) -> CellRange {
        let range = self.range_of(center, radius);
        if range == previous {
            return range;
        }

        for cell in previous.cells().filter(|cell| !range.contains(*cell)) {
            self.discard(key, cell);
        }
        for cell in range.cells().filter(|cell| !previous.contains(*cell)) {
            self.cells.entry(cell).or_default().insert(key);
        }
        range
    }

    /// Drops `key` from every cell of `range`.
    pub fn remove(&mut self, key: K, range: CellRange) {
        for cell in range.cells() {
            self.discard(key, cell);
        }
    }

    /// Adds every key sharing a cell of `range` to `out`, except `exclude`.
    pub fn query_into(&self, range: CellRange, exclude: K, out: &mut BTreeSet<K>) {
        for cell in range.cells() {
            if let Some(members) = self.cells.get(&cell) {
                out.extend(members.iter().copied().filter(|key| *key != exclude));
            }
        }
    }

    /// Keys sharing a cell of `range`, except `exclude`, in ascending order.
    #[must_use]
    pub fn query(&self, range: CellRange, exclude: K) -> BTreeSet<K> {
        let mut out = BTreeSet::new();
        self.query_into(range, exclude, &mut out);
        out
    }

    /// Members of one cell.
    #[must_use]
    pub fn members(&self, cell: Cell) -> Option<&BTreeSet<K>> {
        self.cells.get(&cell)
    }

    /// True if `key` is registered in `cell`.
    #[must_use]
    pub fn contains(&self, key: K, cell: Cell) -> bool {
        self.cells.get(&cell).is_some_and(|members| members.contains(&key))
    }

    /// Every cell `key` is registered in, sorted.
    ///
    /// Scans the whole grid; meant for verification, not the hot path.
    #[must_use]
    pub fn cells_of(&self, key: K) -> BTreeSet<Cell> {
        self.cells
            .iter()
            .filter(|(_, members)| members.contains(&key))
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Number of non-empty cells.
    #[inline]
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// True when no key is registered anywhere.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    fn discard(&mut self, key: K, cell: Cell) {
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(&key);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_hashing_handles_negatives() {
        assert_eq!(Cell::containing(Vec2::new(-0.5, 0.5), 64.0), Cell::new(-1, 0));
        assert_eq!(Cell::containing(Vec2::new(64.0, -64.0), 64.0), Cell::new(1, -1));
        assert_eq!(Cell::containing(Vec2::new(-64.1, 63.9), 64.0), Cell::new(-2, 0));
    }

    #[test]
    fn test_insert_covers_bounding_square() {
        let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(64.0);
        let range = grid.insert(7, Vec2::ZERO, 10.0);

        let expected: BTreeSet<Cell> = [
            Cell::new(-1, -1),
            Cell::new(0, -1),
            Cell::new(-1, 0),
            Cell::new(0, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(grid.cells_of(7), expected);
        assert_eq!(range.cells().collect::<BTreeSet<_>>(), expected);
        assert_eq!(grid.occupied_cells(), 4);
    }

    #[test]
    fn test_relocate_prunes_and_adds() {
        let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(10.0);
        let start = grid.insert(1, Vec2::new(5.0, 5.0), 1.0);
        assert_eq!(start.cell_count(), 1);

        let moved = grid.relocate(1, start, Vec2::new(10.0, 5.0), 1.0);
        assert_eq!(moved.min, Cell::new(0, 0));
        assert_eq!(moved.max, Cell::new(1, 0));
        assert_eq!(grid.cells_of(1), moved.cells().collect::<BTreeSet<_>>());

        let far = grid.relocate(1, moved, Vec2::new(55.0, 55.0), 1.0);
        assert_eq!(grid.cells_of(1), far.cells().collect::<BTreeSet<_>>());
        assert_eq!(grid.occupied_cells(), 1);
    }

    #[test]
    fn test_relocate_within_cell_is_noop() {
        let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(10.0);
        let range = grid.insert(1, Vec2::new(5.0, 5.0), 1.0);
        let same = grid.relocate(1, range, Vec2::new(6.0, 4.0), 1.0);
        assert_eq!(same, range);
        assert!(grid.contains(1, Cell::new(0, 0)));
    }

    #[test]
    fn test_remove_prunes_empty_cells() {
        let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(10.0);
        let a = grid.insert(1, Vec2::new(5.0, 5.0), 1.0);
        let b = grid.insert(2, Vec2::new(5.0, 5.0), 6.0);
        grid.remove(2, b);
        assert_eq!(grid.occupied_cells(), 1);
        grid.remove(1, a);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_query_excludes_self_and_dedups() {
        let mut grid: SpatialHashGrid<u32> = SpatialHashGrid::new(10.0);
        let a = grid.insert(1, Vec2::new(10.0, 10.0), 3.0);
        grid.insert(2, Vec2::new(10.0, 10.0), 3.0);
        grid.insert(3, Vec2::new(95.0, 95.0), 1.0);

        let found = grid.query(a, 1);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    #[should_panic(expected = "cell size must be positive")]
    fn test_zero_cell_size_panics() {
        let _grid: SpatialHashGrid<u32> = SpatialHashGrid::new(0.0);
    }
}
