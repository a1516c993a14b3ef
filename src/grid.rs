//! Occupancy grid and cell encoding.
//!
//! This module contains the integer-coded grid the grassfire search mutates in place, along with
//! grid construction with random obstacle placement and the reset pass run before every replay.

use std::fmt;

use rand::Rng;

/// Cell code of the single search origin. It aliases the visited depth `0`.
pub const START: i32 = 0;
/// Cell code of the single search target.
pub const DEST: i32 = -1;
/// Cell code of a cell not yet reached by the search.
pub const UNVIS: i32 = -2;
/// Cell code of an impassable cell.
pub const OBST: i32 = -3;
/// Cell code of a cell reconstructed as part of the final route.
pub const PATH: i32 = -4;

/// Zero-based position of a cell in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Row index, counted from the top edge.
    pub row: usize,
    /// Column index, counted from the left edge.
    pub col: usize,
}

impl Coord {
    /// Builds a coordinate from a row and a column index.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns whether both coordinates are 4-connected neighbors.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// Neighbor rotation as `(row, col)` offsets: up, right, down, left.
///
/// Both the forward expansion and the backtrack walk visit neighbors in this order, which makes
/// tie-breaking between equally short routes deterministic.
const ROTATION: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Two-dimensional occupancy grid of integer-coded cells.
///
/// The grid has fixed dimensions set at construction and stores its cells in row-major order.
/// Each cell holds one of the codes defined in this module or a positive visited depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Cell values in row-major order.
    cells: Vec<i32>,
}

impl Grid {
    /// Allocates a grid with every cell set to [`UNVIS`].
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![UNVIS; rows.saturating_mul(cols)],
        }
    }

    /// Builds a grid from rows of cell values.
    ///
    /// Rows shorter than the first one are padded with [`UNVIS`] and longer rows are truncated, so
    /// the result is always rectangular.
    #[must_use]
    pub fn from_rows(rows: &[Vec<i32>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut grid = Self::new(rows.len(), cols);

        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, value) in row.iter().take(cols).enumerate() {
                grid.set(Coord::new(row_idx, col_idx), *value);
            }
        }

        grid
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the flat index of a coordinate, or `None` when it lies outside the grid.
    const fn index(&self, coord: Coord) -> Option<usize> {
        if coord.row < self.rows && coord.col < self.cols {
            Some(coord.row * self.cols + coord.col)
        } else {
            None
        }
    }

    /// Returns the value of a cell, or `None` when the coordinate is out of bounds.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<i32> {
        self.index(coord)
            .and_then(|idx| self.cells.get(idx))
            .copied()
    }

    /// Overwrites the value of a cell. Out-of-bounds coordinates are ignored.
    pub fn set(&mut self, coord: Coord, value: i32) {
        if let Some(cell) = self.index(coord).and_then(|idx| self.cells.get_mut(idx)) {
            *cell = value;
        }
    }

    /// Returns the first cell, in row-major order, holding the given value.
    #[must_use]
    pub fn find(&self, value: i32) -> Option<Coord> {
        self.cells
            .iter()
            .position(|cell| *cell == value)
            .map(|idx| self.coord_of(idx))
    }

    /// Returns every cell holding the given value, in row-major order.
    #[must_use]
    pub fn cells_with(&self, value: i32) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == value)
            .map(|(idx, _)| self.coord_of(idx))
            .collect()
    }

    /// Counts the cells holding the given value.
    #[must_use]
    pub fn count(&self, value: i32) -> usize {
        self.cells.iter().filter(|cell| **cell == value).count()
    }

    /// Returns the in-bounds 4-connected neighbors of a cell in rotation order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        ROTATION.into_iter().filter_map(move |(d_row, d_col)| {
            let neighbor = Coord::new(
                coord.row.checked_add_signed(d_row)?,
                coord.col.checked_add_signed(d_col)?,
            );
            self.index(neighbor).map(|_| neighbor)
        })
    }

    /// Iterates over every cell as a `(coordinate, value)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, i32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, value)| (self.coord_of(idx), *value))
    }

    /// Converts a flat index back into a coordinate.
    const fn coord_of(&self, idx: usize) -> Coord {
        Coord::new(idx / self.cols, idx % self.cols)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            for value in row {
                let symbol = match *value {
                    START => 'S',
                    DEST => 'D',
                    UNVIS => '.',
                    OBST => '#',
                    PATH => '*',
                    _ => 'o',
                };
                write!(formatter, "{symbol}")?;
            }
            writeln!(formatter)?;
        }

        Ok(())
    }
}

/// Returns the number of obstacles a grid of the given size receives at the given density.
///
/// The product `rows * cols * percent / 100` is rounded to the nearest integer.
#[must_use]
pub fn obstacle_count(rows: usize, cols: usize, obstacle_percent: u8) -> usize {
    let area = u64::try_from(rows.saturating_mul(cols)).unwrap_or(u64::MAX);
    let scaled = area.saturating_mul(u64::from(obstacle_percent));

    usize::try_from(rounded_div::u64(scaled, 100)).unwrap_or(usize::MAX)
}

/// Creates a grid with its start, destination and randomly placed obstacles.
///
/// The grid starts with every cell [`UNVIS`], [`START`] is placed on the top row at `start_col`
/// and [`DEST`] at `(dest_row, dest_col)`, all zero-based. Obstacles are then placed by drawing
/// uniformly random cells from `rng` until [`obstacle_count`] cells are [`OBST`]; draws landing on
/// an obstacle, the start or the destination are retried.
///
/// Arguments are not validated. With a density close to 100% the retry loop may run for a very
/// long time, and a count exceeding the free cells never terminates. Callers are expected to run
/// [`crate::config::GridConfig::validate`] first.
#[must_use]
pub fn create_grid<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    start_col: usize,
    dest_row: usize,
    dest_col: usize,
    obstacle_percent: u8,
    rng: &mut R,
) -> Grid {
    let mut grid = Grid::new(rows, cols);
    grid.set(Coord::new(0, start_col), START);
    grid.set(Coord::new(dest_row, dest_col), DEST);

    let target = obstacle_count(rows, cols, obstacle_percent);
    let mut placed = 0;
    while placed < target {
        let coord = Coord::new(rng.random_range(0..rows), rng.random_range(0..cols));

        if matches!(grid.get(coord), Some(OBST | START | DEST)) {
            continue;
        }
        grid.set(coord, OBST);
        placed += 1;
    }

    log::debug!("created {rows}x{cols} grid with {placed} obstacles");

    grid
}

/// Clears every cell that is not [`OBST`], [`START`] or [`DEST`] back to [`UNVIS`].
///
/// Depth values and [`PATH`] markers from a previous run are dropped; applying the reset twice is
/// the same as applying it once.
pub fn reset_grid(grid: &mut Grid) {
    for cell in &mut grid.cells {
        if !matches!(*cell, OBST | START | DEST) {
            *cell = UNVIS;
        }
    }
}
