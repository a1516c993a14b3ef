//! Grassfire search engine.
//!
//! This module contains the breadth-first flood fill that expands depth layers outward from the
//! start cell, and the backtrack walk that reconstructs the shortest route from the recorded
//! depths. The search is a resumable state machine so that any scheduler (an animation timer, a
//! test, a tight loop) can drive it one step at a time.

use crate::grid::{reset_grid, Coord, Grid, DEST, PATH, START, UNVIS};

/// Result of expanding the neighbors of a single frontier cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// A neighbor is the destination. Expansion stopped at that neighbor.
    DestFound,
    /// Number of neighbors whose depth was set or lowered.
    Updated(usize),
}

/// Checks the neighbors of a cell and assigns them the next depth.
///
/// Neighbors are visited in rotation order. A neighbor that is [`UNVIS`] or holds a depth strictly
/// greater than `depth + 1` is set to `depth + 1`; obstacles, the start, paths and neighbors that
/// already hold an optimal depth are left alone. Reaching the destination stops the expansion
/// immediately, and updates already applied to earlier neighbors are kept.
pub fn check_adjacent(grid: &mut Grid, cell: Coord, depth: i32) -> Expansion {
    expand(grid, cell, depth, |_| {})
}

/// Runs [`check_adjacent`] and hands every neighbor it sets to `on_update`.
fn expand(
    grid: &mut Grid,
    cell: Coord,
    depth: i32,
    mut on_update: impl FnMut(Coord),
) -> Expansion {
    let next_depth = depth + 1;
    let mut updated = 0;

    let mut neighbors = [None; 4];
    for (slot, neighbor) in neighbors.iter_mut().zip(grid.neighbors(cell)) {
        *slot = Some(neighbor);
    }

    for neighbor in neighbors.into_iter().flatten() {
        match grid.get(neighbor) {
            Some(DEST) => return Expansion::DestFound,
            Some(value) if value == UNVIS || value > next_depth => {
                grid.set(neighbor, next_depth);
                on_update(neighbor);
                updated += 1;
            }
            _ => {}
        }
    }

    Expansion::Updated(updated)
}

/// Finds the neighbor of `cell` holding `depth`, marks it [`PATH`] and returns it.
///
/// The first matching neighbor in rotation order wins. `None` means no neighbor holds `depth`,
/// which cannot happen on a grid produced by a completed forward search.
pub fn backtrack(grid: &mut Grid, cell: Coord, depth: i32) -> Option<Coord> {
    let next = grid
        .neighbors(cell)
        .find(|neighbor| grid.get(*neighbor) == Some(depth))?;
    grid.set(next, PATH);

    Some(next)
}

/// Phase of the search state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Expanding one depth layer per step.
    Searching,
    /// The destination was reached; backtracking has not started yet.
    DestFound,
    /// Every reachable cell was visited without reaching the destination. Terminal.
    Exhausted,
    /// Marking the route one cell per step.
    Backtracking,
    /// The route is fully marked. Terminal.
    Done,
}

impl Phase {
    /// Returns whether no further step changes the grid.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Done)
    }

    /// Returns a short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::DestFound => "destination found",
            Self::Exhausted => "unreachable",
            Self::Backtracking => "backtracking",
            Self::Done => "done",
        }
    }
}

/// Outcome of a single forward search step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStep {
    /// A new layer was assigned; the value is the depth of that layer.
    Continue(i32),
    /// The destination was reached; the value is the destination's depth.
    DestFound(i32),
    /// No cell was updated and the destination was not reached.
    Exhausted,
}

/// Outcome of a single backtrack step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BacktrackStep {
    /// The given cell was marked [`PATH`].
    NextCell(Coord),
    /// The walk reached the cell next to the start.
    Done,
}

/// Resumable grassfire search over an owned grid.
///
/// The structure keeps the cursor between steps: the active phase, the current depth with the
/// frontier cells holding it, the cell the backtrack walk stands on, and the route recorded so
/// far. Callers observe the grid through
/// [`Pathfinder::grid`] between steps.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    /// Grid mutated in place by the search.
    grid: Grid,
    /// Active phase.
    phase: Phase,
    /// Frontier depth while searching, next depth to look for while backtracking.
    depth: i32,
    /// Cells holding the frontier depth, in row-major order.
    frontier: Vec<Coord>,
    /// Depth assigned to the destination once it is reached.
    dest_depth: Option<i32>,
    /// Cell the backtrack walk currently stands on.
    cursor: Option<Coord>,
    /// Route from the destination towards the start.
    path: Vec<Coord>,
}

impl Pathfinder {
    /// Creates a search in the [`Phase::Searching`] phase at depth `0`.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let frontier = grid.cells_with(START);

        Self {
            grid,
            phase: Phase::Searching,
            depth: 0,
            frontier,
            dest_depth: None,
            cursor: None,
            path: Vec::new(),
        }
    }

    /// Returns the grid in its current state.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the active phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the cursor depth.
    #[must_use]
    pub const fn depth(&self) -> i32 {
        self.depth
    }

    /// Returns the cells the next search step expands.
    #[must_use]
    pub fn frontier(&self) -> &[Coord] {
        &self.frontier
    }

    /// Returns the destination's depth, once the destination was reached.
    #[must_use]
    pub const fn dest_depth(&self) -> Option<i32> {
        self.dest_depth
    }

    /// Returns the route recorded so far.
    ///
    /// The route starts at the destination and ends at the cell adjacent to the start, which is
    /// not included. Once backtracking is done its length equals the destination's depth.
    #[must_use]
    pub fn path(&self) -> &[Coord] {
        &self.path
    }

    /// Expands the active frontier by one layer.
    ///
    /// Every frontier cell is expanded in row-major order, and the cells it assigns become the
    /// next frontier. Outside of the [`Phase::Searching`] phase this reports the outcome already
    /// reached without touching the grid.
    pub fn step_search(&mut self) -> SearchStep {
        match self.phase {
            Phase::Searching => {}
            Phase::Exhausted => return SearchStep::Exhausted,
            Phase::DestFound | Phase::Backtracking | Phase::Done => {
                return SearchStep::DestFound(self.dest_depth.unwrap_or(self.depth + 1));
            }
        }

        let frontier = std::mem::take(&mut self.frontier);
        let mut next = Vec::new();

        for cell in frontier {
            if expand(&mut self.grid, cell, self.depth, |neighbor| next.push(neighbor))
                == Expansion::DestFound
            {
                let dest_depth = self.depth + 1;
                self.phase = Phase::DestFound;
                self.dest_depth = Some(dest_depth);
                log::debug!("destination reached at depth {dest_depth}");
                return SearchStep::DestFound(dest_depth);
            }
        }

        if next.is_empty() {
            self.phase = Phase::Exhausted;
            log::debug!("search exhausted at depth {}", self.depth);
            return SearchStep::Exhausted;
        }

        next.sort_unstable();
        next.dedup();
        log::trace!("layer {} holds {} cells", self.depth + 1, next.len());
        self.frontier = next;
        self.depth += 1;

        SearchStep::Continue(self.depth)
    }

    /// Marks the next route cell, walking from the destination towards the start.
    ///
    /// The first call after the destination was found positions the walk on the destination.
    /// Each call marks one cell; the call after the cell adjacent to the start was marked returns
    /// [`BacktrackStep::Done`]. When the start and the destination are adjacent no cell is marked
    /// at all.
    pub fn step_backtrack(&mut self) -> BacktrackStep {
        match self.phase {
            Phase::DestFound => {
                self.cursor = self.grid.find(DEST);
                self.path.clear();
                self.path.extend(self.cursor);
                self.phase = Phase::Backtracking;
            }
            Phase::Backtracking => {}
            Phase::Searching | Phase::Exhausted | Phase::Done => return BacktrackStep::Done,
        }

        let Some(cell) = self.cursor.filter(|_| self.depth > 0) else {
            self.phase = Phase::Done;
            return BacktrackStep::Done;
        };

        if let Some(next) = backtrack(&mut self.grid, cell, self.depth) {
            log::trace!("path cell ({}, {}) at depth {}", next.row, next.col, self.depth);
            self.path.push(next);
            self.cursor = Some(next);
            self.depth -= 1;
            BacktrackStep::NextCell(next)
        } else {
            log::warn!(
                "no neighbor of ({}, {}) holds depth {}",
                cell.row,
                cell.col,
                self.depth
            );
            self.phase = Phase::Done;
            BacktrackStep::Done
        }
    }

    /// Advances whichever phase is active by one step and returns the resulting phase.
    pub fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Searching => {
                let _ = self.step_search();
            }
            Phase::DestFound | Phase::Backtracking => {
                let _ = self.step_backtrack();
            }
            Phase::Exhausted | Phase::Done => {}
        }

        self.phase
    }

    /// Steps until a terminal phase is reached and returns it.
    pub fn run_to_completion(&mut self) -> Phase {
        while !self.phase.is_terminal() {
            let _ = self.step();
        }

        self.phase
    }

    /// Resets the grid and returns the cursor to the start of the search.
    pub fn restart(&mut self) {
        reset_grid(&mut self.grid);
        self.phase = Phase::Searching;
        self.depth = 0;
        self.frontier = self.grid.cells_with(START);
        self.dest_depth = None;
        self.cursor = None;
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::grid::{create_grid, OBST};
    use rand::{rngs::StdRng, SeedableRng as _};

    /// Computes the shortest distance from the start to the destination with a plain queue.
    fn reference_distance(grid: &Grid) -> Option<usize> {
        let start = grid.find(START)?;
        let mut distances = vec![None; grid.rows() * grid.cols()];
        let mut queue = VecDeque::from([(start, 0)]);
        *distances.get_mut(start.row * grid.cols() + start.col)? = Some(0);

        while let Some((cell, distance)) = queue.pop_front() {
            for neighbor in grid.neighbors(cell) {
                let slot = distances.get_mut(neighbor.row * grid.cols() + neighbor.col)?;
                if slot.is_some() || grid.get(neighbor) == Some(OBST) {
                    continue;
                }
                if grid.get(neighbor) == Some(DEST) {
                    return Some(distance + 1);
                }
                *slot = Some(distance + 1);
                queue.push_back((neighbor, distance + 1));
            }
        }

        None
    }

    /// Builds an obstacle-free grid with the given start and destination.
    fn open_grid(rows: usize, cols: usize, start: Coord, dest: Coord) -> Grid {
        let mut grid = Grid::new(rows, cols);
        grid.set(start, START);
        grid.set(dest, DEST);
        grid
    }

    #[test]
    fn test_check_adjacent_updates_unvisited() {
        let mut grid = open_grid(3, 3, Coord::new(1, 1), Coord::new(0, 0));

        assert_eq!(
            check_adjacent(&mut grid, Coord::new(1, 1), 0),
            Expansion::Updated(4)
        );
        assert_eq!(grid.count(1), 4);
    }

    #[test]
    fn test_check_adjacent_lowers_worse_depth() {
        let mut grid = Grid::from_rows(&[vec![START, 5, UNVIS], vec![2, OBST, DEST]]);

        assert_eq!(
            check_adjacent(&mut grid, Coord::new(0, 0), 1),
            Expansion::Updated(1)
        );
        assert_eq!(grid.get(Coord::new(0, 1)), Some(2));
        assert_eq!(grid.get(Coord::new(1, 0)), Some(2));
    }

    #[test]
    fn test_check_adjacent_skips_obstacles_and_start() {
        let mut grid = Grid::from_rows(&[
            vec![UNVIS, OBST, UNVIS],
            vec![START, 1, OBST],
            vec![UNVIS, 2, UNVIS],
        ]);

        assert_eq!(
            check_adjacent(&mut grid, Coord::new(1, 1), 1),
            Expansion::Updated(0)
        );
        assert_eq!(grid.get(Coord::new(0, 1)), Some(OBST));
        assert_eq!(grid.get(Coord::new(1, 0)), Some(START));
    }

    #[test]
    fn test_check_adjacent_stops_at_destination() {
        let mut grid = Grid::from_rows(&[
            vec![UNVIS, UNVIS, UNVIS],
            vec![UNVIS, START, DEST],
            vec![UNVIS, UNVIS, UNVIS],
        ]);

        assert_eq!(
            check_adjacent(&mut grid, Coord::new(1, 1), 0),
            Expansion::DestFound
        );
        assert_eq!(grid.get(Coord::new(0, 1)), Some(1));
        assert_eq!(grid.get(Coord::new(2, 1)), Some(UNVIS));
        assert_eq!(grid.get(Coord::new(1, 0)), Some(UNVIS));
    }

    #[test]
    fn test_backtrack_marks_first_match() {
        let mut grid = Grid::from_rows(&[vec![START, 1], vec![1, DEST]]);

        assert_eq!(
            backtrack(&mut grid, Coord::new(1, 1), 1),
            Some(Coord::new(0, 1))
        );
        assert_eq!(grid.get(Coord::new(0, 1)), Some(PATH));
        assert_eq!(grid.get(Coord::new(1, 0)), Some(1));
        assert_eq!(backtrack(&mut grid, Coord::new(1, 1), 7), None);
    }

    #[test]
    fn test_open_grid_corner_to_corner() {
        let mut pathfinder = Pathfinder::new(open_grid(8, 8, Coord::new(0, 0), Coord::new(7, 7)));

        let mut outcome = pathfinder.step_search();
        while let SearchStep::Continue(_) = outcome {
            outcome = pathfinder.step_search();
        }
        assert_eq!(outcome, SearchStep::DestFound(14));

        let depths = pathfinder.grid().clone();
        let mut marked = 0;
        while let BacktrackStep::NextCell(_) = pathfinder.step_backtrack() {
            marked += 1;
        }

        assert_eq!(marked, 13);
        assert_eq!(pathfinder.phase(), Phase::Done);

        let path = pathfinder.path();
        assert_eq!(path.len(), 14);
        assert_eq!(path.first(), Some(&Coord::new(7, 7)));
        for (idx, cell) in path.iter().enumerate().skip(1) {
            assert_eq!(depths.get(*cell), Some(14 - i32::try_from(idx).unwrap_or(0)));
        }
        for pair in path.windows(2) {
            if let [from, to] = pair {
                assert!(from.is_adjacent(*to), "route has a gap");
            }
        }
        assert!(path
            .last()
            .is_some_and(|cell| cell.is_adjacent(Coord::new(0, 0))));
        assert_eq!(pathfinder.grid().count(PATH), 13);
    }

    #[test]
    fn test_enclosed_destination_is_exhausted() {
        let mut grid = open_grid(5, 5, Coord::new(0, 0), Coord::new(2, 2));
        for wall in [
            Coord::new(1, 2),
            Coord::new(2, 3),
            Coord::new(3, 2),
            Coord::new(2, 1),
        ] {
            grid.set(wall, OBST);
        }
        let mut pathfinder = Pathfinder::new(grid);

        let mut steps = 0;
        let outcome = loop {
            steps += 1;
            match pathfinder.step_search() {
                SearchStep::Continue(_) => {}
                other => break other,
            }
        };

        assert_eq!(outcome, SearchStep::Exhausted);
        assert!(steps <= 25, "search took {steps} steps");
        assert_eq!(pathfinder.grid().get(Coord::new(2, 2)), Some(DEST));
        assert_eq!(pathfinder.grid().count(PATH), 0);
        assert_eq!(pathfinder.step_backtrack(), BacktrackStep::Done);
        assert_eq!(pathfinder.phase(), Phase::Exhausted);
    }

    #[test]
    fn test_adjacent_start_and_destination() {
        let mut pathfinder = Pathfinder::new(open_grid(1, 2, Coord::new(0, 0), Coord::new(0, 1)));

        assert_eq!(pathfinder.step_search(), SearchStep::DestFound(1));
        assert_eq!(pathfinder.step_backtrack(), BacktrackStep::Done);
        assert_eq!(pathfinder.path(), [Coord::new(0, 1)]);
        assert_eq!(pathfinder.grid().count(PATH), 0);
    }

    #[test]
    fn test_missing_start_is_exhausted() {
        let mut grid = Grid::new(3, 3);
        grid.set(Coord::new(2, 2), DEST);
        let mut pathfinder = Pathfinder::new(grid);

        assert_eq!(pathfinder.step_search(), SearchStep::Exhausted);
    }

    #[test]
    fn test_step_walks_through_phases() {
        let mut pathfinder = Pathfinder::new(open_grid(1, 4, Coord::new(0, 0), Coord::new(0, 3)));

        assert_eq!(pathfinder.step(), Phase::Searching);
        assert_eq!(pathfinder.step(), Phase::Searching);
        assert_eq!(pathfinder.step(), Phase::DestFound);
        assert_eq!(pathfinder.step(), Phase::Backtracking);
        assert_eq!(pathfinder.step(), Phase::Backtracking);
        assert_eq!(pathfinder.step(), Phase::Done);
        assert_eq!(pathfinder.step(), Phase::Done);
        assert_eq!(pathfinder.grid().to_string(), "S**D\n");
    }

    #[test]
    fn test_frontier_is_carried_across_steps() {
        let mut grid = Grid::new(3, 3);
        grid.set(Coord::new(1, 1), START);
        let mut pathfinder = Pathfinder::new(grid);
        assert_eq!(pathfinder.frontier(), [Coord::new(1, 1)]);

        assert_eq!(pathfinder.step_search(), SearchStep::Continue(1));
        assert_eq!(
            pathfinder.frontier(),
            [
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 2),
                Coord::new(2, 1)
            ]
        );

        assert_eq!(pathfinder.step_search(), SearchStep::Continue(2));
        assert_eq!(
            pathfinder.frontier(),
            [
                Coord::new(0, 0),
                Coord::new(0, 2),
                Coord::new(2, 0),
                Coord::new(2, 2)
            ]
        );

        assert_eq!(pathfinder.step_search(), SearchStep::Exhausted);
        assert!(pathfinder.frontier().is_empty());
    }

    #[test]
    fn test_search_ignores_depths_outside_the_frontier() {
        let mut grid = Grid::new(3, 3);
        grid.set(Coord::new(0, 0), START);
        grid.set(Coord::new(2, 2), 1);
        let mut pathfinder = Pathfinder::new(grid);

        assert_eq!(pathfinder.step_search(), SearchStep::Continue(1));
        assert_eq!(pathfinder.frontier(), [Coord::new(0, 1), Coord::new(1, 0)]);

        assert_eq!(pathfinder.step_search(), SearchStep::Continue(2));
        assert_eq!(
            pathfinder.frontier(),
            [Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)]
        );
        assert_eq!(pathfinder.grid().get(Coord::new(1, 2)), Some(UNVIS));
        assert_eq!(pathfinder.grid().get(Coord::new(2, 1)), Some(UNVIS));
    }

    #[test]
    fn test_depths_follow_layers() {
        let grid = create_grid(14, 14, 2, 12, 12, 20, &mut StdRng::seed_from_u64(3));
        let mut pathfinder = Pathfinder::new(grid);
        while pathfinder.step_search() != SearchStep::Exhausted
            && pathfinder.phase() == Phase::Searching
        {}

        let grid = pathfinder.grid();
        for (cell, value) in grid.iter().filter(|(_, value)| *value > START) {
            assert!(
                grid.neighbors(cell)
                    .any(|neighbor| grid.get(neighbor) == Some(value - 1)),
                "cell ({}, {}) at depth {value} has no parent",
                cell.row,
                cell.col
            );
        }
    }

    #[test]
    fn test_random_grids_match_reference_search() {
        for seed in 0..40 {
            let original = create_grid(12, 12, 4, 9, 10, 25, &mut StdRng::seed_from_u64(seed));
            let expected = reference_distance(&original);
            let mut pathfinder = Pathfinder::new(original.clone());

            match pathfinder.run_to_completion() {
                Phase::Done => {
                    let path = pathfinder.path();
                    assert_eq!(Some(path.len()), expected, "seed {seed}");
                    assert_eq!(
                        pathfinder.dest_depth(),
                        i32::try_from(path.len()).ok(),
                        "seed {seed}"
                    );
                    assert!(path.iter().all(|cell| original.get(*cell) != Some(OBST)));
                    assert!(path.windows(2).all(|pair| match pair {
                        [from, to] => from.is_adjacent(*to),
                        _ => false,
                    }));
                    assert!(path
                        .last()
                        .is_some_and(|cell| cell.is_adjacent(Coord::new(0, 4))));
                }
                Phase::Exhausted => {
                    assert_eq!(expected, None, "seed {seed}");
                    assert_eq!(pathfinder.grid().count(PATH), 0);
                }
                phase => panic!("unexpected terminal phase {phase:?}"),
            }
        }
    }

    #[test]
    fn test_restart_replays_the_same_search() {
        let grid = create_grid(10, 10, 0, 9, 9, 10, &mut StdRng::seed_from_u64(11));
        let mut pathfinder = Pathfinder::new(grid.clone());
        let first_phase = pathfinder.run_to_completion();
        let first_path = pathfinder.path().to_vec();

        pathfinder.restart();
        assert_eq!(pathfinder.phase(), Phase::Searching);
        assert_eq!(pathfinder.depth(), 0);
        assert_eq!(pathfinder.frontier(), [Coord::new(0, 0)]);
        assert_eq!(pathfinder.grid(), &grid);
        assert!(pathfinder.path().is_empty());

        assert_eq!(pathfinder.run_to_completion(), first_phase);
        assert_eq!(pathfinder.path(), first_path.as_slice());
    }
}
