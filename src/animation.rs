//! Timer-driven playback of the grassfire search.

use std::time::{Duration, Instant};

use crate::{
    grid::Grid,
    pathfinding::{Pathfinder, Phase},
};

/// Number of frames a finished search stays on screen before it is replayed.
pub(crate) const REPLAY_HOLD_FRAMES: usize = 10;

/// Animation state manager for the search visualization.
///
/// This structure owns the search and advances it by one step every time the frame interval
/// elapses. Once the search reaches a terminal phase it is held for [`REPLAY_HOLD_FRAMES`] frames,
/// then the grid is reset and the search replays from the start.
pub(crate) struct Animator {
    /// Search being animated.
    pub(crate) pathfinder: Pathfinder,
    /// Delay between two animation frames.
    pub(crate) interval: Duration,
    /// Timestamp of the last animation frame update.
    pub(crate) last_update_time: Instant,
    /// Whether the timer is stopped.
    pub(crate) paused: bool,
    /// Number of frames spent in a terminal phase.
    pub(crate) held_frames: usize,
    /// Number of steps taken since the last replay.
    pub(crate) steps_taken: usize,
}

impl Animator {
    /// Creates an animator over a fresh search of the given grid.
    pub(crate) fn new(grid: Grid, interval: Duration) -> Self {
        Self {
            pathfinder: Pathfinder::new(grid),
            interval,
            last_update_time: Instant::now(),
            paused: false,
            held_frames: 0,
            steps_taken: 0,
        }
    }

    /// Replaces the animated grid and starts over.
    pub(crate) fn load(&mut self, grid: Grid) {
        self.pathfinder = Pathfinder::new(grid);
        self.rewind();
    }

    /// Resets the grid and restarts the search from depth zero.
    pub(crate) fn replay(&mut self) {
        self.pathfinder.restart();
        self.rewind();
    }

    /// Clears the frame counters and restarts the timer.
    fn rewind(&mut self) {
        self.held_frames = 0;
        self.steps_taken = 0;
        self.last_update_time = Instant::now();
    }

    /// Toggles the timer.
    pub(crate) fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.last_update_time = Instant::now();
    }

    /// Advances the animation by one frame regardless of the timer.
    pub(crate) fn advance(&mut self) {
        if self.pathfinder.phase().is_terminal() {
            self.held_frames += 1;
            if self.held_frames > REPLAY_HOLD_FRAMES {
                self.replay();
            }
        } else {
            let phase = self.pathfinder.step();
            self.steps_taken += 1;
            if phase.is_terminal() {
                log::info!(
                    "search finished as {} after {} steps",
                    phase.label(),
                    self.steps_taken
                );
            }
        }
    }

    /// Advances the animation when the frame interval has elapsed and the timer runs.
    pub(crate) fn update(&mut self) {
        if !self.paused && self.last_update_time.elapsed() >= self.interval {
            self.last_update_time = Instant::now();
            self.advance();
        }
    }

    /// Returns how long until the next frame is due, or `None` while the timer is stopped.
    pub(crate) fn time_until_next_frame(&self) -> Option<Duration> {
        (!self.paused).then(|| self.interval.saturating_sub(self.last_update_time.elapsed()))
    }

    /// Returns the phase of the animated search.
    pub(crate) const fn phase(&self) -> Phase {
        self.pathfinder.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Coord, DEST, PATH, START};

    /// Builds a single-row grid with the start on the left and the destination on the right.
    fn corridor(len: usize) -> Grid {
        let mut grid = Grid::new(1, len);
        grid.set(Coord::new(0, 0), START);
        grid.set(Coord::new(0, len - 1), DEST);
        grid
    }

    #[test]
    fn test_advance_steps_the_search() {
        let mut animator = Animator::new(corridor(4), Duration::ZERO);

        animator.advance();
        assert_eq!(animator.phase(), Phase::Searching);
        assert_eq!(animator.steps_taken, 1);
        assert_eq!(animator.pathfinder.grid().get(Coord::new(0, 1)), Some(1));
    }

    #[test]
    fn test_finished_search_is_held_then_replayed() {
        let mut animator = Animator::new(corridor(4), Duration::ZERO);
        while !animator.phase().is_terminal() {
            animator.advance();
        }
        assert_eq!(animator.pathfinder.grid().count(PATH), 2);

        for _ in 0..REPLAY_HOLD_FRAMES {
            animator.advance();
        }
        assert_eq!(animator.phase(), Phase::Done);

        animator.advance();
        assert_eq!(animator.phase(), Phase::Searching);
        assert_eq!(animator.steps_taken, 0);
        assert_eq!(animator.pathfinder.grid().count(PATH), 0);
    }

    #[test]
    fn test_update_respects_pause() {
        let mut animator = Animator::new(corridor(5), Duration::ZERO);

        animator.toggle_pause();
        animator.update();
        assert_eq!(animator.steps_taken, 0);

        animator.toggle_pause();
        animator.update();
        assert_eq!(animator.steps_taken, 1);
    }

    #[test]
    fn test_update_waits_for_interval() {
        let mut animator = Animator::new(corridor(5), Duration::from_secs(3600));

        animator.update();
        assert_eq!(animator.steps_taken, 0);
    }

    #[test]
    fn test_time_until_next_frame() {
        let mut slow = Animator::new(corridor(5), Duration::from_secs(3600));
        let due = Animator::new(corridor(5), Duration::ZERO);

        assert!(slow
            .time_until_next_frame()
            .is_some_and(|wait| wait > Duration::from_secs(3500)));
        assert_eq!(due.time_until_next_frame(), Some(Duration::ZERO));

        slow.toggle_pause();
        assert_eq!(slow.time_until_next_frame(), None);
    }

    #[test]
    fn test_load_replaces_grid() {
        let mut animator = Animator::new(corridor(5), Duration::ZERO);
        animator.advance();
        animator.load(corridor(3));

        assert_eq!(animator.pathfinder.grid().cols(), 3);
        assert_eq!(animator.steps_taken, 0);
        assert_eq!(animator.phase(), Phase::Searching);
    }
}
