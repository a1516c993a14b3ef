//! Core application state and logic for the grassfire visualizer.

use std::{fmt::Write as _, time::Duration};

use color_eyre::eyre::Result;
use ratatui::DefaultTerminal;

use crate::{
    animation::Animator,
    config::{Cli, GridConfig},
    events,
    pathfinding::{Pathfinder, Phase},
    ui,
};

/// Application state container for the grassfire visualizer.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui renders the grid and Crossterm events write to.
pub struct App {
    /// Application exit flag.
    ///
    /// This field indicates whether the application should exit. It is set to `true` when the user
    /// wants to quit but it starts off `false`.
    pub(crate) exit: bool,
    /// Grid parameters the current grid was built from.
    ///
    /// This field is kept around so that a new random grid with the same shape can be generated
    /// on demand.
    pub(crate) config: GridConfig,
    /// Animation manager for the search visualization.
    ///
    /// This field owns the search and its grid, and advances it on every elapsed frame interval.
    pub(crate) animator: Animator,
}

impl App {
    /// Creates the application from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// This function returns an error if the grid parameters fail validation.
    pub fn new(cli: &Cli) -> Result<Self> {
        let grid = cli.grid.build_grid()?;

        Ok(Self {
            exit: false,
            config: cli.grid.clone(),
            animator: Animator::new(grid, Duration::from_millis(cli.interval_ms)),
        })
    }

    /// Runs the main loop of the application.
    ///
    /// This function handles user input and updates the application state. The loop continues until
    /// the exit condition is `true`, after which the function returns to the call site.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| ui::draw(self, frame).map_err(std::io::Error::other))?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// Replaces the grid with a new random layout built from the same parameters.
    ///
    /// # Errors
    ///
    /// This function returns an error if the grid parameters fail validation.
    pub(crate) fn regenerate(&mut self) -> Result<()> {
        let grid = self.config.build_grid_with(&mut rand::rng())?;
        self.animator.load(grid);

        Ok(())
    }
}

/// Runs a search to completion and renders the final grid and its outcome as text.
///
/// # Errors
///
/// This function returns an error if the grid parameters fail validation.
pub fn run_headless(config: &GridConfig) -> Result<String> {
    let mut pathfinder = Pathfinder::new(config.build_grid()?);
    let phase = pathfinder.run_to_completion();

    let mut report = pathfinder.grid().to_string();
    match (phase, pathfinder.dest_depth()) {
        (Phase::Done, Some(depth)) => writeln!(report, "path length: {depth}")?,
        _ => writeln!(report, "destination unreachable")?,
    }

    Ok(report)
}
