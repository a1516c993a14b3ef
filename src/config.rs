//! Command-line configuration and grid parameter validation.
//!
//! The search engine trusts its inputs, so every parameter coming from the user goes through
//! [`GridConfig::validate`] before a grid is built.

use clap::{Args, Parser};
use color_eyre::eyre::{ensure, Result};
use env_logger::Env;
use rand::{rngs::StdRng, Rng, SeedableRng as _};

use crate::grid::{create_grid, obstacle_count, Grid};

/// Default delay between two animation frames, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 150;
/// Default number of rows.
pub const DEFAULT_ROWS: usize = 20;
/// Default number of columns.
pub const DEFAULT_COLS: usize = 30;
/// Default one-based column of the starting cell.
pub const DEFAULT_START_COL: usize = 1;
/// Default one-based row of the destination.
pub const DEFAULT_DEST_ROW: usize = 18;
/// Default one-based column of the destination.
pub const DEFAULT_DEST_COL: usize = 28;
/// Default percentage of obstacle cells.
pub const DEFAULT_OBSTACLE_PERCENT: u8 = 15;
/// Largest grid accepted, in cells.
pub const MAX_CELLS: usize = 1_000_000;

/// Command-line interface of the grassfire visualizer.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Grid parameters.
    #[command(flatten)]
    pub grid: GridConfig,
    /// Delay between two animation steps, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,
    /// Enforce the classic playfield rules: at least 8x8, 10-20% obstacles, destination in the
    /// lower right region.
    #[arg(long)]
    pub classic: bool,
    /// Run the search to completion and print the final grid instead of animating it.
    #[arg(long)]
    pub headless: bool,
}

/// Grid parameters as entered by the user.
///
/// The start column and the destination coordinates are one-based; the start always sits on the
/// top row.
#[derive(Clone, Debug, PartialEq, Eq, Args)]
pub struct GridConfig {
    /// Number of rows in the grid.
    #[arg(short, long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,
    /// Number of columns in the grid.
    #[arg(short, long, default_value_t = DEFAULT_COLS)]
    pub cols: usize,
    /// Column of the starting cell on the top row (one-based).
    #[arg(short, long, default_value_t = DEFAULT_START_COL)]
    pub start_col: usize,
    /// Row of the destination cell (one-based).
    #[arg(long, default_value_t = DEFAULT_DEST_ROW)]
    pub dest_row: usize,
    /// Column of the destination cell (one-based).
    #[arg(long, default_value_t = DEFAULT_DEST_COL)]
    pub dest_col: usize,
    /// Percentage of cells turned into obstacles.
    #[arg(short, long, default_value_t = DEFAULT_OBSTACLE_PERCENT)]
    pub obstacle_percent: u8,
    /// Seed for obstacle placement. A random layout is drawn when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            start_col: DEFAULT_START_COL,
            dest_row: DEFAULT_DEST_ROW,
            dest_col: DEFAULT_DEST_COL,
            obstacle_percent: DEFAULT_OBSTACLE_PERCENT,
            seed: None,
        }
    }
}

impl GridConfig {
    /// Checks that the parameters describe a grid the engine can build and search.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - Either dimension is zero
    /// - The grid holds more than [`MAX_CELLS`] cells
    /// - The start column or the destination lies outside the grid
    /// - The obstacle percentage exceeds 100
    /// - The start and the destination are the same cell
    /// - The obstacles would not fit in the cells left free by the start and the destination
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.rows > 0 && self.cols > 0,
            "grid dimensions must be positive, got {}x{}",
            self.rows,
            self.cols
        );
        let cells = self.rows.checked_mul(self.cols).unwrap_or(usize::MAX);
        ensure!(
            cells <= MAX_CELLS,
            "a {}x{} grid exceeds the limit of {MAX_CELLS} cells",
            self.rows,
            self.cols
        );
        ensure!(
            (1..=self.cols).contains(&self.start_col),
            "starting column {} must be between 1 and {}",
            self.start_col,
            self.cols
        );
        ensure!(
            (1..=self.rows).contains(&self.dest_row) && (1..=self.cols).contains(&self.dest_col),
            "destination ({}, {}) lies outside the {}x{} grid",
            self.dest_row,
            self.dest_col,
            self.rows,
            self.cols
        );
        ensure!(
            self.obstacle_percent <= 100,
            "obstacle percentage {} must be between 0 and 100",
            self.obstacle_percent
        );
        ensure!(
            (self.dest_row, self.dest_col) != (1, self.start_col),
            "starting cell and destination must differ"
        );

        let obstacles = obstacle_count(self.rows, self.cols, self.obstacle_percent);
        let free_cells = cells.saturating_sub(2);
        ensure!(
            obstacles <= free_cells,
            "{obstacles} obstacles do not fit in the {free_cells} free cells"
        );

        Ok(())
    }

    /// Checks the parameters against the classic playfield rules on top of [`Self::validate`].
    ///
    /// # Errors
    ///
    /// This function returns an error if [`Self::validate`] fails or if:
    /// - The grid is smaller than 8x8
    /// - The obstacle percentage is outside 10 to 20
    /// - The destination row is not below the middle of the grid
    /// - The destination column is not past two thirds of the grid width
    pub fn validate_classic(&self) -> Result<()> {
        self.validate()?;

        ensure!(
            self.rows >= 8 && self.cols >= 8,
            "the grid should be at least 8x8"
        );
        ensure!(
            (10..=20).contains(&self.obstacle_percent),
            "obstacle percentage should be between 10 and 20"
        );
        ensure!(
            self.dest_row * 2 > self.rows,
            "destination row should be greater than half of the number of rows"
        );
        ensure!(
            self.dest_col > (self.cols * 2).div_ceil(3),
            "destination column should be greater than 2/3 of the number of columns"
        );

        Ok(())
    }

    /// Validates the parameters and builds a grid, drawing obstacles from `rng`.
    ///
    /// # Errors
    ///
    /// This function returns the errors of [`Self::validate`].
    pub fn build_grid_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Grid> {
        self.validate()?;

        Ok(create_grid(
            self.rows,
            self.cols,
            self.start_col - 1,
            self.dest_row - 1,
            self.dest_col - 1,
            self.obstacle_percent,
            rng,
        ))
    }

    /// Validates the parameters and builds a grid.
    ///
    /// Obstacles are drawn from a [`StdRng`] seeded with [`Self::seed`] when it is set, from the
    /// thread-local generator otherwise.
    ///
    /// # Errors
    ///
    /// This function returns the errors of [`Self::validate`].
    pub fn build_grid(&self) -> Result<Grid> {
        match self.seed {
            Some(seed) => self.build_grid_with(&mut StdRng::seed_from_u64(seed)),
            None => self.build_grid_with(&mut rand::rng()),
        }
    }
}

/// Installs the global logger, filtered by `RUST_LOG` and defaulting to warnings.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
}
