//! Grassfire pathfinding on a randomly obstructed occupancy grid.
//!
//! The [`grid`] module holds the integer-coded grid and its construction, the [`pathfinding`]
//! module the resumable breadth-first search and backtrack walk, and the [`config`] module the
//! command-line parameters that feed them. The remaining modules make up the terminal front-end
//! that animates the search one step at a time.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod animation;
mod app;
pub mod config;
mod events;
pub mod grid;
pub mod pathfinding;
mod ui;

pub use app::{run_headless, App};
