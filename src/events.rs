//! Event handling functions for user input and application state updates.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::App;

/// Upper bound on how long a single poll for input blocks the loop, in milliseconds.
const POLL_TIMEOUT_MS: u64 = 100;

/// Handles input events and updates the application state accordingly.
///
/// This function polls for keyboard events and dispatches them to [`handle_key`]. It waits at most
/// until the next animation frame is due, which is advanced afterwards.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(poll_timeout(app))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key.code)?;
            }
        }
    }

    app.animator.update();

    Ok(())
}

/// Returns how long to wait for input before the loop has to redraw.
fn poll_timeout(app: &App) -> Duration {
    let idle = Duration::from_millis(POLL_TIMEOUT_MS);

    app.animator
        .time_until_next_frame()
        .map_or(idle, |wait| wait.min(idle))
}

/// Applies a single key press to the application state.
///
/// - `q` quits
/// - `space` pauses or resumes the animation
/// - `n` advances one step while paused
/// - `r` replays the search on the same grid
/// - `g` generates a new random grid
pub(crate) fn handle_key(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => app.exit = true,
        KeyCode::Char(' ') => app.animator.toggle_pause(),
        KeyCode::Char('n') if app.animator.paused => app.animator.advance(),
        KeyCode::Char('r') => app.animator.replay(),
        KeyCode::Char('g') => app.regenerate()?,
        _ => {}
    }

    Ok(())
}
