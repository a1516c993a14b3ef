//! User interface rendering functions for the grid and the search status.

use color_eyre::eyre::Result;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    grid::{Grid, DEST, OBST, PATH, START, UNVIS},
    App,
};

/// Glyph drawn for every cell. Two columns wide so that cells look roughly square.
const CELL_GLYPH: &str = "\u{2588}\u{2588}";

/// Key bindings shown below the grid.
const KEY_HINTS: &str = "(space) pause / (n) step / (r) replay / (g) new grid / (q) quit";

/// Returns the color a cell value is rendered with.
///
/// Obstacles are black, unvisited cells white, the start green, the destination red, route cells
/// yellow and every visited depth blue.
pub(crate) const fn cell_color(value: i32) -> Color {
    match value {
        OBST => Color::Black,
        UNVIS => Color::White,
        START => Color::Green,
        DEST => Color::Red,
        PATH => Color::Yellow,
        _ => Color::Blue,
    }
}

/// Builds one styled line per grid row.
pub(crate) fn grid_lines(grid: &Grid) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(grid.rows());
    let mut spans = Vec::with_capacity(grid.cols());

    for (coord, value) in grid.iter() {
        spans.push(Span::styled(CELL_GLYPH, Style::default().fg(cell_color(value))));
        if coord.col + 1 == grid.cols() {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }

    lines
}

/// Updates the application UI based on the persistent state.
///
/// This function renders the grid in the middle of the frame with the status block at the bottom.
///
/// # Errors
///
/// This function may return errors from data conversion failures.
pub(crate) fn draw(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let [content_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(4)]).areas(frame.area());

    let grid = app.animator.pathfinder.grid();
    let width = u16::try_from(grid.cols())?.saturating_mul(2).saturating_add(2);
    let height = u16::try_from(grid.rows())?.saturating_add(2);

    frame.render_widget(
        Paragraph::new(grid_lines(grid)).block(
            Block::bordered()
                .title("Grassfire")
                .title_alignment(Alignment::Center)
                .style(Color::Green)
                .border_type(BorderType::Rounded),
        ),
        center(content_area, width, height),
    );

    status(app, frame, status_area);

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Returns a rectangle of at most the given size centered in `area`.
fn center(area: Rect, width: u16, height: u16) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(column);

    cell
}

/// Renders the phase, the depth and the grid parameters below the grid.
fn status(app: &App, frame: &mut Frame, area: Rect) {
    let animator = &app.animator;
    let pathfinder = &animator.pathfinder;

    let mut progress = format!(
        "{} | depth {} | step {}",
        pathfinder.phase().label(),
        pathfinder.dest_depth().unwrap_or_else(|| pathfinder.depth()),
        animator.steps_taken
    );
    if animator.paused {
        progress.push_str(" | paused");
    }

    let parameters = format!(
        "Rows={} Columns={} Obstacle Percentage={}",
        app.config.rows, app.config.cols, app.config.obstacle_percent
    );

    let block = Block::bordered()
        .title_bottom(KEY_HINTS)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP | Borders::BOTTOM);

    frame.render_widget(
        Paragraph::new(vec![
            Line::raw(progress).centered(),
            Line::raw(parameters).centered(),
        ])
        .block(block),
        area,
    );
}
