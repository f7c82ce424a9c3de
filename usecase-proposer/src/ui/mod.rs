//! UI rendering functions for the proposal generator TUI
//!
//! This module contains all the rendering logic for the run and history
//! views plus shared chrome (header, footer, overlays).

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, View};

// Module declarations
mod components;
mod header_footer;
mod history_view;
mod run_view;

// Re-export public functions
pub use components::{centered_rect, render_quit_confirmation};
pub use header_footer::{render_footer, render_header};
pub use history_view::render_history;
pub use run_view::render_run;

/// History entries shown at once
pub const HISTORY_LIMIT: usize = 5;

/// Main UI rendering function - orchestrates all view rendering
pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    match app.current_view {
        View::Run => render_run(f, chunks[1], app),
        View::History => render_history(f, chunks[1], app),
    }

    render_footer(f, chunks[2], app);

    if app.confirm_quit {
        render_quit_confirmation(f, f.area());
    }
}
