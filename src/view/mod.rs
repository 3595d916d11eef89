//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists)
//! - `layout`: Top bar and filter bar
//! - `content`: Main content area, one renderer per screen
//! - `progress`: Narration progress bar
//! - `overlays`: Modal overlays (notice, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, Screen};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, app: &App) {
        if matches!(app.screen, Screen::Login | Screen::Register) {
            if app.screen == Screen::Login {
                content::render_login(frame, frame.area(), app);
            } else {
                content::render_register(frame, frame.area(), app);
            }
            Self::render_overlays(frame, app);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + user
                Constraint::Min(0),    // Screen content
                Constraint::Length(3), // Narration progress
            ])
            .split(frame.area());

        let dashboard = app.dashboard_state();
        let user = dashboard.as_ref().and_then(|state| state.success()).map(|d| &d.user);
        layout::render_top_bar(frame, chunks[0], &app.filter.query, app.searching, user);

        match app.screen {
            Screen::Dashboard => {
                let main_chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(0)])
                    .split(chunks[1]);
                layout::render_filter_bar(frame, main_chunks[0], &app.filter, app.filter_cursor);
                content::render_dashboard(frame, main_chunks[1], app, dashboard.as_ref());
            }
            Screen::Detail => content::render_detail(frame, chunks[1], app),
            Screen::Profile => content::render_profile(frame, chunks[1], app),
            Screen::EditProfile => content::render_edit_profile(frame, chunks[1], app),
            Screen::ChangePassword => content::render_change_password(frame, chunks[1], app),
            Screen::Ar => content::render_ar(frame, chunks[1], app),
            Screen::Login | Screen::Register => {}
        }

        progress::render_progress_bar(frame, chunks[2], &app.playback().snapshot());

        Self::render_overlays(frame, app);
    }

    fn render_overlays(frame: &mut Frame, app: &App) {
        if let Some(notice) = &app.notice {
            overlays::render_error_notification(frame, notice);
        }

        if app.show_help {
            overlays::render_help_popup(frame);
        }
    }
}
