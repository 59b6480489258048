//! UI rendering

pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{App, Screen};

/// Main render function - delegates to appropriate screen
pub fn render(frame: &mut Frame, app: &App) {
    match app.state.current_screen {
        Screen::Home => screens::home::render(frame, app),
        Screen::PinEntry => {
            let area = frame.area();
            screens::home::render(frame, app);
            screens::pin_entry::render(frame, area, app);
        }
        Screen::Editor => screens::editor::render(frame, app),
    }
}
