//! Home screen shown while editing is locked

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::ui::layout::ScreenLayout;

/// Render the home screen
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let layout = ScreenLayout::new(frame.area());

    let header = Paragraph::new("◆ PHOTO LAB")
        .style(theme.title())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border()),
        );
    frame.render_widget(header, layout.header);

    let mut lines = vec![
        Line::from(""),
        Line::styled("🔒 Editing is locked", theme.text()),
        Line::from(""),
        Line::styled("Enter your PIN to open the editor.", theme.text_secondary()),
    ];
    if let Some(message) = &app.state.status_message {
        lines.push(Line::from(""));
        lines.push(Line::styled(message.as_str(), theme.success()));
    }
    let body = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(body, layout.content);

    let help = Paragraph::new("[e] Unlock editor    [q] Quit")
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help, layout.footer);
}
