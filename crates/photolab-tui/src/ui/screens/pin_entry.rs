//! PIN modal for unlocking the editor

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use photolab_auth::Phase;

use crate::app::App;
use crate::ui::layout::{centered_rect_fixed, shifted};

const DIALOG_WIDTH: u16 = 66;
const DIALOG_HEIGHT: u16 = 14;

/// Columns the dialog moves per shake frame
const SHAKE_OFFSET: i16 = 2;

/// Draw the PIN modal
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let entry = &app.entry;
    let locked = entry.state().is_locked();

    let dialog = shifted(
        centered_rect_fixed(DIALOG_WIDTH, DIALOG_HEIGHT, area),
        shake_offset(app.state.shake_frames),
        area,
    );
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(" Unlock Editor ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(if locked {
            theme.danger()
        } else {
            theme.border_focused()
        })
        .style(theme.surface());

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Prompt
            Constraint::Length(2), // PIN slots
            Constraint::Length(2), // Error message
            Constraint::Length(1), // Countdown / progress
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let prompt = Paragraph::new(entry.prompt())
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(prompt, chunks[0]);

    // PIN display (masked)
    let mut spans = Vec::new();
    for (i, slot) in entry.state().digits().slots().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(match slot {
            Some(_) => Span::styled("●", theme.pin_slot(true)),
            None => Span::styled("○", theme.pin_slot(false)),
        });
    }
    let slots = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(slots, chunks[1]);

    if let Some(error) = entry.state().error() {
        let error_widget = Paragraph::new(error.to_string())
            .style(theme.danger())
            .alignment(Alignment::Center);
        frame.render_widget(error_widget, chunks[2]);
    }

    let status = if locked {
        Some((
            format!("Try again in {} seconds", entry.seconds_remaining()),
            theme.warning(),
        ))
    } else {
        match entry.phase() {
            Phase::Probing => Some(("Loading…".to_string(), theme.text_muted())),
            Phase::Verifying => Some(("Checking…".to_string(), theme.text_muted())),
            Phase::Persisting => Some(("Saving…".to_string(), theme.text_muted())),
            Phase::Ready | Phase::Closed => None,
        }
    };
    if let Some((text, style)) = status {
        let status_widget = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center);
        frame.render_widget(status_widget, chunks[3]);
    }

    let help = format!(
        "[0-9] Digit  [Bksp] Delete  [Enter] {}  [Esc] Cancel",
        entry.action_label()
    );
    let help_widget = Paragraph::new(help)
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help_widget, chunks[5]);
}

fn shake_offset(frames: u8) -> i16 {
    match frames {
        0 => 0,
        f if f % 2 == 0 => SHAKE_OFFSET,
        _ => -SHAKE_OFFSET,
    }
}
