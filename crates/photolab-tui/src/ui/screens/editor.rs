//! Photo editor screen, reachable only after unlocking

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::app::{Adjustment, App};
use crate::ui::layout::ScreenLayout;

/// Width of an adjustment bar in cells
const BAR_WIDTH: usize = 20;

/// Render the editor
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let state = &app.state;
    let layout = ScreenLayout::new(frame.area());

    let header = Paragraph::new("◆ PHOTO LAB · Editor")
        .style(theme.title())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border()),
        );
    frame.render_widget(header, layout.header);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout.content);

    let preview = Paragraph::new(vec![
        Line::from(""),
        Line::styled("untitled.jpg", theme.text()),
        Line::styled("Unsaved changes stay in this session", theme.text_muted()),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Preview ")
            .borders(Borders::ALL)
            .border_style(theme.border()),
    );
    frame.render_widget(preview, columns[0]);

    let items: Vec<ListItem> = Adjustment::ALL
        .iter()
        .enumerate()
        .map(|(i, adjustment)| {
            let value = state.adjustments[i];
            ListItem::new(format!(
                " {:<11}{:>5} {}",
                adjustment.label(),
                value,
                bar(value)
            ))
            .style(theme.menu_item(i == state.adjustment_index))
        })
        .collect();
    let adjustments = List::new(items).block(
        Block::default()
            .title(" Adjustments ")
            .borders(Borders::ALL)
            .border_style(theme.border_focused()),
    );
    frame.render_widget(adjustments, columns[1]);

    let footer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(layout.footer);

    if let Some(message) = &state.status_message {
        let status = Paragraph::new(message.as_str())
            .style(theme.success())
            .alignment(Alignment::Center);
        frame.render_widget(status, footer[0]);
    }

    let help = Paragraph::new("[↑↓] Select  [←→] Adjust  [Esc] Lock  [q] Quit")
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help, footer[1]);
}

/// Horizontal bar for a value in -100..=100
fn bar(value: i8) -> String {
    let half = BAR_WIDTH / 2;
    let filled = ((usize::from(value.unsigned_abs()) * half + 50) / 100).min(half);
    let (left, right) = if value < 0 {
        (
            format!("{}{}", "░".repeat(half - filled), "█".repeat(filled)),
            "░".repeat(half),
        )
    } else {
        (
            "░".repeat(half),
            format!("{}{}", "█".repeat(filled), "░".repeat(half - filled)),
        )
    };
    format!("{}│{}", left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_is_symmetric() {
        assert_eq!(bar(0), format!("{}│{}", "░".repeat(10), "░".repeat(10)));
        assert_eq!(bar(100), format!("{}│{}", "░".repeat(10), "█".repeat(10)));
        assert_eq!(bar(-100), format!("{}│{}", "█".repeat(10), "░".repeat(10)));
        assert_eq!(bar(50).chars().filter(|c| *c == '█').count(), 5);
    }
}
