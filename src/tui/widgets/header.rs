use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::streaks::WeekDay;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, greeting: &str, week: &[WeekDay; 7]) {
    let today = week
        .iter()
        .find(|d| d.is_today)
        .map(|d| d.date.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_default();

    let title_line = Line::from(vec![
        Span::styled("  ✍  ", theme::gold()),
        Span::styled(greeting, theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today, theme::dim()),
    ]);

    let mut day_spans = Vec::new();
    for day in week {
        let label = day.date.format("%a %-d").to_string();
        let mark = if day.has_entry { "●" } else { "○" };
        let style = if day.is_today {
            theme::gold().add_modifier(Modifier::BOLD)
        } else if day.has_entry {
            theme::green()
        } else {
            theme::dim()
        };
        day_spans.push(Span::styled(format!(" {} {} ", label, mark), style));
    }

    let text = vec![title_line, Line::from(""), Line::from(day_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
