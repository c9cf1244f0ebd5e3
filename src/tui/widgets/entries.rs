use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::journal::DayGroup;
use crate::models::JournalEntry;
use crate::streaks::parse_instant;
use crate::tui::theme;
use crate::utils::format::truncate;

/// Entries under day headings. `selected` counts entries only, in display order.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    groups: &[DayGroup<&JournalEntry>],
    selected: usize,
    focused: bool,
) {
    let border = if focused {
        Style::default().fg(theme::BORDER_FOCUS)
    } else {
        Style::default().fg(theme::BORDER)
    };
    let count: usize = groups.iter().map(|g| g.entries.len()).sum();
    let block = Block::default()
        .title(Span::styled(format!(" Journal ({}) ", count), theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(theme::surface());

    if count == 0 {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Nothing written yet.", theme::dim())),
            Line::from(Span::styled(
                "  Press [n] to start today's entry.",
                theme::dim(),
            )),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(22) as usize;
    let mut items = Vec::new();
    let mut selected_row = 0;
    let mut idx = 0;
    for group in groups {
        items.push(ListItem::new(Line::from(Span::styled(
            format!(" {}", group.label()),
            theme::gold().add_modifier(Modifier::BOLD),
        ))));
        for entry in &group.entries {
            let is_selected = idx == selected;
            if is_selected {
                selected_row = items.len();
            }
            let time = parse_instant(&entry.created_at)
                .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            let (cursor, title_style) = if is_selected && focused {
                ("▶ ", theme::gold().add_modifier(Modifier::BOLD))
            } else {
                ("  ", theme::bold())
            };
            let mut spans = vec![
                Span::styled(format!(" {}", cursor), theme::gold()),
                Span::styled(format!("{}  ", time), theme::dim()),
                Span::styled(format!("{} ", entry.mood.emoji()), theme::mood(entry.mood)),
                Span::styled(truncate(entry.display_title(), width), title_style),
            ];
            if !entry.images.is_empty() {
                spans.push(Span::styled(format!("  🖼 {}", entry.images.len()), theme::dim()));
            }
            items.push(ListItem::new(Line::from(spans)));
            idx += 1;
        }
    }

    let mut state = ListState::default();
    state.select(Some(selected_row));
    let list = List::new(items).block(block);
    frame.render_stateful_widget(list, area, &mut state);
}
