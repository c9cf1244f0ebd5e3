use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, notice: Option<&str>) {
    if let Some(notice) = notice {
        let paragraph = Paragraph::new(Line::from(Span::styled(notice, theme::amber())))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = vec![
        ("[n]", " new  "),
        ("[w]", " write prompt  "),
        ("[↑↓]", " browse  "),
        ("[Enter]", " open  "),
        ("[x]", " delete  "),
        ("[p]", " shuffle  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
