use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::DailyPrompt;
use crate::tui::theme;

/// One card of the carousel, with position dots underneath.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    prompt: Option<&DailyPrompt>,
    position: usize,
    total: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Today's Prompt ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let Some(prompt) = prompt else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  No active prompts", theme::dim())),
            Line::from(Span::styled(
                "  Add one with `daybook prompts add`",
                theme::dim(),
            )),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {} ", prompt.emoji.as_deref().unwrap_or("✍️")),
                theme::gold(),
            ),
            Span::styled(
                prompt.title.as_str(),
                theme::gold().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("  {}", prompt.prompt), theme::bold())),
        Line::from(""),
    ];

    let mut meta = Vec::new();
    if let Some(category) = &prompt.category {
        meta.push(category.title.clone());
    }
    if let Some(mood) = prompt.suggested_mood {
        meta.push(format!("{} {}", mood.emoji(), mood));
    }
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", meta.join("  ·  ")),
            theme::dim(),
        )));
    }

    let mut dots = vec![Span::styled("  ", theme::dim())];
    for i in 0..total {
        if i == position {
            dots.push(Span::styled("● ", theme::gold()));
        } else {
            dots.push(Span::styled("○ ", theme::dim()));
        }
    }
    dots.push(Span::styled("  [←→] more  [w] write  [p] shuffle", theme::dim()));
    lines.push(Line::from(""));
    lines.push(Line::from(dots));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
