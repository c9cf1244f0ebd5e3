use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::streaks::StreakSummary;
use crate::tui::theme;
use crate::utils::format::{plural_days, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, summary: Option<&StreakSummary>) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let Some(summary) = summary else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  No profile configured", theme::dim())),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };
    let result = &summary.result;

    let (flame, flame_style) = if summary.is_active {
        ("🔥", theme::amber().add_modifier(Modifier::BOLD))
    } else {
        ("🪵", theme::dim())
    };

    let count_line = Line::from(vec![
        Span::styled(format!("  {} ", flame), flame_style),
        Span::styled(
            plural_days(result.current_streak),
            theme::green().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   ·   best {}", plural_days(result.longest_streak)),
            theme::dim(),
        ),
    ]);

    let message_line = Line::from(Span::styled(
        format!("  {}", summary.status_message),
        theme::bold(),
    ));

    let milestone_line = if summary.days_until_next_milestone > 0 {
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(
                progress_bar(result.current_streak, summary.next_milestone, 12),
                theme::green(),
            ),
            Span::styled(
                format!(
                    "  {} to {}",
                    plural_days(summary.days_until_next_milestone),
                    plural_days(summary.next_milestone)
                ),
                theme::dim(),
            ),
        ])
    } else {
        Line::from(Span::styled("  ✓ Every milestone reached", theme::green()))
    };

    let text = vec![
        Line::from(""),
        count_line,
        Line::from(""),
        message_line,
        Line::from(""),
        milestone_line,
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
