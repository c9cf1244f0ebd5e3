use anyhow::Result;
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::MetaRepo;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;

const CAROUSEL_SIZES: [usize; 5] = [1, 2, 3, 4, 5];

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Welcome,
    DisplayName,
    UserId,
    CarouselSize,
    Confirm,
}

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct SetupWizard {
    step: Step,
    input: String,
    error: Option<String>,

    // Collected values
    display_name: String,
    user_id: String,
    carousel_idx: usize,

    should_quit: bool,
    confirmed: bool,
}

impl SetupWizard {
    fn new(existing: &AppConfig) -> Self {
        let carousel_idx = CAROUSEL_SIZES
            .iter()
            .position(|n| *n == existing.prompts.carousel_size)
            .unwrap_or(2);

        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,

            display_name: existing.profile.display_name.clone(),
            user_id: existing.profile.user_id.clone(),
            carousel_idx,

            should_quit: false,
            confirmed: false,
        }
    }

    fn step_number(&self) -> usize {
        match self.step {
            Step::Welcome => 0,
            Step::DisplayName => 1,
            Step::UserId => 2,
            Step::CarouselSize => 3,
            Step::Confirm => 4,
        }
    }

    const TOTAL_STEPS: usize = 4;

    fn advance(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => Step::DisplayName,
            Step::DisplayName => Step::UserId,
            Step::UserId => Step::CarouselSize,
            Step::CarouselSize => Step::Confirm,
            Step::Confirm => {
                self.confirmed = true;
                Step::Confirm
            }
        };
        self.prefill();
    }

    fn go_back(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => {
                self.should_quit = true;
                Step::Welcome
            }
            Step::DisplayName => Step::Welcome,
            Step::UserId => Step::DisplayName,
            Step::CarouselSize => Step::UserId,
            Step::Confirm => Step::CarouselSize,
        };
        self.prefill();
    }

    // Pre-fill input with current value when entering a text step
    fn prefill(&mut self) {
        self.input = match self.step {
            Step::DisplayName => self.display_name.clone(),
            Step::UserId => self.user_id.clone(),
            _ => String::new(),
        };
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match &self.step {
            Step::Welcome => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.advance();
                }
            }

            // Optional; empty falls back to the profile id in greetings
            Step::DisplayName => self.handle_text_input(key, |s| {
                if s.chars().count() > 40 {
                    Err("Keep it under 40 characters".to_string())
                } else {
                    Ok(())
                }
            }),

            Step::UserId => self.handle_text_input(key, validate_user_id),

            Step::CarouselSize => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.carousel_idx = self.carousel_idx.saturating_sub(1);
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    if self.carousel_idx + 1 < CAROUSEL_SIZES.len() {
                        self.carousel_idx += 1;
                    }
                }
                KeyCode::Char(c @ '1'..='5') => {
                    self.carousel_idx = c as usize - '1' as usize;
                }
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirmed = true;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn handle_text_input<F>(&mut self, key: crossterm::event::KeyEvent, validate: F)
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match validate(&val) {
                    Ok(()) => {
                        self.commit_text_input(&val);
                        self.advance();
                    }
                    Err(e) => {
                        self.error = Some(e);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Tab => {
                // Reset to default value for this step
                self.input = match self.step {
                    Step::DisplayName => String::new(),
                    Step::UserId => "local".to_string(),
                    _ => self.input.clone(),
                };
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self, val: &str) {
        match self.step {
            Step::DisplayName => self.display_name = val.to_string(),
            Step::UserId => self.user_id = val.to_string(),
            _ => {}
        }
    }

    fn carousel_size(&self) -> usize {
        CAROUSEL_SIZES[self.carousel_idx.min(CAROUSEL_SIZES.len() - 1)]
    }

    fn build_config(&self, existing: &AppConfig) -> AppConfig {
        let mut config = existing.clone();
        config.profile.display_name = self.display_name.clone();
        config.profile.user_id = self.user_id.clone();
        config.prompts.carousel_size = self.carousel_size();
        config
    }
}

fn validate_user_id(s: &str) -> std::result::Result<(), String> {
    if s.is_empty() {
        return Err("A profile id is required".to_string());
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err("Use letters, digits, '-', '_' or '.'".to_string());
    }
    Ok(())
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &SetupWizard) {
    let area = frame.area();

    frame.render_widget(Block::default().style(theme::base()), area);

    // Center the wizard box
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(24),
            Constraint::Min(0),
        ])
        .split(area);

    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface())
        .title(Span::styled(
            "  ✍  daybook  ·  Setup  ",
            theme::gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    frame.render_widget(outer_block, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner),
        Step::CarouselSize => draw_carousel_choice(frame, inner, wizard),
        Step::Confirm => draw_confirm(frame, inner, wizard),
        _ => draw_text_step(frame, inner, wizard),
    }

    draw_progress(frame, inner, wizard.step_number(), SetupWizard::TOTAL_STEPS);
}

fn draw_progress(frame: &mut Frame, area: Rect, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", theme::dim())];
    for i in 1..=total {
        if i < current {
            spans.push(Span::styled("● ", theme::green()));
        } else if i == current {
            spans.push(Span::styled("◉ ", theme::gold()));
        } else {
            spans.push(Span::styled("○ ", theme::dim()));
        }
    }
    let progress_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), progress_area);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to daybook",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "A small daily journal that keeps your writing streak.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("This wizard will set up:", theme::dim())),
        Line::from(vec![
            Span::styled("  ●  ", theme::gold()),
            Span::styled("The name you're greeted with", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::gold()),
            Span::styled("The profile your entries are saved under", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::gold()),
            Span::styled("How many writing prompts to show", theme::dim()),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_text_step(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let (title, subtitle, hint) = match wizard.step {
        Step::DisplayName => (
            "Your Name",
            "What should the dashboard call you? (optional)",
            "e.g.  Ana  ·  leave empty to skip",
        ),
        Step::UserId => (
            "Profile",
            "Entries and streaks are kept per profile",
            "e.g.  local,  ana-work  ·  [Tab] to reset",
        ),
        _ => ("", "", ""),
    };

    let cursor = if wizard.input.len() < 40 { "█" } else { "" };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    let input_display = format!("  {}{}  ", wizard.input, cursor);
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!("{:<width$}", input_display, width = input_width);

    let input_style = if wizard.error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    lines.push(Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))));
    lines.push(Line::from(""));

    if let Some(err) = &wizard.error {
        lines.push(Line::from(Span::styled(format!("  ✗  {}", err), theme::red())));
    } else {
        lines.push(Line::from(Span::styled(hint, theme::dim())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_carousel_choice(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let mut option_spans = vec![];
    for (i, n) in CAROUSEL_SIZES.iter().enumerate() {
        if i == wizard.carousel_idx {
            option_spans.push(Span::styled(
                format!(" ◉ {} ", n),
                theme::gold().add_modifier(Modifier::BOLD),
            ));
        } else {
            option_spans.push(Span::styled(format!(" ○ {} ", n), theme::dim()));
        }
    }

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Writing Prompts",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "How many prompts should the dashboard draw each time?",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(option_spans),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Prompts with more weight turn up more often.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "←→  or  1-5  choose   ·   Enter  confirm   ·   Esc  back",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_confirm(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let name = if wizard.display_name.is_empty() {
        "(not set)"
    } else {
        wizard.display_name.as_str()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Confirm Settings", theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Review your configuration:", theme::dim())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name      ", theme::dim()),
            Span::styled(name, theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Profile   ", theme::dim()),
            Span::styled(wizard.user_id.as_str(), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Prompts   ", theme::dim()),
            Span::styled(format!("{} at a time", wizard.carousel_size()), theme::bold()),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Enter  save   ·   Esc  go back", theme::dim())),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

// ─── Public entry point ──────────────────────────────────────────────────────

pub fn run_setup_tui(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let mut wizard = SetupWizard::new(config);
    let mut terminal = ratatui::init();
    let events = EventHandler::new(100);

    let outcome = loop {
        if let Err(e) = terminal.draw(|frame| draw(frame, &wizard)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                wizard.handle_key(key);
                if wizard.should_quit {
                    break Ok(());
                }
                if wizard.confirmed {
                    *config = wizard.build_config(config);
                    break config
                        .save()
                        .and_then(|()| MetaRepo::set(conn, "setup_done", "1"));
                }
            }
            Ok(Event::Tick | Event::Resize) => {}
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn press(wizard: &mut SetupWizard, code: KeyCode) {
        wizard.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(wizard: &mut SetupWizard, text: &str) {
        for c in text.chars() {
            press(wizard, KeyCode::Char(c));
        }
    }

    #[test]
    fn walks_through_every_step() {
        let mut wizard = SetupWizard::new(&AppConfig::default());
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::DisplayName);

        type_text(&mut wizard, "Ana");
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::UserId);
        assert_eq!(wizard.input, "local");

        press(&mut wizard, KeyCode::Backspace);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.user_id, "loca");

        press(&mut wizard, KeyCode::Char('5'));
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::Confirm);

        press(&mut wizard, KeyCode::Enter);
        assert!(wizard.confirmed);

        let config = wizard.build_config(&AppConfig::default());
        assert_eq!(config.profile.display_name, "Ana");
        assert_eq!(config.profile.user_id, "loca");
        assert_eq!(config.prompts.carousel_size, 5);
    }

    #[test]
    fn invalid_profile_id_keeps_the_step() {
        let mut wizard = SetupWizard::new(&AppConfig::default());
        wizard.step = Step::UserId;
        wizard.input = "has space".to_string();
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::UserId);
        assert!(wizard.error.is_some());

        press(&mut wizard, KeyCode::Tab);
        assert_eq!(wizard.input, "local");
        assert!(wizard.error.is_none());
    }

    #[test]
    fn escape_from_welcome_quits() {
        let mut wizard = SetupWizard::new(&AppConfig::default());
        press(&mut wizard, KeyCode::Esc);
        assert!(wizard.should_quit);
    }
}
