use anyhow::Result;
use chrono::{Local, Timelike};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use rand::Rng;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::EntryRepo;
use crate::journal::group_by_date;
use crate::models::{DailyPrompt, JournalEntry, Mood, NewEntry};
use crate::sampler::select_weighted_multiple;
use crate::sources::{EntrySource, Identity, PromptSource, greeting_name};
use crate::streaks::{Calendar, StreakSummary, WeekDay};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{entries, header, prompts, statusbar, streak};
use crate::utils::format::greeting;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Entry,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Compose,
    ConfirmDelete,
}

/// Draft for the quick-entry popup.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub draft: Draft,
    pub notice: Option<String>,

    // Cached state (refreshed on load/action)
    pub calendar: Calendar<Local>,
    pub entries: Vec<JournalEntry>,
    pub selected: usize,
    pub summary: Option<StreakSummary>,
    pub week: [WeekDay; 7],
    pub prompt_pool: Vec<DailyPrompt>,
    /// Indices into `prompt_pool`, in draw order
    pub carousel: Vec<usize>,
    pub carousel_pos: usize,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let calendar = Calendar::local();
        let week = calendar.week_strip(&[]);
        App {
            view: View::Dashboard,
            config,
            should_quit: false,
            input_mode: InputMode::Normal,
            draft: Draft::default(),
            notice: None,
            calendar,
            entries: Vec::new(),
            selected: 0,
            summary: None,
            week,
            prompt_pool: Vec::new(),
            carousel: Vec::new(),
            carousel_pos: 0,
        }
    }

    pub fn load<S>(&mut self, source: &S) -> Result<()>
    where
        S: EntrySource + PromptSource + ?Sized,
    {
        self.reload_entries(source)?;
        self.prompt_pool = source.fetch_active_prompts()?;
        self.reshuffle(&mut rand::thread_rng());
        Ok(())
    }

    /// Refetch entries and recompute everything derived from them.
    fn reload_entries<S: EntrySource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let milestones = self.config.streak.milestones();
        let Some(user_id) = self.config.profile.current_user_id() else {
            self.entries.clear();
            self.summary = None;
            self.week = self.calendar.week_strip(&[]);
            return Ok(());
        };

        let fetched = source.fetch_entries_for_user(user_id)?;
        // Keep entries in the order they are displayed
        self.entries = group_by_date(&fetched, &self.calendar)
            .into_iter()
            .flat_map(|g| g.entries.into_iter().cloned())
            .collect();

        let summary = StreakSummary::from_entries(&self.entries, &self.calendar, &milestones);
        self.week = self.calendar.week_strip(&summary.result.streak_dates);
        self.summary = Some(summary);
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        Ok(())
    }

    /// Draw a fresh carousel from the active prompts.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let size = self.config.prompts.carousel_size.max(1);
        let indexed: Vec<Indexed<'_>> = self
            .prompt_pool
            .iter()
            .enumerate()
            .map(|(idx, prompt)| Indexed { idx, prompt })
            .collect();
        self.carousel = select_weighted_multiple(&indexed, size, rng)
            .into_iter()
            .map(|p| p.idx)
            .collect();
        self.carousel_pos = 0;
        debug!("Carousel drawn: {:?}", self.carousel);
    }

    pub fn current_prompt(&self) -> Option<&DailyPrompt> {
        self.carousel
            .get(self.carousel_pos)
            .and_then(|&idx| self.prompt_pool.get(idx))
    }

    pub fn selected_entry(&self) -> Option<&JournalEntry> {
        self.entries.get(self.selected)
    }

    /// Roll over to a new day when the clock passes midnight.
    pub fn tick<S: EntrySource + ?Sized>(&mut self, source: &S) {
        let today = Local::now().date_naive();
        if today != self.calendar.today() {
            self.calendar = Calendar::local();
            if let Err(e) = self.reload_entries(source) {
                warn!("Reloading after date change failed: {:#}", e);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses, some terminals also send release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::Compose => self.handle_compose_key(key, conn),
            InputMode::ConfirmDelete => self.handle_confirm_key(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key),
                View::Entry => self.handle_entry_key(key),
                View::Help => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                        self.view = View::Dashboard;
                    }
                }
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        self.notice = None;
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => {
                if !self.carousel.is_empty() {
                    self.carousel_pos =
                        (self.carousel_pos + self.carousel.len() - 1) % self.carousel.len();
                }
            }
            KeyCode::Right => {
                if !self.carousel.is_empty() {
                    self.carousel_pos = (self.carousel_pos + 1) % self.carousel.len();
                }
            }
            KeyCode::Char('p') => {
                self.reshuffle(&mut rand::thread_rng());
            }
            KeyCode::Enter => {
                if self.selected_entry().is_some() {
                    self.view = View::Entry;
                }
            }
            KeyCode::Char('n') => {
                self.start_compose(Draft::default());
            }
            KeyCode::Char('w') => {
                let draft = match self.current_prompt() {
                    Some(prompt) => Draft {
                        title: Some(prompt.title.clone()),
                        content: String::new(),
                        mood: prompt.suggested_mood.unwrap_or_default(),
                    },
                    None => Draft::default(),
                };
                self.start_compose(draft);
            }
            KeyCode::Char('x') => {
                if self.selected_entry().is_some() {
                    self.input_mode = InputMode::ConfirmDelete;
                }
            }
            _ => {}
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.view = View::Dashboard;
            }
            KeyCode::Char('x') => {
                self.input_mode = InputMode::ConfirmDelete;
            }
            _ => {}
        }
    }

    fn start_compose(&mut self, draft: Draft) {
        if self.config.profile.current_user_id().is_none() {
            self.notice = Some("No profile configured, run `daybook setup --reset`".to_string());
            return;
        }
        self.draft = draft;
        self.input_mode = InputMode::Compose;
    }

    fn handle_compose_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.draft = Draft::default();
            }
            KeyCode::Tab => {
                self.draft.mood = self.draft.mood.cycle();
            }
            KeyCode::Enter => {
                if self.draft.content.trim().is_empty() {
                    self.notice = Some("Write something first".to_string());
                    return;
                }
                match self.save_draft(conn) {
                    Ok(()) => {
                        self.input_mode = InputMode::Normal;
                        self.draft = Draft::default();
                    }
                    Err(e) => {
                        warn!("Saving entry failed: {:#}", e);
                        self.notice = Some(format!("Could not save: {}", e));
                    }
                }
            }
            KeyCode::Backspace => {
                self.draft.content.pop();
            }
            KeyCode::Char(c) => {
                self.draft.content.push(c);
                self.notice = None;
            }
            _ => {}
        }
    }

    fn save_draft(&mut self, conn: &Connection) -> Result<()> {
        let user_id = self
            .config
            .profile
            .current_user_id()
            .unwrap_or_default()
            .to_string();
        let entry = EntryRepo::create(
            conn,
            &NewEntry {
                user_id,
                title: self.draft.title.clone(),
                content: self.draft.content.trim().to_string(),
                mood: self.draft.mood,
                category_id: self
                    .current_prompt()
                    .filter(|p| self.draft.title.as_deref() == Some(p.title.as_str()))
                    .and_then(|p| p.category.as_ref().map(|c| c.id.clone())),
                images: Vec::new(),
            },
        )?;
        self.reload_entries(conn)?;
        self.selected = self
            .entries
            .iter()
            .position(|e| e.id == entry.id)
            .unwrap_or(0);
        self.notice = self.summary.as_ref().map(|s| format!("Saved · {}", s.status_message));
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
                    let outcome = EntryRepo::delete(conn, &id).and_then(|()| self.reload_entries(conn));
                    self.notice = Some(match outcome {
                        Ok(()) => "Entry deleted".to_string(),
                        Err(e) => format!("Could not delete: {}", e),
                    });
                }
                self.input_mode = InputMode::Normal;
                self.view = View::Dashboard;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Entry => self.draw_entry(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        match self.input_mode {
            InputMode::Compose => self.draw_compose(frame),
            InputMode::ConfirmDelete => self.draw_confirm_delete(frame),
            InputMode::Normal => {}
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let hello = format!(
            "{}, {}",
            greeting(Local::now().hour()),
            greeting_name(&self.config.profile)
        );
        header::render(frame, outer_chunks[0], &hello, &self.week);
        statusbar::render(frame, outer_chunks[2], self.notice.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer_chunks[1]);

        // Left column: streak card over the prompt carousel
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[0]);

        streak::render(frame, left_chunks[0], self.summary.as_ref());
        prompts::render(
            frame,
            left_chunks[1],
            self.current_prompt(),
            self.carousel_pos,
            self.carousel.len(),
        );

        let groups = group_by_date(&self.entries, &self.calendar);
        entries::render(frame, columns[1], &groups, self.selected, true);
    }

    fn draw_entry(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let Some(entry) = self.selected_entry() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let written = crate::streaks::parse_instant(&entry.created_at)
            .map(|t| t.with_timezone(&Local).format("%A, %B %-d, %Y  %H:%M").to_string())
            .unwrap_or_else(|| entry.created_at.clone());

        let mut meta = vec![
            Span::styled(format!("  {}  ", written), theme::dim()),
            Span::styled(format!("{} {}", entry.mood.emoji(), entry.mood), theme::mood(entry.mood)),
        ];
        if let Some(category) = &entry.category {
            meta.push(Span::styled("  ·  ", theme::dim()));
            meta.push(Span::styled(
                category.title.as_str(),
                theme::category(category.color.as_deref()),
            ));
        }

        let mut lines = vec![Line::from(""), Line::from(meta), Line::from("")];
        for line in entry.content.lines() {
            lines.push(Line::from(Span::styled(format!("  {}", line), theme::bold())));
        }
        if !entry.images.is_empty() {
            lines.push(Line::from(""));
            for image in &entry.images {
                let label = if image.caption.is_empty() { &image.alt } else { &image.caption };
                lines.push(Line::from(Span::styled(format!("  🖼  {}", label), theme::dim())));
            }
        }

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", entry.display_title()),
                theme::gold().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("[Esc]", theme::gold()),
                Span::styled(" back  ", theme::dim()),
                Span::styled("[x]", theme::gold()),
                Span::styled(" delete", theme::dim()),
            ])),
            chunks[1],
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered(frame.area(), 50, 16);
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[n]", "New entry"),
            ("[w]", "Write about the shown prompt"),
            ("[← →]", "Previous / next prompt"),
            ("[p]", "Shuffle prompts"),
            ("[↑ ↓]", "Browse entries"),
            ("[Enter]", "Open entry"),
            ("[x]", "Delete entry"),
            ("[Tab]", "Cycle mood while writing"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), theme::gold()),
                Span::styled(action, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_compose(&self, frame: &mut Frame) {
        let popup_area = centered(frame.area(), 70, 12);
        frame.render_widget(Clear, popup_area);

        let mut text = vec![Line::from("")];
        if let Some(title) = &self.draft.title {
            text.push(Line::from(Span::styled(
                format!("  {}", title),
                theme::gold().add_modifier(Modifier::BOLD),
            )));
            text.push(Line::from(""));
        }
        text.push(Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(self.draft.content.as_str(), theme::bold()),
            Span::styled("█", theme::amber()),
        ]));
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("  Mood: ", theme::dim()),
            Span::styled(
                format!("{} {}", self.draft.mood.emoji(), self.draft.mood),
                theme::mood(self.draft.mood).add_modifier(Modifier::BOLD),
            ),
        ]));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "  [Enter] save  ·  [Tab] mood  ·  [Esc] cancel",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" New Entry ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::amber())
            .style(theme::surface());

        frame.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
            popup_area,
        );
    }

    fn draw_confirm_delete(&self, frame: &mut Frame) {
        let popup_area = centered(frame.area(), 50, 7);
        frame.render_widget(Clear, popup_area);

        let title = self
            .selected_entry()
            .map(|e| e.display_title().to_string())
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  Delete \"{}\"?", crate::utils::format::truncate(&title, 36)),
                theme::bold(),
            )),
            Line::from(Span::styled("  This cannot be undone.", theme::dim())),
            Line::from(""),
            Line::from(Span::styled("  [y] delete  ·  [n] keep", theme::dim())),
        ];

        let block = Block::default()
            .title(Span::styled(" Delete Entry ", theme::red()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Prompt with its position in the pool, so a draw can be mapped back.
struct Indexed<'a> {
    idx: usize,
    prompt: &'a DailyPrompt,
}

impl crate::sampler::Weighted for Indexed<'_> {
    fn weight(&self) -> Option<f64> {
        self.prompt.weight
    }
}

fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(1000);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break;
                }
            }
            Event::Resize => {}
            Event::Tick => {
                app.tick(&conn);
            }
        }
    }

    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn press(app: &mut App, conn: &Connection, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), conn);
    }

    fn loaded() -> (App, Connection) {
        let conn = open_in_memory().unwrap();
        let mut app = App::new(AppConfig::default());
        app.load(&conn).unwrap();
        (app, conn)
    }

    #[test]
    fn carousel_draws_distinct_prompts_and_wraps() {
        let (mut app, conn) = loaded();
        app.reshuffle(&mut StdRng::seed_from_u64(7));
        assert_eq!(app.carousel.len(), 3);
        let mut seen = app.carousel.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 3);

        press(&mut app, &conn, KeyCode::Left);
        assert_eq!(app.carousel_pos, 2);
        press(&mut app, &conn, KeyCode::Right);
        assert_eq!(app.carousel_pos, 0);
        assert!(app.current_prompt().is_some());
    }

    #[test]
    fn quick_entry_saves_and_starts_a_streak() {
        let (mut app, conn) = loaded();
        assert_eq!(app.summary.as_ref().unwrap().result.current_streak, 0);

        press(&mut app, &conn, KeyCode::Char('n'));
        assert_eq!(app.input_mode, InputMode::Compose);
        for c in "hello".chars() {
            press(&mut app, &conn, KeyCode::Char(c));
        }
        press(&mut app, &conn, KeyCode::Tab);
        press(&mut app, &conn, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].content, "hello");
        assert_eq!(app.entries[0].mood, Mood::Neutral.cycle());
        let summary = app.summary.as_ref().unwrap();
        assert_eq!(summary.result.current_streak, 1);
        assert!(summary.is_active);
        assert!(app.week.iter().any(|d| d.is_today && d.has_entry));
    }

    #[test]
    fn blank_draft_is_not_saved() {
        let (mut app, conn) = loaded();
        press(&mut app, &conn, KeyCode::Char('n'));
        press(&mut app, &conn, KeyCode::Char(' '));
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Compose);
        assert!(app.entries.is_empty());
    }

    #[test]
    fn writing_from_a_prompt_carries_its_title() {
        let (mut app, conn) = loaded();
        let title = app.current_prompt().unwrap().title.clone();
        press(&mut app, &conn, KeyCode::Char('w'));
        assert_eq!(app.draft.title.as_deref(), Some(title.as_str()));
        press(&mut app, &conn, KeyCode::Char('x'));
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.entries[0].title.as_deref(), Some(title.as_str()));
        assert!(app.entries[0].category.is_some());
    }

    #[test]
    fn delete_needs_confirmation() {
        let (mut app, conn) = loaded();
        EntryRepo::create(
            &conn,
            &NewEntry {
                user_id: "local".to_string(),
                title: None,
                content: "keep me?".to_string(),
                mood: Mood::Sad,
                category_id: None,
                images: Vec::new(),
            },
        )
        .unwrap();
        app.load(&conn).unwrap();

        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.view, View::Entry);
        press(&mut app, &conn, KeyCode::Char('x'));
        press(&mut app, &conn, KeyCode::Char('n'));
        assert_eq!(app.entries.len(), 1);

        press(&mut app, &conn, KeyCode::Char('x'));
        press(&mut app, &conn, KeyCode::Char('y'));
        assert!(app.entries.is_empty());
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.notice.as_deref(), Some("Entry deleted"));
    }
}
