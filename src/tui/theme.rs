use ratatui::style::{Color, Modifier, Style};

use crate::models::Mood;

// Ink on warm paper, dimmed for a dark terminal
pub const BG: Color = Color::Rgb(20, 18, 22);
pub const SURFACE: Color = Color::Rgb(30, 27, 33);
pub const BORDER: Color = Color::Rgb(62, 56, 70);
pub const BORDER_FOCUS: Color = Color::Rgb(224, 168, 92);
pub const TEXT: Color = Color::Rgb(236, 228, 214);
pub const TEXT_DIM: Color = Color::Rgb(138, 128, 124);
pub const GOLD: Color = Color::Rgb(224, 168, 92);
pub const GREEN: Color = Color::Rgb(120, 170, 110);
pub const AMBER: Color = Color::Rgb(232, 124, 64);
pub const RED: Color = Color::Rgb(200, 86, 86);
pub const BLUE: Color = Color::Rgb(110, 146, 200);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn mood(mood: Mood) -> Style {
    let color = match mood {
        Mood::VerySad => BLUE,
        Mood::Sad => TEXT_DIM,
        Mood::Neutral => TEXT,
        Mood::Happy => GREEN,
        Mood::VeryHappy => GOLD,
    };
    Style::default().fg(color)
}

/// Category chip color from a `#rrggbb` string, dim when absent or malformed.
pub fn category(color: Option<&str>) -> Style {
    color
        .and_then(parse_hex)
        .map(|c| Style::default().fg(c))
        .unwrap_or_else(dim)
}

fn parse_hex(raw: &str) -> Option<Color> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}
