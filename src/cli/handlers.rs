use anyhow::{Context, Result, anyhow};
use chrono::{Local, Timelike, Utc};
use rand::{Rng, thread_rng};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use crate::assets::{AssetRef, AssetStore, responsive_urls};
use crate::cli::args::{CategoryCommands, PromptCommands};
use crate::config::AppConfig;
use crate::db::repository::{AssetRepo, CategoryRepo, EntryRepo, MetaRepo, PromptRepo};
use crate::journal::group_by_date;
use crate::models::{
    CategoryPatch, DailyPrompt, EntryPatch, JournalEntry, Mood, NewEntry, NewImage, NewPrompt,
};
use crate::sampler::{select_weighted, select_weighted_multiple};
use crate::sources::{Identity, PromptSource, greeting_name};
use crate::streaks::{Calendar, StreakSummary};
use crate::utils::format::{greeting, plural_days, preview, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! print_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        print!("\x1b[0m");
    }};
}

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn user_id(config: &AppConfig) -> Result<&str> {
    config
        .profile
        .current_user_id()
        .ok_or_else(|| anyhow!("No profile configured. Run `daybook setup --reset`."))
}

// ─── Setup wizard ────────────────────────────────────────────────────────────

pub fn handle_setup(conn: &Connection, config: &mut AppConfig, reset: bool) -> Result<()> {
    if !reset {
        if let Some(done) = MetaRepo::get(conn, "setup_done")? {
            if done == "1" {
                println!("daybook is already configured. Use --reset to reconfigure.");
                return Ok(());
            }
        }
    }
    crate::cli::setup_tui::run_setup_tui(conn, config)
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub fn handle_new(
    conn: &Connection,
    config: &AppConfig,
    content: &str,
    title: Option<String>,
    mood: &str,
    category: Option<&str>,
    images: &[PathBuf],
) -> Result<()> {
    let mood = Mood::from_str(mood)?;
    let category_id = match category {
        Some(key) => Some(CategoryRepo::resolve(conn, key)?.id),
        None => None,
    };

    let store = AssetStore::new(AppConfig::assets_dir()?);
    let mut attached = Vec::with_capacity(images.len());
    for path in images {
        let asset = store.upload(conn, path)?;
        attached.push(NewImage {
            asset_id: asset.id,
            caption: None,
            alt: None,
        });
    }

    let entry = EntryRepo::create(
        conn,
        &NewEntry {
            user_id: user_id(config)?.to_string(),
            title,
            content: content.to_string(),
            mood,
            category_id,
            images: attached,
        },
    )?;

    println_colored!(
        GREEN,
        "  ✓ Saved {} {}",
        entry.mood.emoji(),
        entry.display_title()
    );
    println_colored!(DIM, "    id {}", entry.id);

    let entries = EntryRepo::get_for_user(conn, &entry.user_id)?;
    let summary = StreakSummary::from_entries(&entries, &Calendar::local(), &config.streak.milestones());
    println_colored!(AMBER, "  🔥 {}", summary.status_message);
    Ok(())
}

pub fn handle_list(conn: &Connection, config: &AppConfig, limit: Option<usize>) -> Result<()> {
    let mut entries = EntryRepo::get_for_user(conn, user_id(config)?)?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    println!();
    if entries.is_empty() {
        println_colored!(DIM, "  No entries yet. Write one with `daybook new \"...\"`");
        println!();
        return Ok(());
    }

    for group in group_by_date(&entries, &Calendar::local()) {
        println_colored!(GOLD, "  {}", group.label());
        for entry in &group.entries {
            let time = crate::streaks::parse_instant(&entry.created_at)
                .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            print_colored!(DIM, "    {}  ", time);
            print!("{}  {}", entry.mood.emoji(), preview(entry.display_title(), 48));
            if let Some(category) = &entry.category {
                print_colored!(DIM, "  #{}", category.title);
            }
            println_colored!(DIM, "  {}", short_id(&entry.id));
        }
        println!();
    }
    Ok(())
}

pub fn handle_show(conn: &Connection, config: &AppConfig, id: &str) -> Result<()> {
    let entry = find_entry(conn, id)?;

    println!();
    println_colored!(BOLD, "  {} {}", entry.mood.emoji(), entry.display_title());
    let written = crate::streaks::parse_instant(&entry.created_at)
        .map(|t| t.with_timezone(&Local).format("%A, %B %-d, %Y at %H:%M").to_string())
        .unwrap_or_else(|| entry.created_at.clone());
    println_colored!(DIM, "  {}  ·  {}", written, entry.mood);
    if let Some(category) = &entry.category {
        println_colored!(DIM, "  Category: {}", category.title);
    }
    println!();
    for line in entry.content.lines() {
        println!("  {}", line);
    }

    if !entry.images.is_empty() {
        let store = AssetStore::new(AppConfig::assets_dir()?);
        let base = config.images.base_url_or(store.dir());
        let options = config.images.entry_options();
        println!();
        println_colored!(GOLD, "  Images");
        for image in &entry.images {
            let asset = AssetRef::new(&image.asset_id);
            let label = if image.caption.is_empty() { &image.alt } else { &image.caption };
            print!("  {}", label);
            match AssetRepo::get(conn, &asset.id)? {
                Some(stored) if store.path_of(&asset).exists() => {
                    println_colored!(DIM, "  ({}, {} KB)", stored.filename, stored.size_bytes.div_ceil(1024));
                }
                _ => println_colored!(RED, "  (missing)"),
            }
            println_colored!(DIM, "    {}", asset.url(&base, &options));
            println_colored!(DIM, "    thumb {}", responsive_urls(&asset, &base).thumbnail);
        }
    }
    println!();
    Ok(())
}

pub fn handle_edit(
    conn: &Connection,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    mood: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let entry = find_entry(conn, id)?;
    let patch = EntryPatch {
        title: title.map(|t| Some(t).filter(|t| !t.trim().is_empty())),
        content,
        mood: mood.map(Mood::from_str).transpose()?,
        category_id: match category {
            Some(key) if key.eq_ignore_ascii_case("none") => Some(None),
            Some(key) => Some(Some(CategoryRepo::resolve(conn, key)?.id)),
            None => None,
        },
    };
    if patch.is_empty() {
        println_colored!(DIM, "  Nothing to change");
        return Ok(());
    }

    let updated = EntryRepo::update(conn, &entry.id, &patch)?;
    println_colored!(GREEN, "  ✓ Updated {}", updated.display_title());
    Ok(())
}

pub fn handle_delete(conn: &Connection, id: &str, yes: bool) -> Result<()> {
    let entry = find_entry(conn, id)?;
    if !yes {
        let answer = prompt(&format!(
            "  Delete \"{}\"? This cannot be undone. [y/N] ",
            preview(entry.display_title(), 40)
        ))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println_colored!(DIM, "  Kept");
            return Ok(());
        }
    }
    EntryRepo::delete(conn, &entry.id)?;
    println_colored!(RED, "  ✗ Deleted {}", entry.display_title());
    Ok(())
}

/// Accepts a full id or an unambiguous prefix of one.
fn find_entry(conn: &Connection, id: &str) -> Result<JournalEntry> {
    if let Some(entry) = EntryRepo::get_by_id(conn, id)? {
        return Ok(entry);
    }
    let mut stmt = conn.prepare("SELECT id FROM entries WHERE id LIKE ?1 || '%' LIMIT 2")?;
    let ids = stmt
        .query_map([id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    match ids.as_slice() {
        [only] => EntryRepo::get_by_id(conn, only)?
            .ok_or_else(|| crate::error::JournalError::EntryNotFound(id.to_string()).into()),
        [] => Err(crate::error::JournalError::EntryNotFound(id.to_string()).into()),
        _ => Err(anyhow!("'{}' matches more than one entry, use more characters", id)),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

// ─── Streak ──────────────────────────────────────────────────────────────────

pub fn handle_streak(conn: &Connection, config: &AppConfig) -> Result<()> {
    let calendar = Calendar::local();
    let summary = StreakSummary::load(conn, &config.profile, &calendar, &config.streak.milestones())?
        .ok_or_else(|| anyhow!("No profile configured. Run `daybook setup --reset`."))?;
    let result = &summary.result;

    println!();
    println_colored!(
        GOLD,
        "  {}, {}",
        greeting(Local::now().hour()),
        greeting_name(&config.profile)
    );
    println!();

    let flame = if summary.is_active { "🔥" } else { "🪵" };
    println_colored!(
        BOLD,
        "  {} {} current  |  {} best",
        flame,
        plural_days(result.current_streak),
        plural_days(result.longest_streak)
    );
    println_colored!(AMBER, "  {}", summary.status_message);

    if summary.days_until_next_milestone > 0 {
        let bar = progress_bar(result.current_streak, summary.next_milestone, 20);
        println!(
            "  {}  {} to go until {}",
            bar,
            plural_days(summary.days_until_next_milestone),
            plural_days(summary.next_milestone)
        );
    } else if summary.next_milestone > 0 {
        println_colored!(GREEN, "  ✓ Every milestone reached");
    }

    if let Some(last) = result.last_entry_date {
        let total = EntryRepo::count_for_user(conn, user_id(config)?)?;
        println_colored!(
            DIM,
            "  Last entry: {}  ·  {} entries on {}",
            last.format("%A, %B %-d"),
            total,
            plural_days(result.streak_dates.len() as u32)
        );
    }

    println!();
    print!("  ");
    for day in calendar.week_strip(&result.streak_dates) {
        let label = day.date.format("%a").to_string();
        let mark = if day.has_entry { "●" } else { "○" };
        if day.is_today {
            print_colored!(BOLD, "{} {}  ", label, mark);
        } else if day.has_entry {
            print_colored!(GREEN, "{} {}  ", label, mark);
        } else {
            print_colored!(DIM, "{} {}  ", label, mark);
        }
    }
    println!();
    println!();
    Ok(())
}

// ─── Prompts ─────────────────────────────────────────────────────────────────

pub fn handle_prompt(conn: &Connection, count: usize, tag: Option<&str>) -> Result<()> {
    let pool = match tag {
        Some(tag) => PromptRepo::get_by_tag(conn, tag)?,
        None => conn.fetch_active_prompts()?,
    };
    let picked = pick_prompts(&pool, count, &mut thread_rng());

    println!();
    if picked.is_empty() {
        println_colored!(DIM, "  No active prompts. Add one with `daybook prompts add`.");
    }
    for prompt in picked {
        print_prompt(prompt);
    }
    Ok(())
}

/// One weighted pick, or `count` distinct ones.
fn pick_prompts<'a, R: Rng + ?Sized>(
    pool: &'a [DailyPrompt],
    count: usize,
    rng: &mut R,
) -> Vec<&'a DailyPrompt> {
    if count <= 1 {
        select_weighted(pool, rng).into_iter().collect()
    } else {
        select_weighted_multiple(pool, count, rng)
    }
}

fn print_prompt(prompt: &DailyPrompt) {
    let emoji = prompt.emoji.as_deref().unwrap_or("✍️");
    println_colored!(GOLD, "  {} {}", emoji, prompt.title);
    println!("  {}", prompt.prompt);
    let mut meta = Vec::new();
    if let Some(category) = &prompt.category {
        meta.push(category.title.clone());
    }
    if let Some(mood) = prompt.suggested_mood {
        meta.push(format!("{} {}", mood.emoji(), mood));
    }
    if !meta.is_empty() {
        println_colored!(DIM, "  {}", meta.join("  ·  "));
    }
    println!();
}

pub fn handle_prompts(conn: &Connection, action: &PromptCommands) -> Result<()> {
    match action {
        PromptCommands::List { all } => {
            let prompts = if *all {
                PromptRepo::get_all(conn)?
            } else {
                PromptRepo::get_active(conn)?
            };
            println!();
            println_colored!(GOLD, "  Daily Prompts ({})", prompts.len());
            println!();
            for p in &prompts {
                let weight = p.weight.map(|w| format!("{}", w)).unwrap_or_else(|| "1".to_string());
                let state = if p.is_active { "" } else { "  (inactive)" };
                print!("  {:<28}", p.id);
                print!("  {:<24}", preview(&p.title, 24));
                println_colored!(DIM, "  w={}{}  {}", weight, state, p.tags.join(","));
            }
            println!();
        }
        PromptCommands::Show { id } => {
            let p = PromptRepo::get_by_id(conn, id)?
                .ok_or_else(|| crate::error::JournalError::PromptNotFound(id.clone()))?;
            println!();
            print_prompt(&p);
            if !p.tags.is_empty() {
                println_colored!(DIM, "  Tags: {}", p.tags.join(", "));
            }
            println_colored!(
                DIM,
                "  Weight: {}  ·  {}",
                p.weight.unwrap_or(1.0),
                if p.is_active { "active" } else { "inactive" }
            );
            println!();
        }
        PromptCommands::Add {
            title,
            prompt,
            emoji,
            category,
            mood,
            weight,
            tags,
        } => {
            let category_id = match category {
                Some(key) => Some(CategoryRepo::resolve(conn, key)?.id),
                None => None,
            };
            let created = PromptRepo::create(
                conn,
                &NewPrompt {
                    title: title.clone(),
                    prompt: prompt.clone(),
                    emoji: emoji.clone(),
                    category_id,
                    suggested_mood: mood.as_deref().map(Mood::from_str).transpose()?,
                    weight: *weight,
                    tags: tags.clone(),
                },
            )?;
            println_colored!(GREEN, "  ✓ Added prompt: {} ({})", created.title, created.id);
        }
        PromptCommands::Toggle { id, off } => {
            PromptRepo::set_active(conn, id, !off)?;
            if *off {
                println_colored!(DIM, "  ○ {} deactivated", id);
            } else {
                println_colored!(GREEN, "  ✓ {} active", id);
            }
        }
    }
    Ok(())
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub fn handle_categories(conn: &Connection, action: &CategoryCommands) -> Result<()> {
    match action {
        CategoryCommands::List => {
            let categories = CategoryRepo::list(conn)?;
            println!();
            println_colored!(GOLD, "  Categories");
            println!();
            for c in &categories {
                println!(
                    "  {:<20}  {:<9}  {}",
                    c.title,
                    c.color.as_deref().unwrap_or("-"),
                    c.id
                );
            }
            println!();
        }
        CategoryCommands::Add { title, color } => {
            let created = CategoryRepo::create(conn, title, color.as_deref())?;
            println_colored!(GREEN, "  ✓ Added category: {}", created.title);
        }
        CategoryCommands::Update {
            category,
            title,
            color,
        } => {
            let existing = CategoryRepo::resolve(conn, category)?;
            let patch = CategoryPatch {
                title: title.clone(),
                color: color.as_deref().map(|c| {
                    Some(c.to_string()).filter(|c| !c.eq_ignore_ascii_case("none"))
                }),
            };
            let updated = CategoryRepo::update(conn, &existing.id, &patch)?;
            println_colored!(GREEN, "  ✓ Updated category: {}", updated.title);
        }
        CategoryCommands::Delete { category } => {
            let existing = CategoryRepo::resolve(conn, category)?;
            CategoryRepo::delete(conn, &existing.id)?;
            println_colored!(AMBER, "  Deleted category: {}", existing.title);
        }
    }
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Export<'a> {
    exported_at: String,
    user_id: &'a str,
    streak: StreakSummary,
    entries: Vec<JournalEntry>,
}

pub fn handle_export(conn: &Connection, config: &AppConfig, json: bool) -> Result<()> {
    let user = user_id(config)?;
    let entries = EntryRepo::get_for_user(conn, user)?;
    let calendar = Calendar::local();
    let streak = StreakSummary::from_entries(&entries, &calendar, &config.streak.milestones());

    if json {
        let export = Export {
            exported_at: crate::db::repository::timestamp(Utc::now()),
            user_id: user,
            streak,
            entries,
        };
        let out = serde_json::to_string_pretty(&export).context("Serializing export")?;
        println!("{}", out);
        return Ok(());
    }

    println!("# daybook: {}", greeting_name(&config.profile));
    println!("# {}", calendar.today().format("%Y-%m-%d"));
    println!();
    println!(
        "Streak: {} (best: {})",
        plural_days(streak.result.current_streak),
        plural_days(streak.result.longest_streak)
    );
    println!("Entries: {}", entries.len());

    for group in group_by_date(&entries, &calendar) {
        println!();
        println!("## {}", group.label());
        for entry in &group.entries {
            println!();
            println!("### {} {}", entry.mood.emoji(), entry.display_title());
            if let Some(category) = &entry.category {
                println!("_{}_", category.title);
            }
            println!();
            println!("{}", entry.content);
        }
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn single_prompt_pick() {
        let conn = open_in_memory().unwrap();
        let pool = conn.fetch_active_prompts().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(pick_prompts(&pool, 1, &mut rng).len(), 1);
        assert_eq!(pick_prompts(&pool, 0, &mut rng).len(), 1);
        assert!(pick_prompts(&[], 1, &mut rng).is_empty());
    }

    #[test]
    fn several_prompts_are_distinct() {
        let conn = open_in_memory().unwrap();
        let pool = conn.fetch_active_prompts().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut ids: Vec<&str> = pick_prompts(&pool, 3, &mut rng)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
