use anyhow::Result;
use rusqlite::{Connection, params};

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS categories (
            id     TEXT PRIMARY KEY,
            title  TEXT NOT NULL UNIQUE COLLATE NOCASE,
            color  TEXT
        );

        CREATE TABLE IF NOT EXISTS entries (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL,
            title        TEXT,
            content      TEXT NOT NULL,
            mood         TEXT NOT NULL DEFAULT 'neutral'
                         CHECK(mood IN ('very-sad','sad','neutral','happy','very-happy')),
            category_id  TEXT REFERENCES categories(id) ON DELETE SET NULL,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_user_created
            ON entries(user_id, created_at DESC);

        CREATE TABLE IF NOT EXISTS assets (
            id          TEXT PRIMARY KEY,
            filename    TEXT NOT NULL,
            size_bytes  INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS entry_images (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id  TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
            asset_id  TEXT NOT NULL REFERENCES assets(id),
            caption   TEXT NOT NULL DEFAULT '',
            alt       TEXT NOT NULL,
            position  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_prompts (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL UNIQUE,
            prompt          TEXT NOT NULL,
            emoji           TEXT,
            category_id     TEXT REFERENCES categories(id) ON DELETE SET NULL,
            suggested_mood  TEXT,
            is_active       INTEGER NOT NULL DEFAULT 1,
            weight          REAL CHECK(weight IS NULL OR weight >= 0),
            tags            TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    seed_builtins(conn)?;
    Ok(())
}

fn seed_builtins(conn: &Connection) -> Result<()> {
    let categories = [
        ("category-gratitude", "Gratitude", "#22c55e"),
        ("category-reflection", "Reflection", "#3b82f6"),
        ("category-growth", "Growth", "#eab308"),
        ("category-wellbeing", "Wellbeing", "#ec4899"),
    ];

    for (id, title, color) in &categories {
        conn.execute(
            "INSERT OR IGNORE INTO categories (id, title, color) VALUES (?1, ?2, ?3)",
            params![id, title, color],
        )?;
    }

    // (id, title, prompt, emoji, category, mood, weight, tags)
    let prompts = [
        ("prompt-three-good-things", "Three Good Things",
         "What are three things that went well today, and why did they happen?",
         "🌱", "category-gratitude", "happy", 3.0, r#"["gratitude","evening"]"#),
        ("prompt-thank-you", "Unsent Thank You",
         "Who made your week a little easier? Write them the thank-you you haven't sent.",
         "💌", "category-gratitude", "happy", 2.0, r#"["gratitude","people"]"#),
        ("prompt-on-your-mind", "On Your Mind",
         "What has been taking up the most space in your head lately?",
         "🧠", "category-reflection", "neutral", 2.0, r#"["reflection"]"#),
        ("prompt-small-win", "Small Win",
         "Describe a small win from today that nobody else noticed.",
         "🏅", "category-growth", "very-happy", 1.5, r#"["growth","evening"]"#),
        ("prompt-hard-moment", "Hard Moment",
         "What was the hardest moment of today? What would you tell a friend who went through it?",
         "🌧️", "category-wellbeing", "sad", 1.0, r#"["wellbeing"]"#),
        ("prompt-energy", "Energy Check",
         "When did you feel most energised today, and when most drained?",
         "⚡", "category-wellbeing", "neutral", 1.0, r#"["wellbeing","morning"]"#),
        ("prompt-learned", "Something New",
         "What is one thing you learned this week that changed how you see something?",
         "📚", "category-growth", "happy", 1.0, r#"["growth"]"#),
        ("prompt-tomorrow", "Tomorrow's Intention",
         "What is one intention you want to carry into tomorrow?",
         "🌅", "category-reflection", "neutral", 1.0, r#"["reflection","morning"]"#),
    ];

    for (id, title, prompt, emoji, category, mood, weight, tags) in &prompts {
        conn.execute(
            "INSERT OR IGNORE INTO daily_prompts
                (id, title, prompt, emoji, category_id, suggested_mood, is_active, weight, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
            params![id, title, prompt, emoji, category, mood, weight, tags],
        )?;
    }
    Ok(())
}
