use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::str::FromStr;

use crate::assets::Asset;
use crate::error::JournalError;
use crate::models::{
    Category, CategoryPatch, CategoryRef, DailyPrompt, EntryImage, EntryPatch, JournalEntry, Mood,
    NewEntry, NewPrompt, entry::DEFAULT_IMAGE_ALT,
};

/// RFC 3339 with milliseconds and a `Z` suffix.
pub fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn category_from_columns(
    id: Option<String>,
    title: Option<String>,
    color: Option<String>,
) -> Option<CategoryRef> {
    match (id, title) {
        (Some(id), Some(title)) => Some(CategoryRef { id, title, color }),
        _ => None,
    }
}

// ─── Journal entries ─────────────────────────────────────────────────────────

const ENTRY_SELECT: &str = "
    SELECT e.id, e.user_id, e.title, e.content, e.mood, e.created_at,
           c.id, c.title, c.color
    FROM entries e
    LEFT JOIN categories c ON c.id = e.category_id";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let mood: String = row.get(4)?;
    Ok(JournalEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        mood: Mood::from_stored(&mood),
        created_at: row.get(5)?,
        category: category_from_columns(row.get(6)?, row.get(7)?, row.get(8)?),
        images: Vec::new(),
    })
}

pub struct EntryRepo;

impl EntryRepo {
    pub fn create(conn: &Connection, input: &NewEntry) -> Result<JournalEntry> {
        Self::create_at(conn, input, Utc::now())
    }

    /// Insert an entry stamped with `created_at`. Images must already be
    /// uploaded; they are attached in the order given.
    pub fn create_at(
        conn: &Connection,
        input: &NewEntry,
        created_at: DateTime<Utc>,
    ) -> Result<JournalEntry> {
        if input.content.trim().is_empty() {
            return Err(JournalError::EmptyContent.into());
        }
        if let Some(category_id) = &input.category_id {
            ensure_category(conn, category_id)?;
        }

        let id = new_id();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO entries (id, user_id, title, content, mood, category_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                input.user_id,
                input.title.as_deref().map(str::trim).filter(|t| !t.is_empty()),
                input.content,
                input.mood.as_str(),
                input.category_id,
                timestamp(created_at),
            ],
        )?;
        for (position, image) in input.images.iter().enumerate() {
            tx.execute(
                "INSERT INTO entry_images (entry_id, asset_id, caption, alt, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    image.asset_id,
                    image.caption.as_deref().unwrap_or(""),
                    image.alt.as_deref().unwrap_or(DEFAULT_IMAGE_ALT),
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        info!("Created entry {} ({} images)", id, input.images.len());

        Self::get_by_id(conn, &id)?.ok_or_else(|| JournalError::EntryNotFound(id).into())
    }

    /// Newest first.
    pub fn get_for_user(conn: &Connection, user_id: &str) -> Result<Vec<JournalEntry>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE e.user_id = ?1 ORDER BY e.created_at DESC, e.rowid DESC",
            ENTRY_SELECT
        ))?;
        let mut entries = stmt
            .query_map(params![user_id], entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for entry in &mut entries {
            entry.images = images_for(conn, &entry.id)?;
        }
        Ok(entries)
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<JournalEntry>> {
        let entry = conn
            .query_row(
                &format!("{} WHERE e.id = ?1", ENTRY_SELECT),
                params![id],
                entry_from_row,
            )
            .optional()?;
        match entry {
            None => Ok(None),
            Some(mut entry) => {
                entry.images = images_for(conn, &entry.id)?;
                Ok(Some(entry))
            }
        }
    }

    pub fn update(conn: &Connection, id: &str, patch: &EntryPatch) -> Result<JournalEntry> {
        let mut entry = Self::get_by_id(conn, id)?
            .ok_or_else(|| JournalError::EntryNotFound(id.to_string()))?;
        if patch.is_empty() {
            return Ok(entry);
        }

        if let Some(content) = &patch.content {
            if content.trim().is_empty() {
                return Err(JournalError::EmptyContent.into());
            }
            entry.content = content.clone();
        }
        if let Some(title) = &patch.title {
            entry.title = title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
        }
        if let Some(mood) = patch.mood {
            entry.mood = mood;
        }
        let category_id = match &patch.category_id {
            Some(Some(category_id)) => {
                ensure_category(conn, category_id)?;
                Some(category_id.clone())
            }
            Some(None) => None,
            None => entry.category.as_ref().map(|c| c.id.clone()),
        };

        conn.execute(
            "UPDATE entries SET title = ?1, content = ?2, mood = ?3, category_id = ?4
             WHERE id = ?5",
            params![entry.title, entry.content, entry.mood.as_str(), category_id, id],
        )?;
        info!("Updated entry {}", id);

        Self::get_by_id(conn, id)?.ok_or_else(|| JournalError::EntryNotFound(id.to_string()).into())
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<()> {
        let removed = conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(JournalError::EntryNotFound(id.to_string()).into());
        }
        info!("Deleted entry {}", id);
        Ok(())
    }

    pub fn count_for_user(conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }
}

fn images_for(conn: &Connection, entry_id: &str) -> Result<Vec<EntryImage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT asset_id, caption, alt FROM entry_images
         WHERE entry_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![entry_id], |row| {
        Ok(EntryImage {
            asset_id: row.get(0)?,
            caption: row.get(1)?,
            alt: row.get(2)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(anyhow::Error::from)
}

fn ensure_category(conn: &Connection, id: &str) -> Result<()> {
    if CategoryRepo::get_by_id(conn, id)?.is_none() {
        return Err(JournalError::CategoryNotFound(id.to_string()).into());
    }
    Ok(())
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub struct CategoryRepo;

impl CategoryRepo {
    pub fn list(conn: &Connection) -> Result<Vec<Category>> {
        let mut stmt = conn.prepare("SELECT id, title, color FROM categories ORDER BY title ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                title: row.get(1)?,
                color: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Category>> {
        conn.query_row(
            "SELECT id, title, color FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    color: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Case-insensitive.
    pub fn find_by_title(conn: &Connection, title: &str) -> Result<Option<Category>> {
        Ok(Self::list(conn)?
            .into_iter()
            .find(|c| c.title.to_lowercase() == title.trim().to_lowercase()))
    }

    /// Accepts either an id or a title.
    pub fn resolve(conn: &Connection, key: &str) -> Result<Category> {
        if let Some(category) = Self::get_by_id(conn, key)? {
            return Ok(category);
        }
        Self::find_by_title(conn, key)?
            .ok_or_else(|| JournalError::CategoryNotFound(key.to_string()).into())
    }

    pub fn create(conn: &Connection, title: &str, color: Option<&str>) -> Result<Category> {
        let title = title.trim();
        if title.is_empty() {
            return Err(anyhow!("Category title cannot be empty"));
        }
        let id = format!("category-{}", new_id());
        conn.execute(
            "INSERT INTO categories (id, title, color) VALUES (?1, ?2, ?3)",
            params![id, title, color],
        )?;
        Ok(Category {
            id,
            title: title.to_string(),
            color: color.map(str::to_string),
        })
    }

    pub fn update(conn: &Connection, id: &str, patch: &CategoryPatch) -> Result<Category> {
        let mut category = Self::get_by_id(conn, id)?
            .ok_or_else(|| JournalError::CategoryNotFound(id.to_string()))?;
        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(anyhow!("Category title cannot be empty"));
            }
            category.title = title.to_string();
        }
        if let Some(color) = &patch.color {
            category.color = color.clone();
        }
        conn.execute(
            "UPDATE categories SET title = ?1, color = ?2 WHERE id = ?3",
            params![category.title, category.color, id],
        )?;
        Ok(category)
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<()> {
        let removed = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(JournalError::CategoryNotFound(id.to_string()).into());
        }
        Ok(())
    }
}

// ─── Daily prompts ───────────────────────────────────────────────────────────

const PROMPT_SELECT: &str = "
    SELECT p.id, p.title, p.prompt, p.emoji, p.suggested_mood, p.is_active,
           p.weight, p.tags, p.created_at, c.id, c.title, c.color
    FROM daily_prompts p
    LEFT JOIN categories c ON c.id = p.category_id";

const PROMPT_ORDER: &str = "ORDER BY COALESCE(p.weight, 1) DESC, p.title";

fn prompt_from_row(row: &Row<'_>) -> rusqlite::Result<DailyPrompt> {
    let mood: Option<String> = row.get(4)?;
    let tags: String = row.get(7)?;
    Ok(DailyPrompt {
        id: row.get(0)?,
        title: row.get(1)?,
        prompt: row.get(2)?,
        emoji: row.get(3)?,
        suggested_mood: mood.and_then(|m| Mood::from_str(&m).ok()),
        is_active: row.get::<_, i32>(5)? != 0,
        weight: row.get(6)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        created_at: row.get(8)?,
        category: category_from_columns(row.get(9)?, row.get(10)?, row.get(11)?),
    })
}

pub struct PromptRepo;

impl PromptRepo {
    /// Active prompts, heaviest first.
    pub fn get_active(conn: &Connection) -> Result<Vec<DailyPrompt>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE p.is_active = 1 {}",
            PROMPT_SELECT, PROMPT_ORDER
        ))?;
        let rows = stmt.query_map([], prompt_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn get_all(conn: &Connection) -> Result<Vec<DailyPrompt>> {
        let mut stmt = conn.prepare(&format!("{} {}", PROMPT_SELECT, PROMPT_ORDER))?;
        let rows = stmt.query_map([], prompt_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Active prompts carrying `tag`.
    pub fn get_by_tag(conn: &Connection, tag: &str) -> Result<Vec<DailyPrompt>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE p.is_active = 1
               AND EXISTS (SELECT 1 FROM json_each(p.tags) WHERE json_each.value = ?1)
             {}",
            PROMPT_SELECT, PROMPT_ORDER
        ))?;
        let rows = stmt.query_map(params![tag], prompt_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<DailyPrompt>> {
        conn.query_row(
            &format!("{} WHERE p.id = ?1", PROMPT_SELECT),
            params![id],
            prompt_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn create(conn: &Connection, input: &NewPrompt) -> Result<DailyPrompt> {
        if let Some(weight) = input.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(JournalError::InvalidWeight(weight).into());
            }
        }
        if input.title.trim().is_empty() || input.prompt.trim().is_empty() {
            return Err(anyhow!("Prompt title and text cannot be empty"));
        }
        if let Some(category_id) = &input.category_id {
            ensure_category(conn, category_id)?;
        }

        let id = format!("prompt-{}", new_id());
        conn.execute(
            "INSERT INTO daily_prompts
                (id, title, prompt, emoji, category_id, suggested_mood, is_active, weight, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?9)",
            params![
                id,
                input.title.trim(),
                input.prompt.trim(),
                input.emoji,
                input.category_id,
                input.suggested_mood.map(|m| m.as_str()),
                input.weight,
                serde_json::to_string(&input.tags)?,
                timestamp(Utc::now()),
            ],
        )?;
        info!("Added daily prompt {}", id);

        Self::get_by_id(conn, &id)?.ok_or_else(|| JournalError::PromptNotFound(id).into())
    }

    pub fn set_active(conn: &Connection, id: &str, active: bool) -> Result<()> {
        let changed = conn.execute(
            "UPDATE daily_prompts SET is_active = ?1 WHERE id = ?2",
            params![active as i32, id],
        )?;
        if changed == 0 {
            return Err(JournalError::PromptNotFound(id.to_string()).into());
        }
        Ok(())
    }
}

// ─── Assets ──────────────────────────────────────────────────────────────────

pub struct AssetRepo;

impl AssetRepo {
    /// Content-addressed, so recording the same upload twice is a no-op.
    pub fn record(conn: &Connection, id: &str, filename: &str, size_bytes: u64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO assets (id, filename, size_bytes) VALUES (?1, ?2, ?3)",
            params![id, filename, size_bytes as i64],
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<Asset>> {
        conn.query_row(
            "SELECT id, filename, size_bytes, created_at FROM assets WHERE id = ?1",
            params![id],
            |row| {
                Ok(Asset {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    size_bytes: row.get::<_, i64>(2)? as u64,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::models::NewImage;
    use crate::streaks::Calendar;
    use crate::streaks::engine::calculate_streaks;
    use crate::sources::EntrySource;
    use chrono::{NaiveDate, TimeZone};

    fn new_entry(user: &str, content: &str) -> NewEntry {
        NewEntry {
            user_id: user.to_string(),
            title: None,
            content: content.to_string(),
            mood: Mood::Happy,
            category_id: None,
            images: Vec::new(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn journal_err(err: &anyhow::Error) -> &JournalError {
        err.downcast_ref::<JournalError>().expect("domain error")
    }

    #[test]
    fn create_and_fetch_round_trip() {
        let conn = open_in_memory().unwrap();
        let mut input = new_entry("ana", "Walked by the river.");
        input.title = Some("  Sunday  ".to_string());
        input.category_id = Some("category-gratitude".to_string());

        let created = EntryRepo::create_at(&conn, &input, at(2024, 1, 3, 9)).unwrap();
        assert_eq!(created.title.as_deref(), Some("Sunday"));
        assert_eq!(created.created_at, "2024-01-03T09:00:00.000Z");
        assert_eq!(created.category.as_ref().unwrap().title, "Gratitude");

        let fetched = EntryRepo::get_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched.content, "Walked by the river.");
        assert_eq!(fetched.mood, Mood::Happy);
    }

    #[test]
    fn entries_come_back_newest_first_per_user() {
        let conn = open_in_memory().unwrap();
        EntryRepo::create_at(&conn, &new_entry("ana", "first"), at(2024, 1, 1, 8)).unwrap();
        EntryRepo::create_at(&conn, &new_entry("ana", "third"), at(2024, 1, 3, 8)).unwrap();
        EntryRepo::create_at(&conn, &new_entry("ana", "second"), at(2024, 1, 2, 8)).unwrap();
        EntryRepo::create_at(&conn, &new_entry("bo", "other"), at(2024, 1, 2, 8)).unwrap();

        let entries = conn.fetch_entries_for_user("ana").unwrap();
        let contents: Vec<_> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
        assert_eq!(EntryRepo::count_for_user(&conn, "bo").unwrap(), 1);

        let cal = Calendar::new(Utc, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(calculate_streaks(&entries, &cal).current_streak, 3);
    }

    #[test]
    fn empty_content_is_rejected() {
        let conn = open_in_memory().unwrap();
        let err = EntryRepo::create(&conn, &new_entry("ana", "   ")).unwrap_err();
        assert!(matches!(journal_err(&err), JournalError::EmptyContent));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let conn = open_in_memory().unwrap();
        let mut input = new_entry("ana", "hello");
        input.category_id = Some("category-nope".to_string());
        let err = EntryRepo::create(&conn, &input).unwrap_err();
        assert!(matches!(journal_err(&err), JournalError::CategoryNotFound(_)));
    }

    #[test]
    fn images_keep_their_order_and_defaults() {
        let conn = open_in_memory().unwrap();
        AssetRepo::record(&conn, "image-aa-jpg", "a.jpg", 10).unwrap();
        AssetRepo::record(&conn, "image-bb-png", "b.png", 20).unwrap();

        let mut input = new_entry("ana", "photos");
        input.images = vec![
            NewImage {
                asset_id: "image-bb-png".to_string(),
                caption: Some("lake".to_string()),
                alt: None,
            },
            NewImage {
                asset_id: "image-aa-jpg".to_string(),
                caption: None,
                alt: Some("a dog".to_string()),
            },
        ];
        let entry = EntryRepo::create(&conn, &input).unwrap();

        assert_eq!(entry.images.len(), 2);
        assert_eq!(entry.images[0].asset_id, "image-bb-png");
        assert_eq!(entry.images[0].caption, "lake");
        assert_eq!(entry.images[0].alt, DEFAULT_IMAGE_ALT);
        assert_eq!(entry.images[1].caption, "");
        assert_eq!(entry.images[1].alt, "a dog");
    }

    #[test]
    fn update_patches_only_given_fields() {
        let conn = open_in_memory().unwrap();
        let mut input = new_entry("ana", "draft");
        input.title = Some("Title".to_string());
        input.category_id = Some("category-growth".to_string());
        let entry = EntryRepo::create(&conn, &input).unwrap();

        let patch = EntryPatch {
            content: Some("final".to_string()),
            mood: Some(Mood::VeryHappy),
            ..Default::default()
        };
        let updated = EntryRepo::update(&conn, &entry.id, &patch).unwrap();
        assert_eq!(updated.content, "final");
        assert_eq!(updated.mood, Mood::VeryHappy);
        assert_eq!(updated.title.as_deref(), Some("Title"));
        assert_eq!(updated.category.unwrap().id, "category-growth");
        assert_eq!(updated.created_at, entry.created_at);

        let cleared = EntryRepo::update(
            &conn,
            &entry.id,
            &EntryPatch {
                title: Some(None),
                category_id: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(cleared.title.is_none());
        assert!(cleared.category.is_none());
    }

    #[test]
    fn delete_cascades_and_reports_missing() {
        let conn = open_in_memory().unwrap();
        AssetRepo::record(&conn, "image-cc-jpg", "c.jpg", 5).unwrap();
        let mut input = new_entry("ana", "bye");
        input.images = vec![NewImage {
            asset_id: "image-cc-jpg".to_string(),
            caption: None,
            alt: None,
        }];
        let entry = EntryRepo::create(&conn, &input).unwrap();

        EntryRepo::delete(&conn, &entry.id).unwrap();
        assert!(EntryRepo::get_by_id(&conn, &entry.id).unwrap().is_none());
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM entry_images", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);

        let err = EntryRepo::delete(&conn, &entry.id).unwrap_err();
        assert!(matches!(journal_err(&err), JournalError::EntryNotFound(_)));
    }

    #[test]
    fn categories_crud() {
        let conn = open_in_memory().unwrap();
        let created = CategoryRepo::create(&conn, "Dreams", Some("#8b5cf6")).unwrap();
        assert_eq!(CategoryRepo::resolve(&conn, "dreams").unwrap().id, created.id);

        let titles: Vec<_> = CategoryRepo::list(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);

        let updated = CategoryRepo::update(
            &conn,
            &created.id,
            &CategoryPatch {
                title: Some("Night Dreams".to_string()),
                color: Some(None),
            },
        )
        .unwrap();
        assert_eq!(updated.title, "Night Dreams");
        assert!(updated.color.is_none());

        CategoryRepo::delete(&conn, &created.id).unwrap();
        assert!(CategoryRepo::get_by_id(&conn, &created.id).unwrap().is_none());
    }

    #[test]
    fn deleting_a_category_detaches_entries() {
        let conn = open_in_memory().unwrap();
        let category = CategoryRepo::create(&conn, "Temp", None).unwrap();
        let mut input = new_entry("ana", "tagged");
        input.category_id = Some(category.id.clone());
        let entry = EntryRepo::create(&conn, &input).unwrap();

        CategoryRepo::delete(&conn, &category.id).unwrap();
        let entry = EntryRepo::get_by_id(&conn, &entry.id).unwrap().unwrap();
        assert!(entry.category.is_none());
    }

    #[test]
    fn seeded_prompts_are_active_and_heaviest_first() {
        let conn = open_in_memory().unwrap();
        let prompts = PromptRepo::get_active(&conn).unwrap();
        assert!(prompts.len() >= 8);
        assert_eq!(prompts[0].id, "prompt-three-good-things");
        let weights: Vec<f64> = prompts.iter().map(|p| p.weight.unwrap_or(1.0)).collect();
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
        assert!(prompts[0].tags.contains(&"gratitude".to_string()));
        assert_eq!(prompts[0].category.as_ref().unwrap().title, "Gratitude");
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = open_in_memory().unwrap();
        crate::db::migrations::run_migrations(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_prompts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn prompts_by_tag_and_toggle() {
        let conn = open_in_memory().unwrap();
        let morning = PromptRepo::get_by_tag(&conn, "morning").unwrap();
        assert_eq!(morning.len(), 2);

        PromptRepo::set_active(&conn, "prompt-energy", false).unwrap();
        let morning = PromptRepo::get_by_tag(&conn, "morning").unwrap();
        assert_eq!(morning.len(), 1);
        assert!(
            !PromptRepo::get_by_id(&conn, "prompt-energy")
                .unwrap()
                .unwrap()
                .is_active
        );
        assert_eq!(
            PromptRepo::get_all(&conn).unwrap().len(),
            PromptRepo::get_active(&conn).unwrap().len() + 1
        );
    }

    #[test]
    fn prompt_weight_is_validated() {
        let conn = open_in_memory().unwrap();
        let input = NewPrompt {
            title: "Bad".to_string(),
            prompt: "weight".to_string(),
            weight: Some(-1.0),
            ..Default::default()
        };
        let err = PromptRepo::create(&conn, &input).unwrap_err();
        assert!(matches!(journal_err(&err), JournalError::InvalidWeight(_)));

        let input = NewPrompt {
            title: "Weekend".to_string(),
            prompt: "What would make this weekend restful?".to_string(),
            weight: None,
            tags: vec!["weekend".to_string()],
            suggested_mood: Some(Mood::Happy),
            ..Default::default()
        };
        let created = PromptRepo::create(&conn, &input).unwrap();
        assert!(created.is_active);
        assert_eq!(created.weight, None);
        assert_eq!(created.suggested_mood, Some(Mood::Happy));
        assert_eq!(PromptRepo::get_by_tag(&conn, "weekend").unwrap().len(), 1);
    }

    #[test]
    fn meta_round_trip() {
        let conn = open_in_memory().unwrap();
        assert_eq!(MetaRepo::get(&conn, "setup_done").unwrap(), None);
        MetaRepo::set(&conn, "setup_done", "1").unwrap();
        MetaRepo::set(&conn, "setup_done", "2").unwrap();
        assert_eq!(MetaRepo::get(&conn, "setup_done").unwrap().as_deref(), Some("2"));
    }
}
