use serde::{Deserialize, Serialize};

use crate::models::Mood;
use crate::streaks::Dated;

pub const DEFAULT_IMAGE_ALT: &str = "Journal entry image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub title: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryImage {
    pub asset_id: String,
    pub caption: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
    pub category: Option<CategoryRef>,
    pub images: Vec<EntryImage>,
    /// RFC 3339, UTC, set once at creation
    pub created_at: String,
}

impl JournalEntry {
    /// Title for list rows: the explicit title, else the first line of content.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => self.content.lines().next().unwrap_or("").trim(),
        }
    }
}

impl Dated for JournalEntry {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// An image that has already been uploaded and is ready to attach.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub asset_id: String,
    pub caption: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: String,
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
    pub category_id: Option<String>,
    pub images: Vec<NewImage>,
}

/// Partial update. `None` leaves a field untouched; the title and category use
/// a nested option so they can be cleared.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub mood: Option<Mood>,
    pub category_id: Option<Option<String>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.mood.is_none()
            && self.category_id.is_none()
    }
}
