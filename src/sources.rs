//! Narrow contracts for the collaborators the core reads from. The SQLite
//! store implements them here; tests swap in fixed data.

use anyhow::Result;
use rusqlite::Connection;

use crate::db::repository::{EntryRepo, PromptRepo};
use crate::models::{DailyPrompt, JournalEntry};

pub trait EntrySource {
    /// All entries belonging to `user_id`, newest first.
    fn fetch_entries_for_user(&self, user_id: &str) -> Result<Vec<JournalEntry>>;
}

pub trait PromptSource {
    /// Active prompts, heaviest first.
    fn fetch_active_prompts(&self) -> Result<Vec<DailyPrompt>>;
}

/// Who is writing. Profile fields are optional display hints.
pub trait Identity {
    fn current_user_id(&self) -> Option<&str>;

    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// Name for greetings: display name, then user id, then "there".
pub fn greeting_name<I: Identity + ?Sized>(identity: &I) -> &str {
    identity
        .display_name()
        .or_else(|| identity.current_user_id())
        .unwrap_or("there")
}

impl EntrySource for Connection {
    fn fetch_entries_for_user(&self, user_id: &str) -> Result<Vec<JournalEntry>> {
        EntryRepo::get_for_user(self, user_id)
    }
}

impl PromptSource for Connection {
    fn fetch_active_prompts(&self) -> Result<Vec<DailyPrompt>> {
        PromptRepo::get_active(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Profile {
        id: Option<&'static str>,
        name: Option<&'static str>,
    }

    impl Identity for Profile {
        fn current_user_id(&self) -> Option<&str> {
            self.id
        }

        fn display_name(&self) -> Option<&str> {
            self.name
        }
    }

    #[test]
    fn greeting_name_falls_back() {
        let full = Profile { id: Some("u1"), name: Some("Ana") };
        let id_only = Profile { id: Some("u1"), name: None };
        let nobody = Profile { id: None, name: None };

        assert_eq!(greeting_name(&full), "Ana");
        assert_eq!(greeting_name(&id_only), "u1");
        assert_eq!(greeting_name(&nobody), "there");
    }
}
