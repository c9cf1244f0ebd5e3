pub mod category;
pub mod entry;
pub mod mood;
pub mod prompt;

pub use category::{Category, CategoryPatch};
pub use entry::{CategoryRef, EntryImage, EntryPatch, JournalEntry, NewEntry, NewImage};
pub use mood::Mood;
pub use prompt::{DailyPrompt, NewPrompt};
