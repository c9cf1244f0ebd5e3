pub mod entries;
pub mod header;
pub mod prompts;
pub mod statusbar;
pub mod streak;
