use thiserror::Error;

/// Domain failures that callers branch on. Everything else travels as
/// `anyhow::Error` with context attached at the I/O boundary.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal entry '{0}' not found")]
    EntryNotFound(String),

    #[error("daily prompt '{0}' not found")]
    PromptNotFound(String),

    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    #[error("entry content cannot be empty")]
    EmptyContent,

    #[error("prompt weight must be a finite number >= 0, got {0}")]
    InvalidWeight(f64),

    #[error("unknown mood '{0}'. Use: very-sad, sad, neutral, happy, very-happy")]
    UnknownMood(String),

    #[error("unsupported image '{0}' (expected jpg, jpeg, png, gif, webp or heic)")]
    UnsupportedImage(String),
}
