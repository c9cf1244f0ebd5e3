//! Writing streaks: which days have entries, how long the current and best
//! runs are, and what to tell the user about them.
//!
//! Everything here is pure. "Today" and the time zone come in through
//! [`Calendar`], so callers decide what clock to use.

pub mod calendar;
pub mod engine;
pub mod milestone;
pub mod summary;

pub use calendar::{Calendar, WeekDay, parse_instant};
pub use engine::Dated;
pub use milestone::{DEFAULT_MILESTONES, normalize_milestones};
pub use summary::StreakSummary;
