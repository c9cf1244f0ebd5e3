use anyhow::{Context, Result};
use chrono::TimeZone;
use serde::Serialize;

use super::calendar::Calendar;
use super::engine::{Dated, StreakResult, calculate_streaks, is_streak_active};
use super::milestone::{days_until_next_milestone, status_message};
use crate::sources::{EntrySource, Identity};

/// Everything the streak card shows, derived fresh on every load.
#[derive(Debug, Clone, Serialize)]
pub struct StreakSummary {
    #[serde(flatten)]
    pub result: StreakResult,
    pub is_active: bool,
    pub status_message: String,
    pub days_until_next_milestone: u32,
    pub next_milestone: u32,
}

impl StreakSummary {
    pub fn from_entries<E, Tz>(entries: &[E], calendar: &Calendar<Tz>, milestones: &[u32]) -> Self
    where
        E: Dated,
        Tz: TimeZone,
    {
        let result = calculate_streaks(entries, calendar);
        let next = days_until_next_milestone(result.current_streak, milestones);
        Self {
            is_active: is_streak_active(entries, calendar),
            status_message: status_message(&result),
            days_until_next_milestone: next.days_until,
            next_milestone: next.milestone,
            result,
        }
    }

    /// Fetch the signed-in user's entries and summarise them. `Ok(None)` when
    /// nobody is signed in; a failing source is an error and nothing is computed.
    pub fn load<S, I, Tz>(
        source: &S,
        identity: &I,
        calendar: &Calendar<Tz>,
        milestones: &[u32],
    ) -> Result<Option<Self>>
    where
        S: EntrySource + ?Sized,
        I: Identity + ?Sized,
        Tz: TimeZone,
    {
        let Some(user_id) = identity.current_user_id() else {
            return Ok(None);
        };
        let entries = source
            .fetch_entries_for_user(user_id)
            .with_context(|| format!("Loading streaks for '{}'", user_id))?;
        Ok(Some(Self::from_entries(&entries, calendar, milestones)))
    }
}
