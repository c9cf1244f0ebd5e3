use serde::Serialize;

use super::engine::StreakResult;
use crate::utils::format::plural_days;

pub const DEFAULT_MILESTONES: [u32; 4] = [7, 30, 100, 365];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextMilestone {
    /// Days left to reach `milestone`; 0 once every milestone is behind
    pub days_until: u32,
    pub milestone: u32,
}

/// Smallest milestone strictly above `current` and the gap to it.
/// `milestones` must be ascending (see [`normalize_milestones`]).
pub fn days_until_next_milestone(current: u32, milestones: &[u32]) -> NextMilestone {
    match milestones.iter().copied().find(|&m| m > current) {
        Some(milestone) => NextMilestone {
            days_until: milestone - current,
            milestone,
        },
        None => NextMilestone {
            days_until: 0,
            milestone: milestones.last().copied().unwrap_or(0),
        },
    }
}

/// Sorted, de-duplicated, zero-free milestones; empty input gets the defaults.
pub fn normalize_milestones(raw: &[u32]) -> Vec<u32> {
    let mut out: Vec<u32> = raw.iter().copied().filter(|&m| m > 0).collect();
    out.sort_unstable();
    out.dedup();
    if out.is_empty() {
        out = DEFAULT_MILESTONES.to_vec();
    }
    out
}

/// Encouragement line for the streak card. Tone escalates with the current
/// streak; when there is none, the best run is mentioned if one exists.
pub fn status_message(result: &StreakResult) -> String {
    let n = result.current_streak;
    match n {
        0 if result.longest_streak > 0 => format!(
            "Your best run was {}. Write today to start a new streak!",
            plural_days(result.longest_streak)
        ),
        0 => "Start your streak today! Write your first entry.".to_string(),
        1 => "Great start! Come back tomorrow to keep it going.".to_string(),
        2..=6 => format!("You're building momentum: {} in a row!", plural_days(n)),
        7..=29 => format!("You're on fire! {} strong 🔥", plural_days(n)),
        30..=99 => format!("Incredible dedication! {} of journaling 💪", plural_days(n)),
        100..=364 => format!("Legendary! {} of reflection 🏆", plural_days(n)),
        _ => format!("A year and beyond: {}. Unstoppable! 🌟", plural_days(n)),
    }
}
