use chrono::{NaiveDate, TimeZone};
use log::debug;
use serde::Serialize;

use super::calendar::Calendar;

/// Anything carrying a creation timestamp.
pub trait Dated {
    fn created_at(&self) -> &str;
}

impl Dated for str {
    fn created_at(&self) -> &str {
        self
    }
}

impl Dated for String {
    fn created_at(&self) -> &str {
        self
    }
}

impl<T: Dated + ?Sized> Dated for &T {
    fn created_at(&self) -> &str {
        (**self).created_at()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_entry_date: Option<NaiveDate>,
    /// Every day with at least one entry, ascending
    pub streak_dates: Vec<NaiveDate>,
}

/// Distinct local dates of `entries`, ascending. Entries whose timestamp
/// can't be read are skipped.
pub fn streak_dates<E, Tz>(entries: &[E], calendar: &Calendar<Tz>) -> Vec<NaiveDate>
where
    E: Dated,
    Tz: TimeZone,
{
    let mut dates: Vec<NaiveDate> = entries
        .iter()
        .filter_map(|entry| {
            let raw = entry.created_at();
            let date = calendar.local_date(raw);
            if date.is_none() {
                debug!("Skipping entry with unreadable timestamp {:?}", raw);
            }
            date
        })
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

pub fn calculate_streaks<E, Tz>(entries: &[E], calendar: &Calendar<Tz>) -> StreakResult
where
    E: Dated,
    Tz: TimeZone,
{
    let dates = streak_dates(entries, calendar);
    let Some(&last) = dates.last() else {
        return StreakResult::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in &dates {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    // Walk back from the newest day while the days stay adjacent
    let current = if calendar.is_recent(last) {
        let adjacent = dates
            .windows(2)
            .rev()
            .take_while(|pair| pair[0].succ_opt() == Some(pair[1]))
            .count();
        adjacent as u32 + 1
    } else {
        0
    };

    StreakResult {
        current_streak: current,
        longest_streak: longest,
        last_entry_date: Some(last),
        streak_dates: dates,
    }
}

/// True when some entry landed today or yesterday.
pub fn is_streak_active<E, Tz>(entries: &[E], calendar: &Calendar<Tz>) -> bool
where
    E: Dated,
    Tz: TimeZone,
{
    entries
        .iter()
        .filter_map(|entry| calendar.local_date(entry.created_at()))
        .any(|date| calendar.is_recent(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn on(today: &str) -> Calendar<Utc> {
        Calendar::new(Utc, date(today))
    }

    #[test]
    fn empty_history_is_all_zero() {
        let entries: Vec<String> = Vec::new();
        let result = calculate_streaks(&entries, &on("2024-01-03"));
        assert_eq!(result, StreakResult::default());
        assert!(!is_streak_active(&entries, &on("2024-01-03")));
    }

    #[test]
    fn three_days_ending_today() {
        let entries = ["2024-01-01", "2024-01-02", "2024-01-03"];
        let result = calculate_streaks(&entries, &on("2024-01-03"));
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
        assert_eq!(result.last_entry_date, Some(date("2024-01-03")));
    }

    #[test]
    fn gap_breaks_both_runs() {
        let entries = ["2024-01-01", "2024-01-05"];
        let result = calculate_streaks(&entries, &on("2024-01-06"));
        assert_eq!(result.longest_streak, 1);
        assert_eq!(result.current_streak, 1, "yesterday still counts");

        let result = calculate_streaks(&entries, &on("2024-01-07"));
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn future_newest_entry_is_not_current() {
        let entries = ["2024-01-02", "2024-01-03", "2024-01-09"];
        let result = calculate_streaks(&entries, &on("2024-01-03"));
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let entries = ["2024-01-01", "2024-01-02"];
        let cal = on("2024-01-03");
        assert_eq!(calculate_streaks(&entries, &cal).current_streak, 2);
        assert!(is_streak_active(&entries, &cal));
    }

    #[test]
    fn same_day_entries_collapse() {
        let entries = [
            "2024-01-02T08:00:00.000Z",
            "2024-01-02T21:15:00.000Z",
            "2024-01-01T12:00:00.000Z",
            "2024-01-02T23:59:59.999Z",
        ];
        let result = calculate_streaks(&entries, &on("2024-01-02"));
        assert_eq!(result.streak_dates, vec![date("2024-01-01"), date("2024-01-02")]);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn unordered_input_and_bad_timestamps() {
        let entries = [
            "2024-01-03T10:00:00Z",
            "not a date",
            "2024-01-01T10:00:00Z",
            "",
            "2024-01-02T10:00:00Z",
        ];
        let result = calculate_streaks(&entries, &on("2024-01-03"));
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.streak_dates.len(), 3);
    }

    #[test]
    fn longest_run_in_the_past() {
        let entries = [
            "2023-12-01",
            "2023-12-02",
            "2023-12-03",
            "2023-12-04",
            "2023-12-20",
            "2024-01-02",
            "2024-01-03",
        ];
        let result = calculate_streaks(&entries, &on("2024-01-03"));
        assert_eq!(result.longest_streak, 4);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn stale_history_is_inactive() {
        let entries = ["2024-01-01"];
        assert!(!is_streak_active(&entries, &on("2024-01-03")));
    }

    #[test]
    fn works_on_owned_strings() {
        let entries = vec!["2024-02-28".to_string(), "2024-02-29".to_string()];
        let result = calculate_streaks(&entries, &on("2024-03-01"));
        assert_eq!(result.current_streak, 2);
    }

    fn day(offset: u16) -> NaiveDate {
        date("2023-01-01") + chrono::Duration::days(offset as i64)
    }

    proptest! {
        #[test]
        fn longest_never_below_current(
            offsets in proptest::collection::vec(0u16..120, 0..60),
            today in 0u16..130,
        ) {
            let entries: Vec<String> = offsets.iter().map(|&o| day(o).to_string()).collect();
            let cal = Calendar::new(Utc, day(today));
            let result = calculate_streaks(&entries, &cal);

            prop_assert!(result.longest_streak >= result.current_streak);
            prop_assert_eq!(result.longest_streak == 0, entries.is_empty());
            prop_assert_eq!(result.clone(), calculate_streaks(&entries, &cal));
        }

        #[test]
        fn consecutive_days_ending_today(n in 1u16..200) {
            let entries: Vec<String> = (0..n).map(|o| day(o).to_string()).collect();
            let cal = Calendar::new(Utc, day(n - 1));
            let result = calculate_streaks(&entries, &cal);
            prop_assert_eq!(result.current_streak, n as u32);
            prop_assert_eq!(result.longest_streak, n as u32);
        }

        #[test]
        fn two_day_gap_resets_current(n in 1u16..50, gap in 2u16..30) {
            let entries: Vec<String> = (0..n).map(|o| day(o).to_string()).collect();
            let cal = Calendar::new(Utc, day(n - 1 + gap));
            prop_assert_eq!(calculate_streaks(&entries, &cal).current_streak, 0);
        }
    }
}
