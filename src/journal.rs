//! Views over a user's entries for browsing.

use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;

use crate::streaks::{Calendar, Dated};

/// Entries written on one local day. `date` is `None` for entries whose
/// timestamp could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<T> {
    pub date: Option<NaiveDate>,
    pub entries: Vec<T>,
}

impl<T> DayGroup<T> {
    pub fn label(&self) -> String {
        match self.date {
            Some(date) => date.format("%A, %B %-d, %Y").to_string(),
            None => "Undated".to_string(),
        }
    }
}

/// Newest day first; entries keep their input order within a day. Undated
/// entries come last.
pub fn group_by_date<'a, T, Tz>(entries: &'a [T], calendar: &Calendar<Tz>) -> Vec<DayGroup<&'a T>>
where
    T: Dated,
    Tz: TimeZone,
{
    let mut days: BTreeMap<NaiveDate, Vec<&'a T>> = BTreeMap::new();
    let mut undated: Vec<&'a T> = Vec::new();
    for entry in entries {
        match calendar.local_date(entry.created_at()) {
            Some(date) => days.entry(date).or_default().push(entry),
            None => undated.push(entry),
        }
    }

    let mut groups: Vec<DayGroup<&'a T>> = days
        .into_iter()
        .rev()
        .map(|(date, entries)| DayGroup {
            date: Some(date),
            entries,
        })
        .collect();
    if !undated.is_empty() {
        groups.push(DayGroup {
            date: None,
            entries: undated,
        });
    }
    groups
}
