use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Reference clock for date math: the zone instants are viewed in, and the
/// day treated as "today".
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    today: NaiveDate,
}

impl Calendar<Local> {
    /// The user's local zone with today's real date.
    pub fn local() -> Self {
        Self::at(Local, Utc::now())
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz, today: NaiveDate) -> Self {
        Self { tz, today }
    }

    /// Today is whatever date `instant` falls on in `tz`.
    pub fn at(tz: Tz, instant: DateTime<Utc>) -> Self {
        let today = instant.with_timezone(&tz).date_naive();
        Self::new(tz, today)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn yesterday(&self) -> NaiveDate {
        self.today.pred_opt().unwrap_or(self.today)
    }

    /// Today or yesterday: the one-day grace a streak gets before it breaks.
    pub fn is_recent(&self, date: NaiveDate) -> bool {
        date == self.today || date == self.yesterday()
    }

    /// Calendar date of a stored timestamp in this zone, or `None` if it
    /// can't be read. A bare `YYYY-MM-DD` is taken as the date itself.
    pub fn local_date(&self, raw: &str) -> Option<NaiveDate> {
        match parse_instant(raw) {
            Some(instant) => Some(instant.with_timezone(&self.tz).date_naive()),
            None => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok(),
        }
    }

    /// Sunday-to-Saturday week containing today. `entry_dates` must be sorted.
    pub fn week_strip(&self, entry_dates: &[NaiveDate]) -> [WeekDay; 7] {
        let offset = self.today.weekday().num_days_from_sunday() as i64;
        let start = self.today - chrono::Duration::days(offset);
        std::array::from_fn(|i| {
            let date = start + chrono::Duration::days(i as i64);
            WeekDay {
                date,
                is_today: date == self.today,
                has_entry: entry_dates.binary_search(&date).is_ok(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub has_entry: bool,
}

/// Parse an ISO-8601 instant. Offset-less forms (what SQLite's
/// `datetime('now')` writes) are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn local_date_follows_the_zone() {
        // 23:30 UTC on the 3rd is already the 4th two hours east
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let cal = Calendar::new(east, date("2024-01-04"));
        assert_eq!(
            cal.local_date("2024-01-03T23:30:00.000Z"),
            Some(date("2024-01-04"))
        );

        let utc = Calendar::new(Utc, date("2024-01-04"));
        assert_eq!(
            utc.local_date("2024-01-03T23:30:00.000Z"),
            Some(date("2024-01-03"))
        );
    }

    #[test]
    fn local_date_accepts_sqlite_and_bare_dates() {
        let cal = Calendar::new(Utc, date("2024-01-04"));
        assert_eq!(cal.local_date("2024-01-02 08:00:00"), Some(date("2024-01-02")));
        assert_eq!(cal.local_date("2024-01-02T08:00:00.250"), Some(date("2024-01-02")));
        assert_eq!(cal.local_date("2024-01-02"), Some(date("2024-01-02")));
        assert_eq!(cal.local_date("yesterday-ish"), None);
        assert_eq!(cal.local_date(""), None);
    }

    #[test]
    fn at_derives_today_from_instant() {
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let instant = parse_instant("2024-03-01T02:00:00Z").unwrap();
        let cal = Calendar::at(west, instant);
        assert_eq!(cal.today(), date("2024-02-29"));
        assert_eq!(cal.yesterday(), date("2024-02-28"));
    }

    #[test]
    fn local_calendar_is_today() {
        let cal = Calendar::local();
        let today = chrono::Local::now().date_naive();
        // Tolerate a midnight rollover between the two reads
        assert!(cal.today() == today || cal.today().succ_opt() == Some(today));
    }

    #[test]
    fn week_strip_starts_on_sunday() {
        // 2024-01-03 is a Wednesday
        let cal = Calendar::new(Utc, date("2024-01-03"));
        let strip = cal.week_strip(&[date("2024-01-01"), date("2024-01-03")]);

        assert_eq!(strip[0].date, date("2023-12-31"));
        assert_eq!(strip[6].date, date("2024-01-06"));
        assert!(strip[3].is_today);
        assert_eq!(strip.iter().filter(|d| d.is_today).count(), 1);
        assert!(strip[1].has_entry);
        assert!(strip[3].has_entry);
        assert!(!strip[2].has_entry);
    }
}
