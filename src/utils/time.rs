// ABOUTME: Canonical UTC day and week boundary helpers plus an injectable clock
// ABOUTME: Every computation that needs "today" goes through Clock so tests can pin it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! UTC time utilities
//!
//! "Day" means a UTC calendar day everywhere in this codebase; there is no
//! per-user timezone support. Aggregation, streak and quota logic all share
//! the same definition of "today" through [`Clock`], which is the single
//! mockable source of current time.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

/// Source of current time, injectable for tests.
///
/// Handlers hold a `Clock` from `ServerResources` and call [`Clock::today`]
/// once per request, so all derived day math within a request agrees on the
/// same anchor.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Real system clock
    System,
    /// Fixed instant, used by tests to pin day boundaries
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Current instant in UTC
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// Current UTC calendar day
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// UTC midnight at the start of `day`
#[must_use]
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Half-open timestamp bounds `[start, end)` covering the inclusive date
/// range `[start_day, end_day]`
#[must_use]
pub fn range_bounds(start_day: NaiveDate, end_day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        day_start(start_day),
        day_start(end_day.checked_add_days(Days::new(1)).unwrap_or(end_day)),
    )
}

/// The Monday that begins the ISO week containing `day`.
///
/// Computed by normalizing to UTC midnight and subtracting
/// `(weekday + 6) % 7` days, where weekday 0 is Sunday. A Monday maps to
/// itself; a Sunday maps to the preceding Monday.
#[must_use]
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let back = (day.weekday().num_days_from_sunday() + 6) % 7;
    day.checked_sub_days(Days::new(u64::from(back))).unwrap_or(day)
}

/// All days of the inclusive range `[start, end]` in chronological order.
/// Empty when `start > end`.
#[must_use]
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        days.push(cursor);
        let Some(next) = cursor.checked_add_days(Days::new(1)) else {
            break;
        };
        cursor = next;
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_week_start_is_identity_on_monday() {
        assert_eq!(week_start(d("2026-08-03")), d("2026-08-03"));
    }

    #[test]
    fn test_week_start_from_each_weekday() {
        // 2026-08-03 is a Monday
        for (day, monday) in [
            ("2026-08-04", "2026-08-03"), // Tuesday
            ("2026-08-08", "2026-08-03"), // Saturday
            ("2026-08-09", "2026-08-03"), // Sunday maps back, not forward
            ("2026-08-10", "2026-08-10"), // next Monday
        ] {
            assert_eq!(week_start(d(day)), d(monday));
        }
    }

    #[test]
    fn test_days_in_range_inclusive() {
        let days = days_in_range(d("2026-01-30"), d("2026-02-02"));
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], d("2026-01-30"));
        assert_eq!(days[3], d("2026-02-02"));
    }

    #[test]
    fn test_days_in_range_empty_when_reversed() {
        assert!(days_in_range(d("2026-02-02"), d("2026-02-01")).is_empty());
    }

    #[test]
    fn test_fixed_clock_pins_today() {
        let clock = Clock::Fixed("2026-08-04T23:59:59Z".parse().unwrap());
        assert_eq!(clock.today(), d("2026-08-04"));
    }
}
