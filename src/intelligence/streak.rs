// ABOUTME: Consecutive-active-day streak computation from workout and scan day signals
// ABOUTME: Walks backward from today; a day is active when either signal is present
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Streak computation.
//!
//! A day is active when the user has a workout session on it **or** at least
//! one meal scan whose timestamp falls on it. Either signal counts; that OR
//! is a product rule, not a shortcut.
//!
//! The walk starts at today and moves strictly backward. An inactive today
//! means streak zero even when yesterday was active; the walk never skips
//! a day.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One day of the trailing-week trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub did: bool,
}

/// Streak result for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakReport {
    /// Consecutive active days ending at today; 0 when today is inactive
    pub streak: u32,
    /// The trailing 7 calendar days including today, chronological order.
    /// Always the fixed window; not truncated where the streak broke.
    pub last7: Vec<DayActivity>,
    /// Workout-only signal for today, driving the "mark workout done"
    /// affordance separately from the combined streak signal
    #[serde(rename = "hasWorkoutToday")]
    pub has_workout_today: bool,
}

fn is_active(
    day: NaiveDate,
    workout_days: &HashSet<NaiveDate>,
    scan_days: &HashSet<NaiveDate>,
) -> bool {
    workout_days.contains(&day) || scan_days.contains(&day)
}

/// Compute the streak report anchored at `today`.
///
/// `workout_days` and `scan_days` are the sets of active days fetched for
/// the trailing lookback window; a brand-new user passes two empty sets and
/// gets a zero streak, not an error.
#[must_use]
pub fn compute_streak(
    today: NaiveDate,
    workout_days: &HashSet<NaiveDate>,
    scan_days: &HashSet<NaiveDate>,
) -> StreakReport {
    let mut streak = 0u32;
    let mut cursor = today;
    while is_active(cursor, workout_days, scan_days) {
        streak += 1;
        let Some(previous) = cursor.checked_sub_days(Days::new(1)) else {
            break;
        };
        cursor = previous;
    }

    let last7 = (0u64..7)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DayActivity {
            date,
            did: is_active(date, workout_days, scan_days),
        })
        .collect();

    StreakReport {
        streak,
        last7,
        has_workout_today: workout_days.contains(&today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn days(values: &[&str]) -> HashSet<NaiveDate> {
        values.iter().map(|s| d(s)).collect()
    }

    #[test]
    fn test_streak_counts_consecutive_days_back_from_today() {
        let report = compute_streak(
            d("2026-08-04"),
            &days(&["2026-08-04", "2026-08-03", "2026-08-02"]),
            &HashSet::new(),
        );
        assert_eq!(report.streak, 3);
    }

    #[test]
    fn test_inactive_today_means_zero_regardless_of_yesterday() {
        let report = compute_streak(d("2026-08-04"), &days(&["2026-08-03"]), &HashSet::new());
        assert_eq!(report.streak, 0);
        // yesterday still shows in the trail
        assert!(report.last7[5].did);
    }

    #[test]
    fn test_scan_or_workout_both_count() {
        let report = compute_streak(
            d("2026-08-04"),
            &days(&["2026-08-03"]),
            &days(&["2026-08-04"]),
        );
        assert_eq!(report.streak, 2);
        assert!(!report.has_workout_today, "scan day is not a workout day");
    }

    #[test]
    fn test_last7_is_fixed_window_in_chronological_order() {
        let report = compute_streak(d("2026-08-04"), &days(&["2026-08-04"]), &HashSet::new());
        assert_eq!(report.last7.len(), 7);
        assert_eq!(report.last7[0].date, d("2026-07-29"));
        assert_eq!(report.last7[6].date, d("2026-08-04"));
        assert!(report.last7[6].did);
        assert!(report.last7[..6].iter().all(|day| !day.did));
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let report = compute_streak(d("2026-08-04"), &HashSet::new(), &HashSet::new());
        assert_eq!(report.streak, 0);
        assert!(!report.has_workout_today);
        assert!(report.last7.iter().all(|day| !day.did));
    }

    #[test]
    fn test_gap_inside_window_stops_walk_but_not_trail() {
        let report = compute_streak(
            d("2026-08-04"),
            &days(&["2026-08-04", "2026-08-03", "2026-08-01", "2026-07-31"]),
            &HashSet::new(),
        );
        assert_eq!(report.streak, 2);
        let trail: Vec<bool> = report.last7.iter().map(|day| day.did).collect();
        assert_eq!(trail, vec![false, false, true, true, false, true, true]);
    }
}
