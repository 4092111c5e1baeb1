// ABOUTME: Day-bucketed activity aggregation over sessions, sets and meal scans
// ABOUTME: Resolves a set's day through its session item and session, never its own timestamp
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Ranged and today-only activity summaries.
//!
//! A set carries no day of its own; its day is the day of the session it
//! hangs under, resolved through two lookups (set → session item → session).
//! Those lookups are built as explicit maps here so the resolution chain is
//! testable on its own.
//!
//! Every day of a requested range appears in the output, zero-filled when
//! nothing happened. Callers rely on that for chart rendering; it is
//! asserted behavior, not a fallback.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::round1;
use crate::models::{ScanLog, SessionItem, WorkoutSession, WorkoutSet};
use crate::utils::time::days_in_range;

/// One day's aggregate activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Count of sessions on this day; 0 or 1 under the one-session-per-day
    /// rule but kept a count for forward compatibility
    pub workouts: u32,
    pub sets: u32,
    /// Sum of `reps * weight_kg`, rounded to one decimal
    pub volume_kg: f64,
    pub scans: u32,
    /// Sum of scanned meal calories, rounded to the nearest integer
    pub calories: i64,
}

impl DailySummary {
    fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            workouts: 0,
            sets: 0,
            volume_kg: 0.0,
            scans: 0,
            calories: 0,
        }
    }
}

/// The lightweight today widget: counts for the active session only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayStats {
    /// Distinct session items
    pub exercises: u32,
    pub sets: u32,
    pub volume_kg: f64,
}

/// Map each session to its calendar day
#[must_use]
pub fn session_day_index(sessions: &[WorkoutSession]) -> HashMap<Uuid, NaiveDate> {
    sessions.iter().map(|s| (s.id, s.performed_on)).collect()
}

/// Map each session item to its owning session
#[must_use]
pub fn item_session_index(items: &[SessionItem]) -> HashMap<Uuid, Uuid> {
    items.iter().map(|i| (i.id, i.session_id)).collect()
}

/// Calories reported by a scan's macro payload.
///
/// Reads `macros.calories`; anything missing or non-numeric counts as zero
/// rather than failing the aggregate.
#[must_use]
pub fn scan_calories(macro_data: &Value) -> f64 {
    macro_data
        .pointer("/macros/calories")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Build one aggregate per day of the inclusive range `[start, end]`.
///
/// Days with no matching rows stay zero-filled. Rows pointing outside the
/// seeded range are ignored rather than inventing buckets.
#[must_use]
pub fn summarize_range(
    start: NaiveDate,
    end: NaiveDate,
    sessions: &[WorkoutSession],
    items: &[SessionItem],
    sets: &[WorkoutSet],
    scans: &[ScanLog],
) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, DailySummary> = days_in_range(start, end)
        .into_iter()
        .map(|day| (day, DailySummary::zero(day)))
        .collect();
    // Raw volume per day; rounded once at the end, not per set
    let mut volume: HashMap<NaiveDate, f64> = HashMap::new();
    let mut calories: HashMap<NaiveDate, f64> = HashMap::new();

    let session_days = session_day_index(sessions);
    let item_sessions = item_session_index(items);

    for session in sessions {
        if let Some(bucket) = buckets.get_mut(&session.performed_on) {
            bucket.workouts += 1;
        }
    }

    for set in sets {
        let day = item_sessions
            .get(&set.session_item_id)
            .and_then(|session_id| session_days.get(session_id));
        if let Some(bucket) = day.and_then(|d| buckets.get_mut(d)) {
            bucket.sets += 1;
            #[allow(clippy::cast_precision_loss)] // reps are small integers
            let set_volume = set.reps as f64 * set.weight_kg;
            *volume.entry(bucket.date).or_default() += set_volume;
        }
    }

    for scan in scans {
        let day = scan.created_at.date_naive();
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.scans += 1;
            *calories.entry(day).or_default() += scan_calories(&scan.macro_data);
        }
    }

    for (day, total) in volume {
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.volume_kg = round1(total);
        }
    }
    #[allow(clippy::cast_possible_truncation)] // calorie sums are far below i64 range
    for (day, total) in calories {
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.calories = total.round() as i64;
        }
    }

    buckets.into_values().collect()
}

/// Counts for the today widget over the active session's items and sets
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)] // counts and reps are small
pub fn summarize_today(items: &[SessionItem], sets: &[WorkoutSet]) -> TodayStats {
    let volume: f64 = sets.iter().map(|s| s.reps as f64 * s.weight_kg).sum();
    TodayStats {
        exercises: items.len() as u32,
        sets: sets.len() as u32,
        volume_kg: round1(volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn session_on(day: &str) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            performed_on: d(day),
            created_at: Utc::now(),
        }
    }

    fn item_in(session: &WorkoutSession) -> SessionItem {
        SessionItem {
            id: Uuid::new_v4(),
            session_id: session.id,
            workout_item_id: None,
            exercise_id: "bench".into(),
            variation_id: "flat".into(),
            created_at: Utc::now(),
        }
    }

    fn set_under(item: &SessionItem, reps: i64, weight_kg: f64) -> WorkoutSet {
        WorkoutSet {
            id: Uuid::new_v4(),
            session_item_id: item.id,
            set_index: 1,
            reps,
            weight_kg,
            rpe: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_range_is_fully_zero_filled() {
        let days = summarize_range(d("2026-03-01"), d("2026-03-07"), &[], &[], &[], &[]);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, d("2026-03-01"));
        assert_eq!(days[6].date, d("2026-03-07"));
        for day in days {
            assert_eq!(day, DailySummary::zero(day.date));
        }
    }

    #[test]
    fn test_volume_is_reps_times_weight_summed() {
        let session = session_on("2026-03-02");
        let item = item_in(&session);
        let sets = vec![set_under(&item, 10, 20.0), set_under(&item, 8, 25.0)];

        let days = summarize_range(
            d("2026-03-01"),
            d("2026-03-03"),
            std::slice::from_ref(&session),
            std::slice::from_ref(&item),
            &sets,
            &[],
        );
        assert_eq!(days[1].workouts, 1);
        assert_eq!(days[1].sets, 2);
        assert!((days[1].volume_kg - 400.0).abs() < f64::EPSILON);
        assert_eq!(days[0].sets, 0);
        assert_eq!(days[2].sets, 0);
    }

    #[test]
    fn test_set_day_follows_session_not_own_timestamp() {
        // Set logged "now" against a backdated session lands on the session's day
        let session = session_on("2026-03-01");
        let item = item_in(&session);
        let set = set_under(&item, 5, 100.0);

        let days = summarize_range(
            d("2026-03-01"),
            d("2026-03-02"),
            std::slice::from_ref(&session),
            std::slice::from_ref(&item),
            std::slice::from_ref(&set),
            &[],
        );
        assert_eq!(days[0].sets, 1);
        assert_eq!(days[1].sets, 0);
    }

    #[test]
    fn test_scan_calories_defaults_to_zero() {
        assert!((scan_calories(&serde_json::json!({"macros": {"calories": 412.4}})) - 412.4).abs() < f64::EPSILON);
        assert!(scan_calories(&serde_json::json!({"macros": {"calories": "n/a"}})) == 0.0);
        assert!(scan_calories(&serde_json::json!({"calories": 500})) == 0.0);
        assert!(scan_calories(&Value::Null) == 0.0);
    }

    #[test]
    fn test_scans_bucket_by_created_day_and_round_calories() {
        let user_id = Uuid::new_v4();
        let scan = |ts: &str, calories: f64| ScanLog {
            id: Uuid::new_v4(),
            user_id,
            macro_data: serde_json::json!({"macros": {"calories": calories}}),
            created_at: ts.parse().unwrap(),
        };
        let scans = vec![
            scan("2026-03-02T00:00:00Z", 300.4),
            scan("2026-03-02T23:59:59Z", 200.2),
        ];
        let days = summarize_range(d("2026-03-02"), d("2026-03-02"), &[], &[], &[], &scans);
        assert_eq!(days[0].scans, 2);
        assert_eq!(days[0].calories, 501); // 500.6 rounds up
    }

    #[test]
    fn test_today_stats_counts_distinct_items() {
        let session = session_on("2026-03-02");
        let items = vec![item_in(&session), item_in(&session)];
        let sets = vec![
            set_under(&items[0], 10, 60.0),
            set_under(&items[0], 10, 60.0),
            set_under(&items[1], 12, 20.5),
        ];
        let stats = summarize_today(&items, &sets);
        assert_eq!(stats.exercises, 2);
        assert_eq!(stats.sets, 3);
        assert!((stats.volume_kg - 1446.0).abs() < f64::EPSILON);
    }
}
