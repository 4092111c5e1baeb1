// ABOUTME: Derived-state computation over raw activity rows
// ABOUTME: Daily summaries, streaks and personal records, all pure and recomputed per read
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Activity Intelligence
//!
//! Pure computations over rows fetched from the database. Nothing in this
//! module performs I/O or reads the clock; handlers fetch raw rows, pass
//! them in together with "today", and serialize the results. That keeps
//! every day-boundary edge case testable with plain synthetic data.

/// Day-bucketed activity summaries and the today widget
pub mod activity_summary;
/// Personal records ranked by estimated one-rep max
pub mod personal_records;
/// Consecutive-active-day streaks from combined workout/scan signals
pub mod streak;

pub use activity_summary::{summarize_range, summarize_today, DailySummary, TodayStats};
pub use personal_records::{compute_prs, epley_e1rm, PersonalRecord};
pub use streak::{compute_streak, DayActivity, StreakReport};

/// Round to one decimal place for display values
#[must_use]
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
