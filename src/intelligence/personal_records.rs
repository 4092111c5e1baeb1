// ABOUTME: Personal-record computation ranked by Epley estimated one-rep max
// ABOUTME: Keeps the single best set per exercise+variation over bounded recent history
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Personal records.
//!
//! For each `(exercise_id, variation_id)` pair the single qualifying set
//! with the highest estimated one-rep max is retained. Sets with zero or
//! negative reps or weight never qualify; they are excluded outright rather
//! than treated as zero-value records.
//!
//! Equal e1rm resolves by higher raw weight, then first seen, so the output
//! ordering is deterministic for identical input order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round1;
use crate::constants::limits;
use crate::models::SetHistoryRow;

/// One personal-record entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Stable grouping key, `exerciseId:variationId`
    pub key: String,
    /// Display label; raw exercise id when the title is gone
    pub exercise: String,
    /// Display label; raw variation id when the title is gone
    pub variation: String,
    pub best_weight_kg: f64,
    pub best_reps: i64,
    pub best_e1rm: f64,
}

/// Epley estimated one-rep max: `weight * (1 + reps / 30)`
#[must_use]
#[allow(clippy::cast_precision_loss)] // reps are small integers
pub fn epley_e1rm(weight_kg: f64, reps: i64) -> f64 {
    weight_kg * (1.0 + reps as f64 / 30.0)
}

/// A title is usable when present and non-blank; otherwise fall back to the
/// raw id so the display label is never empty
fn label(title: Option<&str>, fallback: &str) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t.to_owned(),
        _ => fallback.to_owned(),
    }
}

struct Best {
    exercise: String,
    variation: String,
    weight_kg: f64,
    reps: i64,
    e1rm: f64,
}

/// Compute the top personal records from set history.
///
/// `rows` come in encounter order; the fold keeps the first set seen among
/// exact ties. Output is sorted by e1rm descending (weight, then key, as
/// tie-breaks) and truncated to [`limits::PR_TOP_K`] entries.
#[must_use]
pub fn compute_prs(rows: &[SetHistoryRow]) -> Vec<PersonalRecord> {
    let mut best: HashMap<(String, String), Best> = HashMap::new();

    for row in rows {
        if row.reps <= 0 || row.weight_kg <= 0.0 {
            continue;
        }
        let e1rm = epley_e1rm(row.weight_kg, row.reps);
        let key = (row.exercise_id.clone(), row.variation_id.clone());
        let replace = match best.get(&key) {
            None => true,
            Some(current) => {
                e1rm > current.e1rm || (e1rm == current.e1rm && row.weight_kg > current.weight_kg)
            }
        };
        if replace {
            best.insert(
                key,
                Best {
                    exercise: label(row.exercise_title.as_deref(), &row.exercise_id),
                    variation: label(row.variation_title.as_deref(), &row.variation_id),
                    weight_kg: row.weight_kg,
                    reps: row.reps,
                    e1rm,
                },
            );
        }
    }

    let mut records: Vec<PersonalRecord> = best
        .into_iter()
        .map(|((exercise_id, variation_id), b)| PersonalRecord {
            key: format!("{exercise_id}:{variation_id}"),
            exercise: b.exercise,
            variation: b.variation,
            best_weight_kg: round1(b.weight_kg),
            best_reps: b.reps,
            best_e1rm: round1(b.e1rm),
        })
        .collect();

    records.sort_by(|a, b| {
        b.best_e1rm
            .total_cmp(&a.best_e1rm)
            .then(b.best_weight_kg.total_cmp(&a.best_weight_kg))
            .then(a.key.cmp(&b.key))
    });
    records.truncate(limits::PR_TOP_K);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(exercise: &str, variation: &str, reps: i64, weight_kg: f64) -> SetHistoryRow {
        SetHistoryRow {
            exercise_id: exercise.to_owned(),
            variation_id: variation.to_owned(),
            exercise_title: Some(format!("{exercise} title")),
            variation_title: Some(format!("{variation} title")),
            reps,
            weight_kg,
        }
    }

    #[test]
    fn test_epley_formula_and_display_rounding() {
        let records = compute_prs(&[row("bench", "flat", 5, 100.0)]);
        assert_eq!(records.len(), 1);
        // 100 * (1 + 5/30) = 116.666... displays as 116.7
        assert!((records[0].best_e1rm - 116.7).abs() < f64::EPSILON);
        assert!((records[0].best_weight_kg - 100.0).abs() < f64::EPSILON);
        assert_eq!(records[0].best_reps, 5);
        assert_eq!(records[0].key, "bench:flat");
    }

    #[test]
    fn test_zero_rep_or_weight_sets_never_qualify() {
        let records = compute_prs(&[
            row("bench", "flat", 0, 100.0),
            row("bench", "flat", 5, 0.0),
        ]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_best_set_wins_within_key() {
        let records = compute_prs(&[
            row("squat", "high-bar", 5, 100.0),  // 116.67
            row("squat", "high-bar", 3, 120.0),  // 132.0
            row("squat", "high-bar", 10, 80.0),  // 106.67
        ]);
        assert_eq!(records.len(), 1);
        assert!((records[0].best_e1rm - 132.0).abs() < f64::EPSILON);
        assert_eq!(records[0].best_reps, 3);
    }

    #[test]
    fn test_equal_e1rm_prefers_higher_raw_weight() {
        let records = compute_prs(&[
            row("dead", "conv", 30, 60.0), // 120.0
            row("dead", "conv", 0, 0.0),   // excluded
            row("dead", "conv", 6, 100.0), // 120.0, heavier raw weight
        ]);
        assert_eq!(records[0].best_reps, 6);
        assert!((records[0].best_weight_kg - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_output_sorted_and_truncated_to_top_eight() {
        let rows: Vec<SetHistoryRow> = (0..12)
            .map(|i| row(&format!("ex{i}"), "v", 5, 100.0 + f64::from(i)))
            .collect();
        let records = compute_prs(&rows);
        assert_eq!(records.len(), 8);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].best_e1rm >= pair[1].best_e1rm));
        assert_eq!(records[0].exercise, "ex11 title");
    }

    #[test]
    fn test_label_falls_back_to_raw_ids() {
        let mut orphan = row("bench", "flat", 5, 100.0);
        orphan.exercise_title = None;
        orphan.variation_title = Some("  ".to_owned());
        let records = compute_prs(&[orphan]);
        assert_eq!(records[0].exercise, "bench");
        assert_eq!(records[0].variation, "flat");
    }
}
