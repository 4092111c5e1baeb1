// ABOUTME: Integration tests for personal-record computation over stored set history
// ABOUTME: Covers Epley rounding, invalid-set exclusion and orphaned-title fallback
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use chrono::NaiveDate;
use forma_server::intelligence::compute_prs;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_epley_pr_from_stored_sets() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let seeded = common::seed_session_item(&database, user.id, day).await;
    database
        .add_set(seeded.session_item.id, 5, 100.0, None)
        .await
        .unwrap();
    database
        .add_set(seeded.session_item.id, 8, 80.0, None)
        .await
        .unwrap();

    let history = database.get_set_history(user.id, 60).await.unwrap();
    let prs = compute_prs(&history);
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].key, "bench-press:flat-barbell");
    assert_eq!(prs[0].exercise, "bench-press title");
    // 100 * (1 + 5/30) = 116.666... > 80 * (1 + 8/30) = 101.333...
    assert!((prs[0].best_e1rm - 116.7).abs() < f64::EPSILON);
    assert_eq!(prs[0].best_reps, 5);
    assert!((prs[0].best_weight_kg - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_zero_weight_sets_never_surface_as_prs() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let seeded = common::seed_session_item(&database, user.id, day).await;
    // Bodyweight-style entries with no load recorded
    database
        .add_set(seeded.session_item.id, 12, 0.0, None)
        .await
        .unwrap();

    let history = database.get_set_history(user.id, 60).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(compute_prs(&history).is_empty());
}

#[tokio::test]
async fn test_orphaned_plan_item_falls_back_to_raw_ids() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let seeded = common::seed_session_item(&database, user.id, day).await;
    database
        .add_set(seeded.session_item.id, 5, 60.0, None)
        .await
        .unwrap();
    // Removing the plan item must not disturb history, only its titles
    assert!(database
        .delete_workout_item(user.id, seeded.plan_item.id)
        .await
        .unwrap());

    let history = database.get_set_history(user.id, 60).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].exercise_title.is_none());

    let prs = compute_prs(&history);
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].exercise, "bench-press");
    assert_eq!(prs[0].variation, "flat-barbell");
}

#[tokio::test]
async fn test_one_entry_per_exercise_variation_pair() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let bench = common::seed_named_session_item(&database, user.id, day, "bench", "flat").await;
    let squat = common::seed_named_session_item(&database, user.id, day, "squat", "high-bar").await;
    database.add_set(bench.session_item.id, 5, 100.0, None).await.unwrap();
    database.add_set(bench.session_item.id, 3, 110.0, None).await.unwrap();
    database.add_set(squat.session_item.id, 5, 140.0, None).await.unwrap();

    let history = database.get_set_history(user.id, 60).await.unwrap();
    let prs = compute_prs(&history);
    assert_eq!(prs.len(), 2);
    // Squat e1rm 163.3 ranks above bench 121.0
    assert_eq!(prs[0].key, "squat:high-bar");
    assert_eq!(prs[1].key, "bench:flat");
    assert!(prs[0].best_e1rm > prs[1].best_e1rm);
}
