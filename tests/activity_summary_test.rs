// ABOUTME: Integration tests for ranged and today activity summaries over real rows
// ABOUTME: Covers zero-fill completeness, volume arithmetic and day resolution
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use chrono::NaiveDate;
use forma_server::intelligence::{summarize_range, summarize_today};
use forma_server::models::ScanLog;
use forma_server::utils::time::range_bounds;
use uuid::Uuid;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_zero_fill_for_user_with_no_rows() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;

    let start = d("2026-08-01");
    let end = d("2026-08-07");
    let sessions = database
        .get_sessions_in_range(user.id, start, end)
        .await
        .unwrap();
    let items = database
        .list_session_items_for_sessions(&[])
        .await
        .unwrap();
    let sets = database.list_sets_for_items(&[]).await.unwrap();
    let (ts_start, ts_end) = range_bounds(start, end);
    let scans = database
        .get_scans_between(user.id, ts_start, ts_end)
        .await
        .unwrap();

    let days = summarize_range(start, end, &sessions, &items, &sets, &scans);
    assert_eq!(days.len(), 7);
    for (offset, day) in days.iter().enumerate() {
        assert_eq!(day.date, d(&format!("2026-08-0{}", offset + 1)));
        assert_eq!(day.workouts, 0);
        assert_eq!(day.sets, 0);
        assert!(day.volume_kg.abs() < f64::EPSILON);
        assert_eq!(day.scans, 0);
        assert_eq!(day.calories, 0);
    }
}

#[tokio::test]
async fn test_volume_and_counts_fold_from_stored_rows() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let seeded = common::seed_session_item(&database, user.id, day).await;
    database
        .add_set(seeded.session_item.id, 10, 20.0, None)
        .await
        .unwrap();
    database
        .add_set(seeded.session_item.id, 8, 25.0, Some(8.5))
        .await
        .unwrap();

    let sessions = database.get_sessions_in_range(user.id, day, day).await.unwrap();
    let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
    let items = database
        .list_session_items_for_sessions(&session_ids)
        .await
        .unwrap();
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let sets = database.list_sets_for_items(&item_ids).await.unwrap();

    let days = summarize_range(day, day, &sessions, &items, &sets, &[]);
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].workouts, 1);
    assert_eq!(days[0].sets, 2);
    assert!((days[0].volume_kg - 400.0).abs() < f64::EPSILON);

    let stats = summarize_today(&items, &sets);
    assert_eq!(stats.exercises, 1);
    assert_eq!(stats.sets, 2);
    assert!((stats.volume_kg - 400.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_scans_and_calories_bucket_by_scan_day() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    for (ts, calories) in [
        ("2026-08-04T00:00:00Z", 300.4),
        ("2026-08-04T19:30:00Z", 412.0),
        ("2026-08-05T00:00:00Z", 999.0), // next day, outside the range
    ] {
        let scan = ScanLog {
            id: Uuid::new_v4(),
            user_id: user.id,
            macro_data: serde_json::json!({"title": "meal", "macros": {"calories": calories}}),
            created_at: ts.parse().unwrap(),
        };
        database.create_scan_log(&scan).await.unwrap();
    }

    let (ts_start, ts_end) = range_bounds(day, day);
    let scans = database
        .get_scans_between(user.id, ts_start, ts_end)
        .await
        .unwrap();
    assert_eq!(scans.len(), 2);

    let days = summarize_range(day, day, &[], &[], &[], &scans);
    assert_eq!(days[0].scans, 2);
    assert_eq!(days[0].calories, 712); // 712.4 rounds to 712
}

#[tokio::test]
async fn test_malformed_macro_payload_counts_zero_calories() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let scan = ScanLog {
        id: Uuid::new_v4(),
        user_id: user.id,
        macro_data: serde_json::json!({"macros": {"calories": "lots"}}),
        created_at: "2026-08-04T10:00:00Z".parse().unwrap(),
    };
    database.create_scan_log(&scan).await.unwrap();

    let (ts_start, ts_end) = range_bounds(day, day);
    let scans = database
        .get_scans_between(user.id, ts_start, ts_end)
        .await
        .unwrap();
    let days = summarize_range(day, day, &[], &[], &[], &scans);
    assert_eq!(days[0].scans, 1);
    assert_eq!(days[0].calories, 0);
}
