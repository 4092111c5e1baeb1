// ABOUTME: Integration tests for the weekly scan quota over stored scan logs
// ABOUTME: Exercises the Monday-boundary week bucketing and tier bypass
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use chrono::NaiveDate;
use forma_server::models::{ScanLog, UserTier};
use forma_server::rate_limiting::{QuotaDecision, WeeklyScanPolicy};
use uuid::Uuid;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn scan_at(database: &forma_server::database::Database, user_id: Uuid, ts: &str) {
    let scan = ScanLog {
        id: Uuid::new_v4(),
        user_id,
        macro_data: serde_json::json!({"macros": {"calories": 400}}),
        created_at: ts.parse().unwrap(),
    };
    database.create_scan_log(&scan).await.unwrap();
}

#[tokio::test]
async fn test_monday_midnight_belongs_to_new_week() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;

    // 2026-08-03 is a Monday. The boundary scan lands exactly on it.
    scan_at(&database, user.id, "2026-08-03T00:00:00Z").await;

    let (start, end) = WeeklyScanPolicy::week_bounds(d("2026-08-04"));
    let this_week = database
        .count_scans_between(user.id, start, end)
        .await
        .unwrap();
    assert_eq!(this_week, 1);

    let (prev_start, prev_end) = WeeklyScanPolicy::week_bounds(d("2026-08-02"));
    let previous_week = database
        .count_scans_between(user.id, prev_start, prev_end)
        .await
        .unwrap();
    assert_eq!(previous_week, 0);
}

#[tokio::test]
async fn test_sunday_last_millisecond_belongs_to_ending_week() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;

    scan_at(&database, user.id, "2026-08-02T23:59:59.999Z").await;

    let (prev_start, prev_end) = WeeklyScanPolicy::week_bounds(d("2026-08-02"));
    assert_eq!(
        database
            .count_scans_between(user.id, prev_start, prev_end)
            .await
            .unwrap(),
        1
    );

    let (start, end) = WeeklyScanPolicy::week_bounds(d("2026-08-03"));
    assert_eq!(
        database.count_scans_between(user.id, start, end).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_free_tier_limit_reached_after_three_scans() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let today = d("2026-08-05");

    for ts in [
        "2026-08-03T08:00:00Z",
        "2026-08-04T12:00:00Z",
        "2026-08-05T09:00:00Z",
    ] {
        scan_at(&database, user.id, ts).await;
    }

    let (start, end) = WeeklyScanPolicy::week_bounds(today);
    let used = database.count_scans_between(user.id, start, end).await.unwrap();
    let decision = WeeklyScanPolicy::default().evaluate(
        UserTier::Free,
        u32::try_from(used).unwrap(),
        today,
    );
    match decision {
        QuotaDecision::LimitReached(usage) => {
            assert_eq!(usage.week_id, "2026-08-03");
            assert_eq!(usage.used, 3);
            assert_eq!(usage.limit, 3);
        }
        other => panic!("expected LimitReached, got {other:?}"),
    }
}

#[tokio::test]
async fn test_last_week_scans_do_not_count_against_this_week() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let today = d("2026-08-05");

    for ts in [
        "2026-07-28T08:00:00Z",
        "2026-07-30T08:00:00Z",
        "2026-08-01T08:00:00Z",
    ] {
        scan_at(&database, user.id, ts).await;
    }

    let (start, end) = WeeklyScanPolicy::week_bounds(today);
    let used = database.count_scans_between(user.id, start, end).await.unwrap();
    assert_eq!(used, 0, "quota self-resets at the week boundary");
    assert!(WeeklyScanPolicy::default()
        .evaluate(UserTier::Free, 0, today)
        .is_allowed());
}

#[tokio::test]
async fn test_plus_tier_is_unlimited() {
    let policy = WeeklyScanPolicy::default();
    assert_eq!(
        policy.evaluate(UserTier::Plus, 1000, d("2026-08-05")),
        QuotaDecision::Unlimited
    );
}
