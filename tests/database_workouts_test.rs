// ABOUTME: Integration tests for workout storage invariants
// ABOUTME: Set-index monotonicity without reuse and one-session-per-day upsert semantics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use chrono::NaiveDate;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_set_indexes_increase_without_gaps() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let seeded = common::seed_session_item(&database, user.id, d("2026-08-04")).await;

    let mut indexes = Vec::new();
    for reps in [10, 8, 6] {
        let set = database
            .add_set(seeded.session_item.id, reps, 60.0, None)
            .await
            .unwrap();
        indexes.push(set.set_index);
    }
    assert_eq!(indexes, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_deleted_index_is_never_reused() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let seeded = common::seed_session_item(&database, user.id, d("2026-08-04")).await;

    database.add_set(seeded.session_item.id, 10, 60.0, None).await.unwrap();
    let second = database
        .add_set(seeded.session_item.id, 8, 60.0, None)
        .await
        .unwrap();
    assert_eq!(second.set_index, 2);

    assert!(database.delete_set(user.id, second.id).await.unwrap());

    let third = database
        .add_set(seeded.session_item.id, 6, 60.0, None)
        .await
        .unwrap();
    assert_eq!(third.set_index, 3, "index continues past the deleted maximum");

    let sets = database
        .list_sets_for_item(seeded.session_item.id)
        .await
        .unwrap();
    let indexes: Vec<i64> = sets.iter().map(|s| s.set_index).collect();
    assert_eq!(indexes, vec![1, 3], "no renumbering after deletion");
}

#[tokio::test]
async fn test_indexes_are_scoped_per_session_item() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");
    let first = common::seed_named_session_item(&database, user.id, day, "bench", "flat").await;
    let second = common::seed_named_session_item(&database, user.id, day, "squat", "low-bar").await;

    database.add_set(first.session_item.id, 10, 60.0, None).await.unwrap();
    let other = database
        .add_set(second.session_item.id, 5, 100.0, None)
        .await
        .unwrap();
    assert_eq!(other.set_index, 1, "each session item counts from one");
}

#[tokio::test]
async fn test_marking_today_twice_returns_the_same_session() {
    let database = common::create_test_database().await;
    let user = common::create_test_user(&database).await;
    let day = d("2026-08-04");

    let first = database.get_or_create_session(user.id, day).await.unwrap();
    let second = database.get_or_create_session(user.id, day).await.unwrap();
    assert_eq!(first.id, second.id);

    let sessions = database.get_sessions_in_range(user.id, day, day).await.unwrap();
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_delete_set_enforces_ownership() {
    let database = common::create_test_database().await;
    let owner = common::create_test_user(&database).await;
    let intruder = common::create_test_user(&database).await;
    let seeded = common::seed_session_item(&database, owner.id, d("2026-08-04")).await;
    let set = database
        .add_set(seeded.session_item.id, 10, 60.0, None)
        .await
        .unwrap();

    assert!(!database.delete_set(intruder.id, set.id).await.unwrap());
    assert!(database.delete_set(owner.id, set.id).await.unwrap());
}

#[tokio::test]
async fn test_session_item_ownership_lookup() {
    let database = common::create_test_database().await;
    let owner = common::create_test_user(&database).await;
    let intruder = common::create_test_user(&database).await;
    let seeded = common::seed_session_item(&database, owner.id, d("2026-08-04")).await;

    assert!(database
        .get_owned_session_item(owner.id, seeded.session_item.id)
        .await
        .unwrap()
        .is_some());
    assert!(database
        .get_owned_session_item(intruder.id, seeded.session_item.id)
        .await
        .unwrap()
        .is_none());
}
