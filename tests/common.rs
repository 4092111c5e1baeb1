// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, resource and seeding helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(dead_code)]

//! Shared test setup for `forma_server` integration tests.

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::sync::{Arc, Once};
use uuid::Uuid;

use forma_server::{
    config::{AnalyzerConfig, PaymentGatewayConfig, ServerConfig},
    context::ServerResources,
    database::Database,
    external::{MealAnalyzer, MockAnalyzer, MockGateway, PaymentGateway},
    models::{SessionItem, User, UserTier, WorkoutItem, WorkoutSet},
    utils::time::Clock,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Create a standard free-tier test user
pub async fn create_test_user(database: &Database) -> User {
    create_test_user_with_email(database, &format!("user-{}@example.com", Uuid::new_v4())).await
}

/// Create a test user with a specific email
pub async fn create_test_user_with_email(database: &Database, email: &str) -> User {
    let user = User::new(email.to_owned(), Some("Test User".to_owned()));
    database.create_user(&user).await.expect("create user");
    user
}

/// Create a plus-tier test user
pub async fn create_plus_user(database: &Database) -> User {
    let user = create_test_user(database).await;
    database
        .update_user_tier(user.id, UserTier::Plus)
        .await
        .expect("upgrade user");
    User {
        tier: UserTier::Plus,
        ..user
    }
}

/// Provision a session token for a user, valid for a day past `now`
pub async fn create_session_token(database: &Database, user_id: Uuid, now: DateTime<Utc>) -> String {
    let token = format!("test-token-{}", Uuid::new_v4());
    database
        .create_session(&token, user_id, now + chrono::Duration::days(1))
        .await
        .expect("create session");
    token
}

/// A plan item plus the session item it was attached to on one day
pub struct SeededItem {
    pub plan_item: WorkoutItem,
    pub session_item: SessionItem,
}

/// Create a plan item and attach it to the user's session on `day`
pub async fn seed_session_item(database: &Database, user_id: Uuid, day: NaiveDate) -> SeededItem {
    seed_named_session_item(database, user_id, day, "bench-press", "flat-barbell").await
}

/// Create a named plan item and attach it to the user's session on `day`
pub async fn seed_named_session_item(
    database: &Database,
    user_id: Uuid,
    day: NaiveDate,
    exercise_id: &str,
    variation_id: &str,
) -> SeededItem {
    let plan_item = WorkoutItem {
        id: Uuid::new_v4(),
        user_id,
        group_id: Some("push".to_owned()),
        exercise_id: exercise_id.to_owned(),
        variation_id: variation_id.to_owned(),
        exercise_title: format!("{exercise_id} title"),
        variation_title: format!("{variation_id} title"),
        created_at: Utc::now(),
    };
    database
        .create_workout_item(&plan_item)
        .await
        .expect("create plan item");
    let session = database
        .get_or_create_session(user_id, day)
        .await
        .expect("create session");
    let session_item = database
        .create_session_item(session.id, &plan_item)
        .await
        .expect("create session item");
    SeededItem {
        plan_item,
        session_item,
    }
}

/// Log one set for a user on `day`, creating session and item as needed
pub async fn seed_set(
    database: &Database,
    user_id: Uuid,
    day: NaiveDate,
    reps: i64,
    weight_kg: f64,
) -> WorkoutSet {
    let seeded = seed_session_item(database, user_id, day).await;
    database
        .add_set(seeded.session_item.id, reps, weight_kg, None)
        .await
        .expect("add set")
}

/// Test configuration with the admin surface enabled
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        admin_token: Some("test-admin-token".to_owned()),
        plan_price_cents: 2990,
        analyzer: AnalyzerConfig {
            api_key: String::new(),
            base_url: "http://localhost".to_owned(),
            model: "test".to_owned(),
        },
        payments: PaymentGatewayConfig {
            access_token: String::new(),
            base_url: "http://localhost".to_owned(),
        },
    }
}

/// Assemble server resources with mock external capabilities and a pinned
/// clock
pub fn build_test_resources(
    database: Database,
    clock: Clock,
    analyzer: MockAnalyzer,
    gateway: MockGateway,
) -> Arc<ServerResources> {
    let analyzer: Arc<dyn MealAnalyzer> = Arc::new(analyzer);
    let payments: Arc<dyn PaymentGateway> = Arc::new(gateway);
    Arc::new(ServerResources::new(
        database,
        Arc::new(test_config()),
        analyzer,
        payments,
        clock,
    ))
}

/// A clock pinned to noon UTC on the given day
pub fn fixed_clock(day: &str) -> Clock {
    let at: DateTime<Utc> = format!("{day}T12:00:00Z").parse().expect("valid date");
    Clock::Fixed(at)
}

/// Shift a date by a number of days into the past
pub fn days_before(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(days)).expect("valid date")
}
