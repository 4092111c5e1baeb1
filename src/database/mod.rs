// ABOUTME: Database manager and schema migration for the SQLite store
// ABOUTME: Owns the connection pool; entity operations live in sibling impl files
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! SQLite-backed storage for all persistent state. The [`Database`] struct
//! owns the connection pool; operations are grouped by entity into the
//! submodules, each extending `impl Database`.
//!
//! The store keeps raw rows only. Summaries, streaks, personal records and
//! quota usage are recomputed from these rows on every read by the
//! `intelligence` and `rate_limiting` modules.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Payment queries for the admin finance surface
pub mod payments;
/// Biometric profile and diet plan storage
pub mod profiles;
/// Meal scan log storage and quota counts
pub mod scans;
/// User accounts and bearer session resolution
pub mod users;
/// Workout plan items, sessions, session items and sets
pub mod workouts;

/// Database manager for all persistent state
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        // In-memory databases are per-connection; pin the pool to one
        // connection so every handle sees the same schema.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("failed to connect: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Access the underlying pool
    pub(crate) const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity probe for readiness checks
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot execute a query.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("ping failed: {e}")))?;
        Ok(())
    }

    /// Run idempotent schema migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                tier TEXT NOT NULL DEFAULT 'free',
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
            r"
            CREATE TABLE IF NOT EXISTS biometric_profiles (
                user_id TEXT PRIMARY KEY,
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                birth_date TEXT,
                sex TEXT,
                activity_level TEXT,
                goal TEXT,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS workout_items (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                group_id TEXT,
                exercise_id TEXT NOT NULL,
                variation_id TEXT NOT NULL,
                exercise_title TEXT NOT NULL,
                variation_title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_workout_items_user ON workout_items(user_id)",
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                performed_on TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, performed_on),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_sessions_user_day \
             ON workout_sessions(user_id, performed_on)",
            r"
            CREATE TABLE IF NOT EXISTS session_items (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                workout_item_id TEXT,
                exercise_id TEXT NOT NULL,
                variation_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES workout_sessions (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_session_items_session ON session_items(session_id)",
            r"
            CREATE TABLE IF NOT EXISTS workout_sets (
                id TEXT PRIMARY KEY,
                session_item_id TEXT NOT NULL,
                set_index INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight_kg REAL NOT NULL,
                rpe REAL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (session_item_id) REFERENCES session_items (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_sets_item ON workout_sets(session_item_id)",
            r"
            CREATE TABLE IF NOT EXISTS scan_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                macro_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_scan_logs_user_time \
             ON scan_logs(user_id, created_at)",
            r"
            CREATE TABLE IF NOT EXISTS diet_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                plan_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_diet_plans_user ON diet_plans(user_id, created_at)",
            r"
            CREATE TABLE IF NOT EXISTS pix_payments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                provider_charge_id TEXT NOT NULL,
                amount_cents INTEGER NOT NULL,
                status TEXT NOT NULL,
                qr_code TEXT,
                copy_paste_code TEXT,
                created_at TEXT NOT NULL,
                paid_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_pix_payments_user ON pix_payments(user_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("migration failed: {e}")))?;
        }

        Ok(())
    }
}

/// Parse a stored UUID column, attributing failures to the named field
pub(crate) fn parse_uuid(value: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("corrupt {field} uuid {value}: {e}")))
}

/// Map a sqlx error into the store-failure taxonomy, preserving the message
pub(crate) fn db_err(context: &str, e: &sqlx::Error) -> AppError {
    AppError::database(format!("{context}: {e}"))
}
