// ABOUTME: User account storage and bearer session resolution
// ABOUTME: Session rows are provisioned by the external auth service; this side only reads them
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{db_err, parse_uuid, Database};
use crate::errors::AppResult;
use crate::models::{User, UserTier};

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.try_get("id").map_err(|e| db_err("read user id", &e))?;
    let tier: String = row
        .try_get("tier")
        .map_err(|e| db_err("read user tier", &e))?;
    Ok(User {
        id: parse_uuid(&id, "user")?,
        email: row
            .try_get("email")
            .map_err(|e| db_err("read user email", &e))?,
        display_name: row
            .try_get("display_name")
            .map_err(|e| db_err("read user display_name", &e))?,
        tier: UserTier::from_storage(&tier),
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read user created_at", &e))?,
        last_active: row
            .try_get("last_active")
            .map_err(|e| db_err("read user last_active", &e))?,
        is_active: row
            .try_get("is_active")
            .map_err(|e| db_err("read user is_active", &e))?,
    })
}

impl Database {
    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including on duplicate email.
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, tier, created_at, last_active, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.tier.as_str())
        .bind(user.created_at)
        .bind(user.last_active)
        .bind(user.is_active)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create user", &e))?;
        Ok(())
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_err("get user", &e))?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Set a user's subscription tier
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user_tier(&self, user_id: Uuid, tier: UserTier) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET tier = ?1 WHERE id = ?2")
            .bind(tier.as_str())
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| db_err("update user tier", &e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Record request activity for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn touch_last_active(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = ?1 WHERE id = ?2")
            .bind(at)
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| db_err("touch last_active", &e))?;
        Ok(())
    }

    /// List users ordered by creation, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_users(&self, limit: u32, offset: u32) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("list users", &e))?;
        rows.iter().map(row_to_user).collect()
    }

    /// Total user count
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_users(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await
            .map_err(|e| db_err("count users", &e))
    }

    /// Provision a bearer session for a user.
    ///
    /// Session issuance belongs to the external auth service; this insert
    /// exists for provisioning tools and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO sessions (token, user_id, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(token)
        .bind(user_id.to_string())
        .bind(expires_at)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create session", &e))?;
        Ok(())
    }

    /// Resolve a bearer token to its active user, if the session has not
    /// expired and the account is active
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session_user(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT u.* FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.token = ?1 AND s.expires_at > ?2 AND u.is_active = 1
            ",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_err("resolve session", &e))?;
        row.as_ref().map(row_to_user).transpose()
    }
}
