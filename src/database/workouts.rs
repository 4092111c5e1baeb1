// ABOUTME: Workout storage: plan items, daily sessions, session items and logged sets
// ABOUTME: Set indexes are assigned atomically inside the insert to keep them strictly increasing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{db_err, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{SessionItem, SetHistoryRow, WorkoutItem, WorkoutSession, WorkoutSet};

/// A session item joined with its plan-item titles for display.
///
/// Titles are `None` when the referenced plan item was deleted; callers fall
/// back to an "unknown exercise" label, never an error.
#[derive(Debug, Clone)]
pub struct SessionItemDetail {
    pub item: SessionItem,
    pub exercise_title: Option<String>,
    pub variation_title: Option<String>,
}

fn row_to_workout_item(row: &SqliteRow) -> AppResult<WorkoutItem> {
    let id: String = row
        .try_get("id")
        .map_err(|e| db_err("read workout item id", &e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read workout item user", &e))?;
    Ok(WorkoutItem {
        id: parse_uuid(&id, "workout_item")?,
        user_id: parse_uuid(&user_id, "workout_item.user")?,
        group_id: row
            .try_get("group_id")
            .map_err(|e| db_err("read workout item group", &e))?,
        exercise_id: row
            .try_get("exercise_id")
            .map_err(|e| db_err("read workout item exercise", &e))?,
        variation_id: row
            .try_get("variation_id")
            .map_err(|e| db_err("read workout item variation", &e))?,
        exercise_title: row
            .try_get("exercise_title")
            .map_err(|e| db_err("read workout item exercise title", &e))?,
        variation_title: row
            .try_get("variation_title")
            .map_err(|e| db_err("read workout item variation title", &e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read workout item created_at", &e))?,
    })
}

fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    let id: String = row
        .try_get("id")
        .map_err(|e| db_err("read session id", &e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read session user", &e))?;
    Ok(WorkoutSession {
        id: parse_uuid(&id, "session")?,
        user_id: parse_uuid(&user_id, "session.user")?,
        performed_on: row
            .try_get("performed_on")
            .map_err(|e| db_err("read session day", &e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read session created_at", &e))?,
    })
}

fn row_to_session_item(row: &SqliteRow) -> AppResult<SessionItem> {
    let id: String = row
        .try_get("id")
        .map_err(|e| db_err("read session item id", &e))?;
    let session_id: String = row
        .try_get("session_id")
        .map_err(|e| db_err("read session item session", &e))?;
    let workout_item_id: Option<String> = row
        .try_get("workout_item_id")
        .map_err(|e| db_err("read session item plan ref", &e))?;
    Ok(SessionItem {
        id: parse_uuid(&id, "session_item")?,
        session_id: parse_uuid(&session_id, "session_item.session")?,
        workout_item_id: workout_item_id
            .as_deref()
            .map(|v| parse_uuid(v, "session_item.workout_item"))
            .transpose()?,
        exercise_id: row
            .try_get("exercise_id")
            .map_err(|e| db_err("read session item exercise", &e))?,
        variation_id: row
            .try_get("variation_id")
            .map_err(|e| db_err("read session item variation", &e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read session item created_at", &e))?,
    })
}

fn row_to_set(row: &SqliteRow) -> AppResult<WorkoutSet> {
    let id: String = row.try_get("id").map_err(|e| db_err("read set id", &e))?;
    let session_item_id: String = row
        .try_get("session_item_id")
        .map_err(|e| db_err("read set item", &e))?;
    Ok(WorkoutSet {
        id: parse_uuid(&id, "set")?,
        session_item_id: parse_uuid(&session_item_id, "set.session_item")?,
        set_index: row
            .try_get("set_index")
            .map_err(|e| db_err("read set index", &e))?,
        reps: row.try_get("reps").map_err(|e| db_err("read set reps", &e))?,
        weight_kg: row
            .try_get("weight_kg")
            .map_err(|e| db_err("read set weight", &e))?,
        rpe: row.try_get("rpe").map_err(|e| db_err("read set rpe", &e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read set created_at", &e))?,
    })
}

/// Build an `IN (?, ?, ...)` placeholder list for `count` bindings
fn placeholders(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}

impl Database {
    /// Insert a plan item
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_workout_item(&self, item: &WorkoutItem) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO workout_items
                (id, user_id, group_id, exercise_id, variation_id,
                 exercise_title, variation_title, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(item.id.to_string())
        .bind(item.user_id.to_string())
        .bind(&item.group_id)
        .bind(&item.exercise_id)
        .bind(&item.variation_id)
        .bind(&item.exercise_title)
        .bind(&item.variation_title)
        .bind(item.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create workout item", &e))?;
        Ok(())
    }

    /// List a user's plan items, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_workout_items(&self, user_id: Uuid) -> AppResult<Vec<WorkoutItem>> {
        let rows = sqlx::query(
            "SELECT * FROM workout_items WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("list workout items", &e))?;
        rows.iter().map(row_to_workout_item).collect()
    }

    /// Fetch a plan item, enforcing ownership
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_workout_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<WorkoutItem>> {
        let row = sqlx::query("SELECT * FROM workout_items WHERE id = ?1 AND user_id = ?2")
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_err("get workout item", &e))?;
        row.as_ref().map(row_to_workout_item).transpose()
    }

    /// Delete a plan item. Historical session items keep their copied
    /// exercise/variation ids and are not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_workout_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workout_items WHERE id = ?1 AND user_id = ?2")
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| db_err("delete workout item", &e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch the session for one calendar day, if it exists
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Option<WorkoutSession>> {
        let row = sqlx::query(
            "SELECT * FROM workout_sessions WHERE user_id = ?1 AND performed_on = ?2",
        )
        .bind(user_id.to_string())
        .bind(day)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_err("get session", &e))?;
        row.as_ref().map(row_to_session).transpose()
    }

    /// Fetch the session for one calendar day, creating it on first touch.
    ///
    /// Upsert-on-conflict: re-marking the same day returns the existing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or lookup fails.
    pub async fn get_or_create_session(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<WorkoutSession> {
        if let Some(existing) = self.get_session_on(user_id, day).await? {
            return Ok(existing);
        }

        // OR IGNORE keeps a concurrent creator from failing the request;
        // the follow-up select returns whichever row won.
        sqlx::query(
            r"
            INSERT OR IGNORE INTO workout_sessions (id, user_id, performed_on, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(day)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create session", &e))?;

        self.get_session_on(user_id, day)
            .await?
            .ok_or_else(|| AppError::database("session vanished after upsert"))
    }

    /// Sessions whose day falls in the inclusive range `[start, end]`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_sessions_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM workout_sessions
            WHERE user_id = ?1 AND performed_on >= ?2 AND performed_on <= ?3
            ORDER BY performed_on ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("get sessions in range", &e))?;
        rows.iter().map(row_to_session).collect()
    }

    /// Distinct session days on or after `since`, for streak computation
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session_days_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> AppResult<Vec<NaiveDate>> {
        let rows = sqlx::query(
            r"
            SELECT performed_on FROM workout_sessions
            WHERE user_id = ?1 AND performed_on >= ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("get session days", &e))?;
        rows.iter()
            .map(|row| {
                row.try_get("performed_on")
                    .map_err(|e| db_err("read session day", &e))
            })
            .collect()
    }

    /// Attach a plan item to a session, copying its exercise identity
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_session_item(
        &self,
        session_id: Uuid,
        plan_item: &WorkoutItem,
    ) -> AppResult<SessionItem> {
        let item = SessionItem {
            id: Uuid::new_v4(),
            session_id,
            workout_item_id: Some(plan_item.id),
            exercise_id: plan_item.exercise_id.clone(),
            variation_id: plan_item.variation_id.clone(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r"
            INSERT INTO session_items
                (id, session_id, workout_item_id, exercise_id, variation_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(item.id.to_string())
        .bind(item.session_id.to_string())
        .bind(plan_item.id.to_string())
        .bind(&item.exercise_id)
        .bind(&item.variation_id)
        .bind(item.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create session item", &e))?;
        Ok(item)
    }

    /// Session items belonging to any of the given sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_session_items_for_sessions(
        &self,
        session_ids: &[Uuid],
    ) -> AppResult<Vec<SessionItem>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT * FROM session_items WHERE session_id IN ({})",
            placeholders(session_ids.len())
        );
        let mut q = sqlx::query(&query);
        for id in session_ids {
            q = q.bind(id.to_string());
        }
        let rows = q
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_err("list session items", &e))?;
        rows.iter().map(row_to_session_item).collect()
    }

    /// Session items for one session joined with plan titles, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_session_item_details(
        &self,
        session_id: Uuid,
    ) -> AppResult<Vec<SessionItemDetail>> {
        let rows = sqlx::query(
            r"
            SELECT si.*, wi.exercise_title, wi.variation_title
            FROM session_items si
            LEFT JOIN workout_items wi ON wi.id = si.workout_item_id
            WHERE si.session_id = ?1
            ORDER BY si.created_at DESC
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("list session item details", &e))?;
        rows.iter()
            .map(|row| {
                Ok(SessionItemDetail {
                    item: row_to_session_item(row)?,
                    exercise_title: row
                        .try_get("exercise_title")
                        .map_err(|e| db_err("read joined exercise title", &e))?,
                    variation_title: row
                        .try_get("variation_title")
                        .map_err(|e| db_err("read joined variation title", &e))?,
                })
            })
            .collect()
    }

    /// Fetch a session item, enforcing ownership through its session
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_owned_session_item(
        &self,
        user_id: Uuid,
        session_item_id: Uuid,
    ) -> AppResult<Option<SessionItem>> {
        let row = sqlx::query(
            r"
            SELECT si.* FROM session_items si
            JOIN workout_sessions ws ON ws.id = si.session_id
            WHERE si.id = ?1 AND ws.user_id = ?2
            ",
        )
        .bind(session_item_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_err("get session item", &e))?;
        row.as_ref().map(row_to_session_item).transpose()
    }

    /// Sets belonging to any of the given session items
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_sets_for_items(&self, item_ids: &[Uuid]) -> AppResult<Vec<WorkoutSet>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT * FROM workout_sets WHERE session_item_id IN ({})",
            placeholders(item_ids.len())
        );
        let mut q = sqlx::query(&query);
        for id in item_ids {
            q = q.bind(id.to_string());
        }
        let rows = q
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_err("list sets", &e))?;
        rows.iter().map(row_to_set).collect()
    }

    /// Sets for one session item ordered by their explicit index
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_sets_for_item(&self, session_item_id: Uuid) -> AppResult<Vec<WorkoutSet>> {
        let rows = sqlx::query(
            "SELECT * FROM workout_sets WHERE session_item_id = ?1 ORDER BY set_index ASC",
        )
        .bind(session_item_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("list sets for item", &e))?;
        rows.iter().map(row_to_set).collect()
    }

    /// Append a set to a session item.
    ///
    /// The index is computed as `max + 1` inside the insert statement, so
    /// assignment is atomic in the store and concurrent appends cannot
    /// produce duplicate indexes. Indexes of deleted sets are never reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or readback fails.
    pub async fn add_set(
        &self,
        session_item_id: Uuid,
        reps: i64,
        weight_kg: f64,
        rpe: Option<f64>,
    ) -> AppResult<WorkoutSet> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO workout_sets
                (id, session_item_id, set_index, reps, weight_kg, rpe, created_at)
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(set_index), 0) + 1
                 FROM workout_sets WHERE session_item_id = ?2),
                ?3, ?4, ?5, ?6
            )
            ",
        )
        .bind(id.to_string())
        .bind(session_item_id.to_string())
        .bind(reps)
        .bind(weight_kg)
        .bind(rpe)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| db_err("add set", &e))?;

        let row = sqlx::query("SELECT * FROM workout_sets WHERE id = ?1")
            .bind(id.to_string())
            .fetch_one(self.pool())
            .await
            .map_err(|e| db_err("read back set", &e))?;
        row_to_set(&row)
    }

    /// Delete a set, enforcing ownership through its session chain.
    /// Remaining indexes are not renumbered.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_set(&self, user_id: Uuid, set_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM workout_sets
            WHERE id = ?1 AND session_item_id IN (
                SELECT si.id FROM session_items si
                JOIN workout_sessions ws ON ws.id = si.session_id
                WHERE ws.user_id = ?2
            )
            ",
        )
        .bind(set_id.to_string())
        .bind(user_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| db_err("delete set", &e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Set history over the user's most recent sessions, joined with plan
    /// titles, for personal-record computation.
    ///
    /// The session bound exists for query cost only; rows come back in
    /// chronological order so the fold's encounter order is deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_set_history(
        &self,
        user_id: Uuid,
        session_limit: u32,
    ) -> AppResult<Vec<SetHistoryRow>> {
        let rows = sqlx::query(
            r"
            SELECT si.exercise_id, si.variation_id,
                   wi.exercise_title, wi.variation_title,
                   s.reps, s.weight_kg
            FROM workout_sets s
            JOIN session_items si ON si.id = s.session_item_id
            JOIN workout_sessions ws ON ws.id = si.session_id
            LEFT JOIN workout_items wi ON wi.id = si.workout_item_id
            WHERE ws.id IN (
                SELECT id FROM workout_sessions
                WHERE user_id = ?1
                ORDER BY performed_on DESC
                LIMIT ?2
            )
            ORDER BY ws.performed_on ASC, s.created_at ASC, s.set_index ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(session_limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("get set history", &e))?;

        rows.iter()
            .map(|row| {
                Ok(SetHistoryRow {
                    exercise_id: row
                        .try_get("exercise_id")
                        .map_err(|e| db_err("read history exercise", &e))?,
                    variation_id: row
                        .try_get("variation_id")
                        .map_err(|e| db_err("read history variation", &e))?,
                    exercise_title: row
                        .try_get("exercise_title")
                        .map_err(|e| db_err("read history exercise title", &e))?,
                    variation_title: row
                        .try_get("variation_title")
                        .map_err(|e| db_err("read history variation title", &e))?,
                    reps: row
                        .try_get("reps")
                        .map_err(|e| db_err("read history reps", &e))?,
                    weight_kg: row
                        .try_get("weight_kg")
                        .map_err(|e| db_err("read history weight", &e))?,
                })
            })
            .collect()
    }
}
