// ABOUTME: Meal scan log storage, append-only with timestamp-range queries
// ABOUTME: Weekly quota usage is a count over these rows, never a persisted counter
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{db_err, parse_uuid, Database};
use crate::errors::AppResult;
use crate::models::ScanLog;

fn row_to_scan(row: &SqliteRow) -> AppResult<ScanLog> {
    let id: String = row.try_get("id").map_err(|e| db_err("read scan id", &e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read scan user", &e))?;
    let macro_data: String = row
        .try_get("macro_data")
        .map_err(|e| db_err("read scan macros", &e))?;
    Ok(ScanLog {
        id: parse_uuid(&id, "scan")?,
        user_id: parse_uuid(&user_id, "scan.user")?,
        macro_data: serde_json::from_str(&macro_data).unwrap_or(serde_json::Value::Null),
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read scan created_at", &e))?,
    })
}

impl Database {
    /// Append a scan log
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_scan_log(&self, scan: &ScanLog) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO scan_logs (id, user_id, macro_data, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(scan.id.to_string())
        .bind(scan.user_id.to_string())
        .bind(scan.macro_data.to_string())
        .bind(scan.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create scan log", &e))?;
        Ok(())
    }

    /// Scans with `created_at` in the half-open range `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_scans_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<ScanLog>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM scan_logs
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("get scans between", &e))?;
        rows.iter().map(row_to_scan).collect()
    }

    /// Count of scans in the half-open range `[start, end)`, the weekly
    /// quota read
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_scans_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM scan_logs
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_err("count scans", &e))
    }

    /// Scan timestamps on or after `since`, for streak computation
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_scan_times_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        let rows = sqlx::query(
            "SELECT created_at FROM scan_logs WHERE user_id = ?1 AND created_at >= ?2",
        )
        .bind(user_id.to_string())
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("get scan times", &e))?;
        rows.iter()
            .map(|row| {
                row.try_get("created_at")
                    .map_err(|e| db_err("read scan time", &e))
            })
            .collect()
    }

    /// A user's scan history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_scan_logs(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<ScanLog>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM scan_logs WHERE user_id = ?1
            ORDER BY created_at DESC LIMIT ?2 OFFSET ?3
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_err("list scan logs", &e))?;
        rows.iter().map(row_to_scan).collect()
    }
}
