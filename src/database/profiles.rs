// ABOUTME: Biometric profile upsert/read and append-only diet plan storage
// ABOUTME: One profile row per user; the newest diet plan row is the current plan
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{db_err, parse_uuid, Database};
use crate::errors::AppResult;
use crate::models::{BiometricProfile, DietPlan};

fn row_to_profile(row: &SqliteRow) -> AppResult<BiometricProfile> {
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read profile user", &e))?;
    Ok(BiometricProfile {
        user_id: parse_uuid(&user_id, "profile.user")?,
        height_cm: row
            .try_get("height_cm")
            .map_err(|e| db_err("read profile height", &e))?,
        weight_kg: row
            .try_get("weight_kg")
            .map_err(|e| db_err("read profile weight", &e))?,
        birth_date: row
            .try_get("birth_date")
            .map_err(|e| db_err("read profile birth date", &e))?,
        sex: row.try_get("sex").map_err(|e| db_err("read profile sex", &e))?,
        activity_level: row
            .try_get("activity_level")
            .map_err(|e| db_err("read profile activity", &e))?,
        goal: row
            .try_get("goal")
            .map_err(|e| db_err("read profile goal", &e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| db_err("read profile updated_at", &e))?,
    })
}

fn row_to_diet_plan(row: &SqliteRow) -> AppResult<DietPlan> {
    let id: String = row.try_get("id").map_err(|e| db_err("read plan id", &e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read plan user", &e))?;
    let plan_data: String = row
        .try_get("plan_data")
        .map_err(|e| db_err("read plan data", &e))?;
    Ok(DietPlan {
        id: parse_uuid(&id, "diet_plan")?,
        user_id: parse_uuid(&user_id, "diet_plan.user")?,
        plan_data: serde_json::from_str(&plan_data).unwrap_or(serde_json::Value::Null),
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read plan created_at", &e))?,
    })
}

impl Database {
    /// Insert or replace a user's biometric profile
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert_biometric_profile(&self, profile: &BiometricProfile) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO biometric_profiles
                (user_id, height_cm, weight_kg, birth_date, sex,
                 activity_level, goal, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (user_id) DO UPDATE SET
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                birth_date = excluded.birth_date,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                goal = excluded.goal,
                updated_at = excluded.updated_at
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.birth_date)
        .bind(&profile.sex)
        .bind(&profile.activity_level)
        .bind(&profile.goal)
        .bind(profile.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("upsert profile", &e))?;
        Ok(())
    }

    /// Fetch a user's biometric profile
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_biometric_profile(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<BiometricProfile>> {
        let row = sqlx::query("SELECT * FROM biometric_profiles WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_err("get profile", &e))?;
        row.as_ref().map(row_to_profile).transpose()
    }

    /// Append a generated diet plan
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_diet_plan(&self, plan: &DietPlan) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO diet_plans (id, user_id, plan_data, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(plan.plan_data.to_string())
        .bind(plan.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create diet plan", &e))?;
        Ok(())
    }

    /// The user's most recent diet plan, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_latest_diet_plan(&self, user_id: Uuid) -> AppResult<Option<DietPlan>> {
        let row = sqlx::query(
            r"
            SELECT * FROM diet_plans WHERE user_id = ?1
            ORDER BY created_at DESC LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_err("get latest diet plan", &e))?;
        row.as_ref().map(row_to_diet_plan).transpose()
    }
}
