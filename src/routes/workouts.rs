// ABOUTME: Workout route handlers: summaries, streaks, PRs, plan items, sessions and sets
// ABOUTME: Handlers fetch raw rows and delegate all derived numbers to the intelligence module
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Workout routes.
//!
//! Every read recomputes from raw rows at request time; "today" is taken
//! from the shared clock once per request so all day math inside one
//! request agrees.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Days;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::constants::limits;
use crate::context::ServerResources;
use crate::database::workouts::SessionItemDetail;
use crate::errors::AppError;
use crate::intelligence::{
    compute_prs, compute_streak, summarize_range, summarize_today, StreakReport, TodayStats,
};
use crate::models::{WorkoutItem, WorkoutSet};
use crate::utils::time::range_bounds;

/// Display label for session items whose plan reference was deleted
const UNKNOWN_EXERCISE: &str = "unknown exercise";

#[derive(Deserialize)]
struct SummaryQuery {
    #[serde(default = "default_range")]
    range: String,
}

fn default_range() -> String {
    "week".to_owned()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSetRequest {
    session_item_id: String,
    reps: i64,
    weight_kg: f64,
    #[serde(default)]
    rpe: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachItemRequest {
    workout_item_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePlanItemRequest {
    #[serde(default)]
    group_id: Option<String>,
    exercise_id: String,
    variation_id: String,
    exercise_title: String,
    variation_title: String,
}

#[derive(Serialize)]
struct StreakResponse {
    ok: bool,
    #[serde(flatten)]
    report: StreakReport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionItemView {
    id: Uuid,
    exercise_id: String,
    variation_id: String,
    exercise: String,
    variation: String,
    sets: Vec<WorkoutSet>,
}

/// Workout routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all workout routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/workouts/today", get(Self::handle_today_summary))
            .route("/api/workouts/summary", get(Self::handle_ranged_summary))
            .route("/api/workouts/streak", get(Self::handle_streak))
            .route("/api/workouts/prs", get(Self::handle_prs))
            .route(
                "/api/workouts/session/today",
                get(Self::handle_get_today_session).post(Self::handle_mark_today),
            )
            .route(
                "/api/workouts/session/items",
                post(Self::handle_attach_item),
            )
            .route("/api/workouts/sets", post(Self::handle_add_set))
            .route("/api/workouts/sets/:id", delete(Self::handle_delete_set))
            .route(
                "/api/workouts/plan/items",
                get(Self::handle_list_plan_items).post(Self::handle_create_plan_item),
            )
            .route(
                "/api/workouts/plan/items/:id",
                delete(Self::handle_delete_plan_item),
            )
            .with_state(resources)
    }

    /// Extract and authenticate the user from the authorization header
    async fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthedUser, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.resolve_bearer(auth_header).await
    }

    /// Handle the lightweight today widget
    async fn handle_today_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let today = resources.clock.today();

        let session = resources.database.get_session_on(user.user_id, today).await?;
        let (has_workout, stats) = match session {
            Some(session) => {
                let items = resources
                    .database
                    .list_session_items_for_sessions(&[session.id])
                    .await?;
                let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
                let sets = resources.database.list_sets_for_items(&item_ids).await?;
                (true, summarize_today(&items, &sets))
            }
            None => (
                false,
                TodayStats {
                    exercises: 0,
                    sets: 0,
                    volume_kg: 0.0,
                },
            ),
        };

        Ok((
            StatusCode::OK,
            Json(json!({"ok": true, "hasWorkout": has_workout, "stats": stats})),
        )
            .into_response())
    }

    /// Handle the zero-filled ranged summary for the week or month view
    async fn handle_ranged_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(params): Query<SummaryQuery>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let today = resources.clock.today();

        let span_days = match params.range.as_str() {
            "month" => limits::MONTH_VIEW_DAYS,
            "week" => limits::WEEK_VIEW_DAYS,
            other => {
                return Err(AppError::invalid_body(format!("unknown range: {other}")));
            }
        };
        #[allow(clippy::cast_sign_loss)] // span constants are positive
        let start = today
            .checked_sub_days(Days::new(span_days as u64 - 1))
            .ok_or_else(|| AppError::internal("date underflow"))?;

        // Sequential fetches: items need session ids, sets need item ids.
        let sessions = resources
            .database
            .get_sessions_in_range(user.user_id, start, today)
            .await?;
        let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        let items = resources
            .database
            .list_session_items_for_sessions(&session_ids)
            .await?;
        let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let sets = resources.database.list_sets_for_items(&item_ids).await?;
        let (range_start, range_end) = range_bounds(start, today);
        let scans = resources
            .database
            .get_scans_between(user.user_id, range_start, range_end)
            .await?;

        let days = summarize_range(start, today, &sessions, &items, &sets, &scans);
        Ok((
            StatusCode::OK,
            Json(json!({"ok": true, "start": start, "today": today, "days": days})),
        )
            .into_response())
    }

    /// Handle the streak report
    async fn handle_streak(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let today = resources.clock.today();

        #[allow(clippy::cast_sign_loss)] // lookback constant is positive
        let since = today
            .checked_sub_days(Days::new(limits::STREAK_LOOKBACK_DAYS as u64))
            .ok_or_else(|| AppError::internal("date underflow"))?;

        let workout_days: HashSet<_> = resources
            .database
            .get_session_days_since(user.user_id, since)
            .await?
            .into_iter()
            .collect();
        let scan_days: HashSet<_> = resources
            .database
            .get_scan_times_since(user.user_id, crate::utils::time::day_start(since))
            .await?
            .into_iter()
            .map(|ts| ts.date_naive())
            .collect();

        let report = compute_streak(today, &workout_days, &scan_days);
        Ok((StatusCode::OK, Json(StreakResponse { ok: true, report })).into_response())
    }

    /// Handle the personal-record leaderboard
    async fn handle_prs(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let history = resources
            .database
            .get_set_history(user.user_id, limits::PR_SESSION_HISTORY)
            .await?;
        let prs = compute_prs(&history);
        Ok((StatusCode::OK, Json(json!({"ok": true, "prs": prs}))).into_response())
    }

    /// Handle marking today's workout; returns the existing session when
    /// already marked
    async fn handle_mark_today(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let today = resources.clock.today();
        let session = resources
            .database
            .get_or_create_session(user.user_id, today)
            .await?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "session": session}))).into_response())
    }

    /// Handle reading today's session with items (newest first) and sets
    /// (by index)
    async fn handle_get_today_session(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let today = resources.clock.today();

        let Some(session) = resources.database.get_session_on(user.user_id, today).await? else {
            return Ok(
                (StatusCode::OK, Json(json!({"ok": true, "session": null}))).into_response()
            );
        };

        let details = resources
            .database
            .list_session_item_details(session.id)
            .await?;
        let mut items = Vec::with_capacity(details.len());
        for detail in details {
            let sets = resources.database.list_sets_for_item(detail.item.id).await?;
            items.push(Self::item_view(detail, sets));
        }

        Ok((
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "session": {
                    "id": session.id,
                    "performedOn": session.performed_on,
                    "items": items,
                }
            })),
        )
            .into_response())
    }

    fn item_view(detail: SessionItemDetail, sets: Vec<WorkoutSet>) -> SessionItemView {
        SessionItemView {
            id: detail.item.id,
            exercise_id: detail.item.exercise_id.clone(),
            variation_id: detail.item.variation_id.clone(),
            exercise: detail
                .exercise_title
                .unwrap_or_else(|| UNKNOWN_EXERCISE.to_owned()),
            variation: detail
                .variation_title
                .unwrap_or_else(|| UNKNOWN_EXERCISE.to_owned()),
            sets,
        }
    }

    /// Handle attaching a plan item to today's session, creating the
    /// session lazily
    async fn handle_attach_item(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        body: Result<Json<AttachItemRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;
        let item_id = Uuid::parse_str(&request.workout_item_id)
            .map_err(|_| AppError::invalid_body("workoutItemId is not a uuid"))?;

        let plan_item = resources
            .database
            .get_workout_item(user.user_id, item_id)
            .await?
            .ok_or_else(|| AppError::not_found("workout item"))?;

        let today = resources.clock.today();
        let session = resources
            .database
            .get_or_create_session(user.user_id, today)
            .await?;
        let item = resources
            .database
            .create_session_item(session.id, &plan_item)
            .await?;

        Ok((StatusCode::CREATED, Json(json!({"ok": true, "item": item}))).into_response())
    }

    /// Handle logging one set under a session item
    async fn handle_add_set(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        body: Result<Json<AddSetRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;

        if request.reps <= 0 {
            return Err(AppError::invalid_body("reps must be a positive integer"));
        }
        if !request.weight_kg.is_finite() || request.weight_kg < 0.0 {
            return Err(AppError::invalid_body("weightKg must be a non-negative number"));
        }
        if let Some(rpe) = request.rpe {
            if !rpe.is_finite() {
                return Err(AppError::invalid_body("rpe must be a number"));
            }
        }
        let item_id = Uuid::parse_str(&request.session_item_id)
            .map_err(|_| AppError::invalid_body("sessionItemId is not a uuid"))?;

        resources
            .database
            .get_owned_session_item(user.user_id, item_id)
            .await?
            .ok_or_else(|| AppError::not_found("session item"))?;

        let set = resources
            .database
            .add_set(item_id, request.reps, request.weight_kg, request.rpe)
            .await?;
        Ok((StatusCode::CREATED, Json(json!({"ok": true, "set": set}))).into_response())
    }

    /// Handle deleting one set
    async fn handle_delete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let set_id =
            Uuid::parse_str(&id).map_err(|_| AppError::invalid_id("set id is not a uuid"))?;

        if resources.database.delete_set(user.user_id, set_id).await? {
            Ok((StatusCode::OK, Json(json!({"ok": true}))).into_response())
        } else {
            Err(AppError::not_found("set"))
        }
    }

    /// Handle listing the persistent plan
    async fn handle_list_plan_items(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let items = resources.database.list_workout_items(user.user_id).await?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "items": items}))).into_response())
    }

    /// Handle adding an exercise+variation to the persistent plan
    async fn handle_create_plan_item(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        body: Result<Json<CreatePlanItemRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;
        for (field, value) in [
            ("exerciseId", &request.exercise_id),
            ("variationId", &request.variation_id),
            ("exerciseTitle", &request.exercise_title),
            ("variationTitle", &request.variation_title),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::invalid_body(format!("{field} must not be empty")));
            }
        }

        let item = WorkoutItem {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            group_id: request.group_id,
            exercise_id: request.exercise_id,
            variation_id: request.variation_id,
            exercise_title: request.exercise_title,
            variation_title: request.variation_title,
            created_at: resources.clock.now(),
        };
        resources.database.create_workout_item(&item).await?;
        Ok((StatusCode::CREATED, Json(json!({"ok": true, "item": item}))).into_response())
    }

    /// Handle removing a plan item; past session items keep their history
    async fn handle_delete_plan_item(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let item_id = Uuid::parse_str(&id)
            .map_err(|_| AppError::invalid_id("workout item id is not a uuid"))?;

        if resources
            .database
            .delete_workout_item(user.user_id, item_id)
            .await?
        {
            Ok((StatusCode::OK, Json(json!({"ok": true}))).into_response())
        } else {
            Err(AppError::not_found("workout item"))
        }
    }
}
