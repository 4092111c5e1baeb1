// ABOUTME: Meal scan routes: AI analysis with quota precondition, history and quota widget
// ABOUTME: The quota check is read-only; a failed analysis consumes nothing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Meal scan routes.
//!
//! The analysis endpoint evaluates the weekly quota before touching the
//! analyzer. A rejection is a structured business outcome, not an error:
//! HTTP 429 with `{"ok": false, "code": "LIMIT_REACHED", "usage": {...}}`
//! so the client can render an upgrade prompt.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::constants::limits;
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{ScanLog, UserTier};
use crate::rate_limiting::{QuotaDecision, ScanUsage, WeeklyScanPolicy};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    image_base64: String,
    #[serde(default = "default_mime")]
    mime_type: String,
}

fn default_mime() -> String {
    "image/jpeg".to_owned()
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

const fn default_limit() -> u32 {
    limits::DEFAULT_PAGE_SIZE
}

/// Meal scan routes
pub struct ScanRoutes;

impl ScanRoutes {
    /// Create all scan routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/scans/analyze", post(Self::handle_analyze))
            .route("/api/scans", get(Self::handle_history))
            .route("/api/scans/quota", get(Self::handle_quota))
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

    /// Evaluate the weekly quota for a user. Plus tier bypasses the count
    /// query entirely.
    async fn check_quota(
        resources: &Arc<ServerResources>,
        user: &AuthedUser,
    ) -> Result<QuotaDecision, AppError> {
        if user.tier == UserTier::Plus {
            return Ok(QuotaDecision::Unlimited);
        }
        let today = resources.clock.today();
        let (week_start, week_end) = WeeklyScanPolicy::week_bounds(today);
        let used = resources
            .database
            .count_scans_between(user.user_id, week_start, week_end)
            .await?;
        let used = u32::try_from(used).unwrap_or(u32::MAX);
        Ok(resources.scan_policy.evaluate(user.tier, used, today))
    }

    fn limit_reached_response(usage: &ScanUsage) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"ok": false, "code": "LIMIT_REACHED", "usage": usage})),
        )
            .into_response()
    }

    /// Handle a meal-photo analysis request
    async fn handle_analyze(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        body: Result<Json<AnalyzeRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;
        if request.image_base64.trim().is_empty() {
            return Err(AppError::invalid_body("imageBase64 must not be empty"));
        }

        if let QuotaDecision::LimitReached(usage) = Self::check_quota(&resources, &user).await? {
            return Ok(Self::limit_reached_response(&usage));
        }

        // Analyzer failure propagates here before anything is stored, so a
        // failed request never consumes quota.
        let analysis = resources
            .analyzer
            .analyze_meal_photo(&request.image_base64, &request.mime_type)
            .await?;

        let scan = ScanLog {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            macro_data: serde_json::to_value(&analysis)
                .map_err(|e| AppError::internal(format!("serialize analysis: {e}")))?,
            created_at: resources.clock.now(),
        };
        resources.database.create_scan_log(&scan).await?;

        Ok((StatusCode::CREATED, Json(json!({"ok": true, "scan": scan}))).into_response())
    }

    /// Handle the scan history listing
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(params): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let limit = params.limit.min(limits::MAX_PAGE_SIZE);
        let scans = resources
            .database
            .list_scan_logs(user.user_id, limit, params.offset)
            .await?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "scans": scans}))).into_response())
    }

    /// Handle the quota widget
    async fn handle_quota(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let body = match Self::check_quota(&resources, &user).await? {
            QuotaDecision::Unlimited => {
                json!({"ok": true, "tier": user.tier, "unlimited": true})
            }
            QuotaDecision::Allowed(usage) | QuotaDecision::LimitReached(usage) => {
                json!({"ok": true, "tier": user.tier, "unlimited": false, "usage": usage})
            }
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}
