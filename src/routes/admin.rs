// ABOUTME: Admin back-office routes: user listing, tier management, finance summary
// ABOUTME: Guarded by a constant-time comparison against the configured admin token
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Admin routes.
//!
//! These sit behind an `x-admin-token` header checked with a constant-time
//! comparison. With no token configured the whole surface rejects.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::constants::limits;
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::UserTier;

#[derive(Deserialize)]
struct ListUsersQuery {
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

const fn default_limit() -> u32 {
    limits::DEFAULT_PAGE_SIZE
}

#[derive(Deserialize)]
struct SetTierRequest {
    tier: String,
}

/// Admin routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route("/api/admin/users/:id/tier", put(Self::handle_set_tier))
            .route("/api/admin/finance", get(Self::handle_finance))
            .with_state(resources)
    }

    /// Verify the admin token header against configuration
    fn authorize(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<(), AppError> {
        let Some(expected) = resources.config.admin_token.as_deref() else {
            return Err(AppError::forbidden("admin surface disabled"));
        };
        let provided = headers
            .get("x-admin-token")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing admin token"))?;

        let matches = provided.len() == expected.len()
            && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()));
        if matches {
            Ok(())
        } else {
            Err(AppError::forbidden("invalid admin token"))
        }
    }

    /// Handle the paginated user listing
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(params): Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let limit = params.limit.min(limits::MAX_PAGE_SIZE);
        let users = resources.database.list_users(limit, params.offset).await?;
        let total = resources.database.count_users().await?;
        Ok((
            StatusCode::OK,
            Json(json!({"ok": true, "users": users, "total": total})),
        )
            .into_response())
    }

    /// Handle setting a user's subscription tier
    async fn handle_set_tier(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(id): Path<String>,
        body: Result<Json<SetTierRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;
        let user_id =
            Uuid::parse_str(&id).map_err(|_| AppError::invalid_id("user id is not a uuid"))?;
        let tier = match request.tier.as_str() {
            "free" => UserTier::Free,
            "plus" => UserTier::Plus,
            other => return Err(AppError::invalid_body(format!("unknown tier: {other}"))),
        };

        if resources.database.update_user_tier(user_id, tier).await? {
            Ok((StatusCode::OK, Json(json!({"ok": true}))).into_response())
        } else {
            Err(AppError::not_found("user"))
        }
    }

    /// Handle the finance summary
    async fn handle_finance(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authorize(&headers, &resources)?;
        let finance = resources.database.get_finance_summary().await?;
        Ok((
            StatusCode::OK,
            Json(json!({"ok": true, "finance": finance})),
        )
            .into_response())
    }
}
