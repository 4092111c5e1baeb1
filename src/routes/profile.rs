// ABOUTME: Biometric profile capture and AI diet plan routes
// ABOUTME: Profile is upserted; diet plans are append-only with the newest as current
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Onboarding and diet plan routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{BiometricProfile, DietPlan};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    height_cm: f64,
    weight_kg: f64,
    #[serde(default)]
    birth_date: Option<NaiveDate>,
    #[serde(default)]
    sex: Option<String>,
    #[serde(default)]
    activity_level: Option<String>,
    #[serde(default)]
    goal: Option<String>,
}

/// Profile and diet plan routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .route(
                "/api/profile/diet-plan",
                get(Self::handle_get_plan).post(Self::handle_generate_plan),
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

    /// Handle reading the biometric profile
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let profile = resources.database.get_biometric_profile(user.user_id).await?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "profile": profile}))).into_response())
    }

    /// Handle upserting the biometric profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        body: Result<Json<UpdateProfileRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let Json(request) = body.map_err(|e| AppError::invalid_body(e.to_string()))?;

        if !request.height_cm.is_finite() || request.height_cm <= 0.0 {
            return Err(AppError::invalid_body("heightCm must be a positive number"));
        }
        if !request.weight_kg.is_finite() || request.weight_kg <= 0.0 {
            return Err(AppError::invalid_body("weightKg must be a positive number"));
        }

        let profile = BiometricProfile {
            user_id: user.user_id,
            height_cm: request.height_cm,
            weight_kg: request.weight_kg,
            birth_date: request.birth_date,
            sex: request.sex,
            activity_level: request.activity_level,
            goal: request.goal,
            updated_at: resources.clock.now(),
        };
        resources.database.upsert_biometric_profile(&profile).await?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "profile": profile}))).into_response())
    }

    /// Handle generating a new diet plan from the stored profile
    async fn handle_generate_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let profile = resources
            .database
            .get_biometric_profile(user.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("biometric profile"))?;

        let plan_data = resources.analyzer.generate_diet_plan(&profile).await?;
        let plan = DietPlan {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            plan_data,
            created_at: resources.clock.now(),
        };
        resources.database.create_diet_plan(&plan).await?;

        Ok((StatusCode::CREATED, Json(json!({"ok": true, "plan": plan}))).into_response())
    }

    /// Handle reading the current (most recent) diet plan
    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let plan = resources
            .database
            .get_latest_diet_plan(user.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("diet plan"))?;
        Ok((StatusCode::OK, Json(json!({"ok": true, "plan": plan}))).into_response())
    }
}
