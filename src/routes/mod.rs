// ABOUTME: Route group assembly into the application router
// ABOUTME: Each feature area contributes a Router; layers add tracing and CORS
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! HTTP routes grouped by feature area.
//!
//! Every group is a unit struct with a
//! `routes(Arc<ServerResources>) -> Router` constructor. The user-facing
//! groups authenticate, fetch raw rows, run the pure computations and
//! serialize the `{ok: true, ...}` envelope; the health group only probes
//! process and store liveness.

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::ServerResources;

/// Admin back-office: user listing, tier management, finance summary
pub mod admin;
/// Liveness and readiness probes
pub mod health;
/// PIX payment creation and status polling
pub mod payments;
/// Biometric profile and diet plan endpoints
pub mod profile;
/// Meal scan analysis, history and quota
pub mod scans;
/// Workout logging, summaries, streaks and personal records
pub mod workouts;

/// Build the complete application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes(Arc::clone(&resources)))
        .merge(workouts::WorkoutRoutes::routes(Arc::clone(&resources)))
        .merge(scans::ScanRoutes::routes(Arc::clone(&resources)))
        .merge(profile::ProfileRoutes::routes(Arc::clone(&resources)))
        .merge(payments::PaymentRoutes::routes(Arc::clone(&resources)))
        .merge(admin::AdminRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
