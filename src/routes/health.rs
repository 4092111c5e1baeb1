// ABOUTME: Liveness and readiness probes for monitoring infrastructure
// ABOUTME: Readiness runs a query against the store; a dead pool answers 503
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Health check routes.
//!
//! `/health` reports that the process is up; `/ready` additionally proves
//! the database answers queries, so load balancers stop routing to an
//! instance whose store is gone.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::constants::service_names;
use crate::context::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    /// Liveness: the process is up and serving requests
    async fn handle_health(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        Json(json!({
            "service": service_names::FORMA_SERVER,
            "status": "healthy",
            "timestamp": resources.clock.now().to_rfc3339(),
        }))
    }

    /// Readiness: the store answers queries
    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Response {
        let timestamp = resources.clock.now().to_rfc3339();
        match resources.database.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({
                    "service": service_names::FORMA_SERVER,
                    "status": "ready",
                    "timestamp": timestamp,
                })),
            )
                .into_response(),
            Err(e) => {
                tracing::warn!(error = %e, "readiness probe failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "service": service_names::FORMA_SERVER,
                        "status": "unavailable",
                        "timestamp": timestamp,
                    })),
                )
                    .into_response()
            }
        }
    }
}
