// ABOUTME: PIX payment routes: create a charge and poll its status
// ABOUTME: A pending payment that polls as paid upgrades the user to the plus tier once
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Subscription payment routes.
//!
//! The tier upgrade happens on the pending → paid transition only, so
//! re-polling an already-paid charge is a no-op.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{PaymentStatus, PixPayment, UserTier};

/// Payment routes
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// Create all payment routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/payments/pix", post(Self::handle_create))
            .route("/api/payments/:id", get(Self::handle_status))
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

    /// Handle creating a PIX charge for the configured plan price
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let amount_cents = resources.config.plan_price_cents;

        let charge = resources
            .payments
            .create_pix_charge(amount_cents, &user.email)
            .await?;

        let payment = PixPayment {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            provider_charge_id: charge.provider_charge_id,
            amount_cents,
            status: PaymentStatus::Pending,
            qr_code: charge.qr_code,
            copy_paste_code: charge.copy_paste_code,
            created_at: resources.clock.now(),
            paid_at: None,
        };
        resources.database.create_pix_payment(&payment).await?;
        info!(user_id = %user.user_id, payment_id = %payment.id, "PIX charge created");

        Ok((
            StatusCode::CREATED,
            Json(json!({"ok": true, "payment": payment})),
        )
            .into_response())
    }

    /// Handle polling a payment; persists a status transition and upgrades
    /// the tier when the charge settles
    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user = Self::authenticate(&headers, &resources).await?;
        let payment_id =
            Uuid::parse_str(&id).map_err(|_| AppError::invalid_id("payment id is not a uuid"))?;

        let mut payment = resources
            .database
            .get_pix_payment(user.user_id, payment_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment"))?;

        if payment.status == PaymentStatus::Pending {
            let provider_status = resources
                .payments
                .fetch_charge_status(&payment.provider_charge_id)
                .await?;
            if provider_status != payment.status {
                let paid_at = (provider_status == PaymentStatus::Paid)
                    .then(|| resources.clock.now());
                resources
                    .database
                    .update_payment_status(payment.id, provider_status, paid_at)
                    .await?;
                payment.status = provider_status;
                payment.paid_at = paid_at;

                if provider_status == PaymentStatus::Paid {
                    resources
                        .database
                        .update_user_tier(user.user_id, UserTier::Plus)
                        .await?;
                    info!(user_id = %user.user_id, payment_id = %payment.id, "upgraded to plus");
                }
            }
        }

        Ok((StatusCode::OK, Json(json!({"ok": true, "payment": payment}))).into_response())
    }
}
