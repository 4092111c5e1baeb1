// ABOUTME: PIX payment gateway client creating charges and polling their status
// ABOUTME: One provider (Mercado Pago) behind one trait; no retries in this layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Payment Gateway
//!
//! A single PIX capability: create a charge, poll its status. The concrete
//! client targets the Mercado Pago payments API; [`MockGateway`] stands in
//! for tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PaymentGatewayConfig;
use crate::errors::{AppError, AppResult};
use crate::models::PaymentStatus;

/// A freshly created PIX charge
#[derive(Debug, Clone)]
pub struct PixCharge {
    /// Charge identifier at the provider
    pub provider_charge_id: String,
    /// Base64 QR code image payload, when returned
    pub qr_code: Option<String>,
    /// PIX copy-and-paste code
    pub copy_paste_code: Option<String>,
}

/// Opaque PIX payment capability
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a PIX charge for the given amount
    async fn create_pix_charge(
        &self,
        amount_cents: i64,
        customer_email: &str,
    ) -> AppResult<PixCharge>;

    /// Current status of a charge at the provider
    async fn fetch_charge_status(&self, provider_charge_id: &str) -> AppResult<PaymentStatus>;
}

#[derive(Debug, Deserialize)]
struct MpPaymentResponse {
    /// Numeric in practice, but tolerated as a string too
    id: Value,
    status: Option<String>,
    point_of_interaction: Option<MpPointOfInteraction>,
}

impl MpPaymentResponse {
    fn charge_id(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MpPointOfInteraction {
    transaction_data: Option<MpTransactionData>,
}

#[derive(Debug, Deserialize)]
struct MpTransactionData {
    /// The copy-and-paste EMV string
    qr_code: Option<String>,
    /// Base64 PNG of the QR image
    qr_code_base64: Option<String>,
}

fn map_provider_status(status: Option<&str>) -> PaymentStatus {
    match status {
        Some("approved") => PaymentStatus::Paid,
        Some("cancelled" | "expired") => PaymentStatus::Expired,
        Some("rejected") => PaymentStatus::Failed,
        Some("pending" | "in_process" | "authorized") | None => PaymentStatus::Pending,
        Some(other) => {
            warn!(status = other, "unknown provider payment status, treating as pending");
            PaymentStatus::Pending
        }
    }
}

/// Mercado Pago PIX client
pub struct MercadoPagoGateway {
    client: Client,
    config: PaymentGatewayConfig,
}

impl MercadoPagoGateway {
    /// Create a gateway client from configuration
    #[must_use]
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn ensure_token(&self) -> AppResult<()> {
        if self.config.access_token.is_empty() {
            return Err(AppError::external_service(
                "mercadopago",
                "access token not configured",
            ));
        }
        Ok(())
    }

    async fn parse_payment(response: reqwest::Response) -> AppResult<MpPaymentResponse> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service("mercadopago", format!("read failed: {e}"))
        })?;
        if !status.is_success() {
            return Err(AppError::external_service(
                "mercadopago",
                format!("status {status}: {body}"),
            ));
        }
        serde_json::from_str(&body).map_err(|e| {
            AppError::external_service("mercadopago", format!("unparseable response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_pix_charge(
        &self,
        amount_cents: i64,
        customer_email: &str,
    ) -> AppResult<PixCharge> {
        self.ensure_token()?;

        #[allow(clippy::cast_precision_loss)] // plan prices are tiny integers
        let amount = amount_cents as f64 / 100.0;
        let request = json!({
            "transaction_amount": amount,
            "description": "Forma Plus subscription",
            "payment_method_id": "pix",
            "payer": {"email": customer_email}
        });

        debug!(amount_cents, "creating PIX charge");
        let response = self
            .client
            .post(format!("{}/v1/payments", self.config.base_url))
            .bearer_auth(&self.config.access_token)
            .header("X-Idempotency-Key", Uuid::new_v4().to_string())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::external_service("mercadopago", format!("request failed: {e}")))?;

        let payment = Self::parse_payment(response).await?;
        let provider_charge_id = payment.charge_id();
        let transaction = payment
            .point_of_interaction
            .and_then(|p| p.transaction_data);
        Ok(PixCharge {
            provider_charge_id,
            qr_code: transaction.as_ref().and_then(|t| t.qr_code_base64.clone()),
            copy_paste_code: transaction.and_then(|t| t.qr_code),
        })
    }

    async fn fetch_charge_status(&self, provider_charge_id: &str) -> AppResult<PaymentStatus> {
        self.ensure_token()?;

        let response = self
            .client
            .get(format!(
                "{}/v1/payments/{provider_charge_id}",
                self.config.base_url
            ))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| AppError::external_service("mercadopago", format!("request failed: {e}")))?;

        let payment = Self::parse_payment(response).await?;
        Ok(map_provider_status(payment.status.as_deref()))
    }
}

/// Scripted gateway for tests
pub struct MockGateway {
    /// Status returned by every poll
    pub status: PaymentStatus,
    /// When set, every call fails with an external error instead
    pub fail: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            status: PaymentStatus::Pending,
            fail: false,
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_pix_charge(
        &self,
        _amount_cents: i64,
        _customer_email: &str,
    ) -> AppResult<PixCharge> {
        if self.fail {
            return Err(AppError::external_service("mock", "charge creation failed"));
        }
        Ok(PixCharge {
            provider_charge_id: format!("mock-{}", Uuid::new_v4()),
            qr_code: Some("iVBORw0KGgo=".to_owned()),
            copy_paste_code: Some("00020126580014BR.GOV.BCB.PIX".to_owned()),
        })
    }

    async fn fetch_charge_status(&self, _provider_charge_id: &str) -> AppResult<PaymentStatus> {
        if self.fail {
            return Err(AppError::external_service("mock", "status fetch failed"));
        }
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_mapping() {
        assert_eq!(map_provider_status(Some("approved")), PaymentStatus::Paid);
        assert_eq!(map_provider_status(Some("pending")), PaymentStatus::Pending);
        assert_eq!(map_provider_status(Some("rejected")), PaymentStatus::Failed);
        assert_eq!(map_provider_status(Some("expired")), PaymentStatus::Expired);
        assert_eq!(map_provider_status(Some("weird")), PaymentStatus::Pending);
        assert_eq!(map_provider_status(None), PaymentStatus::Pending);
    }
}
