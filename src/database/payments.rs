// ABOUTME: PIX payment storage and the aggregate finance summary for the admin surface
// ABOUTME: Status transitions are persisted on poll; totals are recomputed from rows
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{db_err, parse_uuid, Database};
use crate::errors::AppResult;
use crate::models::{PaymentStatus, PixPayment};

/// Aggregate payment figures for the admin finance view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub paid_count: i64,
    pub paid_total_cents: i64,
    pub pending_count: i64,
}

fn row_to_payment(row: &SqliteRow) -> AppResult<PixPayment> {
    let id: String = row
        .try_get("id")
        .map_err(|e| db_err("read payment id", &e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| db_err("read payment user", &e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| db_err("read payment status", &e))?;
    Ok(PixPayment {
        id: parse_uuid(&id, "payment")?,
        user_id: parse_uuid(&user_id, "payment.user")?,
        provider_charge_id: row
            .try_get("provider_charge_id")
            .map_err(|e| db_err("read payment charge id", &e))?,
        amount_cents: row
            .try_get("amount_cents")
            .map_err(|e| db_err("read payment amount", &e))?,
        status: PaymentStatus::from_storage(&status),
        qr_code: row
            .try_get("qr_code")
            .map_err(|e| db_err("read payment qr", &e))?,
        copy_paste_code: row
            .try_get("copy_paste_code")
            .map_err(|e| db_err("read payment code", &e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| db_err("read payment created_at", &e))?,
        paid_at: row
            .try_get("paid_at")
            .map_err(|e| db_err("read payment paid_at", &e))?,
    })
}

impl Database {
    /// Insert a new PIX payment record
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_pix_payment(&self, payment: &PixPayment) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO pix_payments
                (id, user_id, provider_charge_id, amount_cents, status,
                 qr_code, copy_paste_code, created_at, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(payment.id.to_string())
        .bind(payment.user_id.to_string())
        .bind(&payment.provider_charge_id)
        .bind(payment.amount_cents)
        .bind(payment.status.as_str())
        .bind(&payment.qr_code)
        .bind(&payment.copy_paste_code)
        .bind(payment.created_at)
        .bind(payment.paid_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_err("create payment", &e))?;
        Ok(())
    }

    /// Fetch a payment, enforcing ownership
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_pix_payment(
        &self,
        user_id: Uuid,
        payment_id: Uuid,
    ) -> AppResult<Option<PixPayment>> {
        let row = sqlx::query("SELECT * FROM pix_payments WHERE id = ?1 AND user_id = ?2")
            .bind(payment_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_err("get payment", &e))?;
        row.as_ref().map(row_to_payment).transpose()
    }

    /// Persist a payment status transition
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE pix_payments SET status = ?1, paid_at = ?2 WHERE id = ?3")
            .bind(status.as_str())
            .bind(paid_at)
            .bind(payment_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| db_err("update payment status", &e))?;
        Ok(())
    }

    /// Aggregate figures over all payments
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_finance_summary(&self) -> AppResult<FinanceSummary> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(CASE WHEN status = 'paid' THEN 1 END) AS paid_count,
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount_cents END), 0)
                    AS paid_total_cents,
                COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending_count
            FROM pix_payments
            ",
        )
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_err("finance summary", &e))?;
        Ok(FinanceSummary {
            paid_count: row
                .try_get("paid_count")
                .map_err(|e| db_err("read paid count", &e))?,
            paid_total_cents: row
                .try_get("paid_total_cents")
                .map_err(|e| db_err("read paid total", &e))?,
            pending_count: row
                .try_get("pending_count")
                .map_err(|e| db_err("read pending count", &e))?,
        })
    }
}
