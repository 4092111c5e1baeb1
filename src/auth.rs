// ABOUTME: Bearer session resolution mapping Authorization headers to authenticated users
// ABOUTME: Session issuance is external; this layer only reads provisioned session rows
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authentication boundary.
//!
//! Session issuance (registration, login, token minting) belongs to an
//! external auth service; this module is the resolution side only. Handlers
//! hand in the `Authorization` header and get back the authenticated
//! user's id and tier, or an unauthorized error that short-circuits before
//! any domain logic runs.

use std::sync::Arc;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::UserTier;
use crate::utils::time::Clock;

/// The resolved caller of an authenticated request
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: Uuid,
    pub email: String,
    pub tier: UserTier,
}

/// Resolves bearer tokens against provisioned session rows
#[derive(Clone)]
pub struct AuthManager {
    database: Arc<Database>,
    clock: Clock,
}

impl AuthManager {
    /// Create a new auth manager
    #[must_use]
    pub fn new(database: Arc<Database>, clock: Clock) -> Self {
        Self { database, clock }
    }

    /// Resolve an `Authorization: Bearer <token>` header to its user.
    ///
    /// # Errors
    ///
    /// Returns `unauthorized` when the header is missing or malformed, the
    /// token is unknown or expired, or the account is inactive. Store
    /// failures propagate as `db_error`.
    pub async fn resolve_bearer(&self, auth_header: Option<&str>) -> AppResult<AuthedUser> {
        let header = auth_header.ok_or_else(|| {
            AppError::unauthorized("Missing authorization header")
        })?;
        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Malformed authorization header"))?;

        let now = self.clock.now();
        let user = self
            .database
            .get_session_user(token, now)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired session"))?;

        // Activity tracking is best effort; an update failure must not fail
        // the request it is decorating.
        if let Err(e) = self.database.touch_last_active(user.id, now).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to update last_active");
        }

        Ok(AuthedUser {
            user_id: user.id,
            email: user.email,
            tier: user.tier,
        })
    }
}
