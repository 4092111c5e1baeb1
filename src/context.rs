// ABOUTME: Shared server state threaded through all route handlers
// ABOUTME: Bundles database, config, auth, clock and external capability clients
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Shared server resources.
//!
//! One `Arc<ServerResources>` is built at startup and handed to every route
//! group as axum state. Tests build the same struct with mock capabilities
//! and a pinned clock.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::external::{MealAnalyzer, PaymentGateway};
use crate::rate_limiting::WeeklyScanPolicy;
use crate::utils::time::Clock;

/// Everything a handler needs, shared across requests
pub struct ServerResources {
    pub database: Arc<Database>,
    pub config: Arc<ServerConfig>,
    pub auth: AuthManager,
    pub analyzer: Arc<dyn MealAnalyzer>,
    pub payments: Arc<dyn PaymentGateway>,
    pub clock: Clock,
    pub scan_policy: WeeklyScanPolicy,
}

impl ServerResources {
    /// Assemble server resources with proper Arc sharing
    #[must_use]
    pub fn new(
        database: Database,
        config: Arc<ServerConfig>,
        analyzer: Arc<dyn MealAnalyzer>,
        payments: Arc<dyn PaymentGateway>,
        clock: Clock,
    ) -> Self {
        let database = Arc::new(database);
        Self {
            auth: AuthManager::new(Arc::clone(&database), clock.clone()),
            database,
            config,
            analyzer,
            payments,
            clock,
            scan_policy: WeeklyScanPolicy::default(),
        }
    }
}
