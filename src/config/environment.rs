// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed config with sensible defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management
//!
//! All runtime configuration comes from environment variables; there is no
//! config file. Unset values fall back to the defaults in
//! [`crate::constants::defaults`].

use anyhow::{Context, Result};
use std::env;
use tracing::warn;

use crate::constants::{defaults, env_names};

/// Configuration for the AI meal analyzer (Gemini)
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// API key; requests fail with an external error when empty
    pub api_key: String,
    /// Base URL, overridable for tests and proxies
    pub base_url: String,
    /// Model identifier
    pub model: String,
}

/// Configuration for the PIX payment gateway (Mercado Pago)
#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    /// Access token; requests fail with an external error when empty
    pub access_token: String,
    /// Base URL, overridable for tests
    pub base_url: String,
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Shared secret guarding the admin surface; admin routes reject
    /// everything when unset
    pub admin_token: Option<String>,
    /// Subscription price in cents charged per PIX payment
    pub plan_price_cents: i64,
    /// AI analyzer settings
    pub analyzer: AnalyzerConfig,
    /// Payment gateway settings
    pub payments: PaymentGatewayConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse (port, price).
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(env_names::HTTP_PORT) {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid {}: {raw}", env_names::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let plan_price_cents = match env::var(env_names::PLAN_PRICE_CENTS) {
            Ok(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("invalid {}: {raw}", env_names::PLAN_PRICE_CENTS))?,
            Err(_) => defaults::PLAN_PRICE_CENTS,
        };

        let admin_token = env::var(env_names::ADMIN_TOKEN).ok().filter(|t| !t.is_empty());
        if admin_token.is_none() {
            warn!(
                "{} not set, admin routes will reject all requests",
                env_names::ADMIN_TOKEN
            );
        }

        let analyzer = AnalyzerConfig {
            api_key: env::var(env_names::ANALYZER_API_KEY).unwrap_or_default(),
            base_url: env::var(env_names::ANALYZER_BASE_URL)
                .unwrap_or_else(|_| defaults::ANALYZER_BASE_URL.to_owned()),
            model: env::var(env_names::ANALYZER_MODEL)
                .unwrap_or_else(|_| defaults::ANALYZER_MODEL.to_owned()),
        };
        if analyzer.api_key.is_empty() {
            warn!(
                "{} not set, meal analysis and diet plans will fail",
                env_names::ANALYZER_API_KEY
            );
        }

        let payments = PaymentGatewayConfig {
            access_token: env::var(env_names::PAYMENT_ACCESS_TOKEN).unwrap_or_default(),
            base_url: env::var(env_names::PAYMENT_BASE_URL)
                .unwrap_or_else(|_| defaults::PAYMENT_BASE_URL.to_owned()),
        };
        if payments.access_token.is_empty() {
            warn!(
                "{} not set, PIX payments will fail",
                env_names::PAYMENT_ACCESS_TOKEN
            );
        }

        Ok(Self {
            http_port,
            database_url: env::var(env_names::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned()),
            admin_token,
            plan_price_cents,
            analyzer,
            payments,
        })
    }

    /// One-line startup summary, secrets elided
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} admin_token={} analyzer_model={} plan_price_cents={}",
            self.http_port,
            self.database_url,
            if self.admin_token.is_some() { "set" } else { "unset" },
            self.analyzer.model,
            self.plan_price_cents,
        )
    }
}
