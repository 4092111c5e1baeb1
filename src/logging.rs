// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log levels and output formats from environment variables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Production-ready logging configuration with structured output

use anyhow::Result;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::env_names;

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    fn from_env() -> Self {
        match env::var(env_names::LOG_FORMAT).as_deref() {
            Ok("json") => Self::Json,
            Ok("compact") => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Build the env filter, preferring `RUST_LOG`, then the service-level
/// variable, then `info`
fn build_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = env::var(env_names::LOG_LEVEL).unwrap_or_else(|_| "info".to_owned());
    EnvFilter::new(level)
}

/// Initialize logging from environment variables
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    let filter = build_filter();
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?,
    }

    Ok(())
}
