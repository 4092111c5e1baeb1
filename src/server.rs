// ABOUTME: HTTP server assembly and lifecycle with graceful shutdown
// ABOUTME: Binds the router built from shared resources and serves until SIGINT
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! HTTP server lifecycle.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::context::ServerResources;
use crate::routes;

/// Serve the application until shutdown
///
/// # Errors
///
/// Returns an error if binding the listener or serving fails.
pub async fn run(resources: Arc<ServerResources>, port: u16) -> Result<()> {
    let router = routes::router(resources);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!("HTTP server listening on port {port}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    info!("shutdown signal received");
}
