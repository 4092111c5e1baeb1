// ABOUTME: Server binary wiring configuration, storage and external clients together
// ABOUTME: Production entry point for the Forma fitness and nutrition API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Forma API Server Binary
//!
//! Loads configuration from the environment, opens the database and serves
//! the HTTP API.

use anyhow::Result;
use clap::Parser;
use forma_server::{
    config::ServerConfig,
    constants::service_names,
    context::ServerResources,
    database::Database,
    external::{GeminiAnalyzer, MercadoPagoGateway},
    logging, server,
    utils::time::Clock,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "forma-server")]
#[command(about = "Forma - fitness and nutrition tracking API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    info!("Starting {}", service_names::FORMA_SERVER);
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("database initialized: {}", config.database_url);

    let config = Arc::new(config);
    let analyzer = Arc::new(GeminiAnalyzer::new(config.analyzer.clone()));
    let payments = Arc::new(MercadoPagoGateway::new(config.payments.clone()));

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        config,
        analyzer,
        payments,
        Clock::System,
    ));

    server::run(resources, port).await
}
