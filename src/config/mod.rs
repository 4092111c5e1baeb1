// ABOUTME: Configuration module exports
// ABOUTME: Environment-driven server configuration lives in environment.rs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Environment-based configuration management
pub mod environment;

pub use environment::{AnalyzerConfig, PaymentGatewayConfig, ServerConfig};
