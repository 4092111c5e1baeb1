// ABOUTME: Main library entry point for the Forma fitness and nutrition API
// ABOUTME: Wires routes, storage, intelligence and external capabilities into one crate
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Forma Server
//!
//! A consumer fitness and nutrition tracking API. Users capture a biometric
//! profile, log workout sets, scan meal photos for AI macro estimation, and
//! unlock unlimited scanning through a PIX-backed subscription.
//!
//! ## Architecture
//!
//! - **Routes**: Axum HTTP handlers returning JSON payloads
//! - **Database**: SQLite-backed storage for all user activity
//! - **Intelligence**: Pure computations over raw rows (daily summaries,
//!   streaks, personal records) recomputed on every read
//! - **External**: Opaque AI meal analyzer and PIX payment gateway clients
//!
//! Every derived number is recomputed from raw rows at request time; there
//! are no materialized aggregates and no background workers.

/// Bearer session resolution for authenticated requests
pub mod auth;

/// Configuration management from environment variables
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Shared server state passed to all route handlers
pub mod context;

/// SQLite storage for users, workouts, scans and payments
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External capabilities: AI meal analyzer and PIX payment gateway
pub mod external;

/// Derived-state computation over raw activity rows
pub mod intelligence;

/// Production logging and structured output
pub mod logging;

/// Common data models for users and workout/nutrition records
pub mod models;

/// Weekly meal-scan quota enforcement per subscription tier
pub mod rate_limiting;

/// HTTP route handlers grouped by feature area
pub mod routes;

/// HTTP server assembly and lifecycle
pub mod server;

/// Utility functions and helpers
pub mod utils;
