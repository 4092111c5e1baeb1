// ABOUTME: External capability clients consumed behind traits
// ABOUTME: AI meal analyzer (Gemini) and PIX payment gateway (Mercado Pago)
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External collaborators.
//!
//! Both capabilities are opaque single round-trips with no retry or backoff
//! in this layer; a failure propagates immediately as an external-service
//! error. Traits keep handlers testable with mock implementations.

/// AI meal-photo analysis and diet plan generation
pub mod analyzer;
/// PIX charge creation and status polling
pub mod payments;

pub use analyzer::{GeminiAnalyzer, MealAnalyzer, MockAnalyzer};
pub use payments::{MercadoPagoGateway, MockGateway, PaymentGateway, PixCharge};
