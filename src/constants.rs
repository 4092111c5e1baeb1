// ABOUTME: Application-wide constants for limits, defaults and environment variable names
// ABOUTME: Central place for tunable values shared across routes, storage and intelligence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Application constants
//!
//! Grouped by concern so call sites read as `limits::FREE_WEEKLY_SCANS`
//! rather than bare numbers scattered through the codebase.

/// Product limits and computation bounds
pub mod limits {
    /// Meal scans allowed per ISO week on the free tier
    pub const FREE_WEEKLY_SCANS: u32 = 3;

    /// Personal-record entries returned, ranked by estimated one-rep max
    pub const PR_TOP_K: usize = 8;

    /// Sessions of set history considered for personal records.
    /// Query-cost bound, not a product rule.
    pub const PR_SESSION_HISTORY: u32 = 60;

    /// Trailing window of activity loaded for streak computation.
    /// Caps the reportable streak; query-cost bound, not a product rule.
    pub const STREAK_LOOKBACK_DAYS: i64 = 365;

    /// Days covered by the week summary view (today inclusive)
    pub const WEEK_VIEW_DAYS: i64 = 7;

    /// Days covered by the month summary view (today inclusive)
    pub const MONTH_VIEW_DAYS: i64 = 30;

    /// Default page size for admin and history listings
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    /// Hard cap on requested page sizes
    pub const MAX_PAGE_SIZE: u32 = 200;
}

/// Server defaults applied when the environment leaves a value unset
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;

    /// Default SQLite database URL
    pub const DATABASE_URL: &str = "sqlite:./data/forma.db";

    /// Default subscription price in cents (BRL)
    pub const PLAN_PRICE_CENTS: i64 = 2990;

    /// Default Gemini model for meal analysis and diet plans
    pub const ANALYZER_MODEL: &str = "gemini-2.5-flash";

    /// Default base URL for the Gemini API
    pub const ANALYZER_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default base URL for the Mercado Pago API
    pub const PAYMENT_BASE_URL: &str = "https://api.mercadopago.com";
}

/// Environment variable names read by `ServerConfig::from_env`
pub mod env_names {
    pub const HTTP_PORT: &str = "FORMA_HTTP_PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const ADMIN_TOKEN: &str = "FORMA_ADMIN_TOKEN";
    pub const PLAN_PRICE_CENTS: &str = "FORMA_PLAN_PRICE_CENTS";
    pub const ANALYZER_API_KEY: &str = "GEMINI_API_KEY";
    pub const ANALYZER_MODEL: &str = "GEMINI_MODEL";
    pub const ANALYZER_BASE_URL: &str = "GEMINI_BASE_URL";
    pub const PAYMENT_ACCESS_TOKEN: &str = "MP_ACCESS_TOKEN";
    pub const PAYMENT_BASE_URL: &str = "MP_BASE_URL";
    pub const LOG_LEVEL: &str = "FORMA_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "FORMA_LOG_FORMAT";
}

/// Service identity used in logs
pub mod service_names {
    pub const FORMA_SERVER: &str = "forma-server";
}
