// ABOUTME: Utility module exports for shared helpers
// ABOUTME: Currently hosts the canonical UTC date/time helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Canonical UTC day handling shared by aggregation, streaks and quota
pub mod time;
