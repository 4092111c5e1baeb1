// ABOUTME: Core data models for users, workout logging, meal scans and payments
// ABOUTME: Defines the entities persisted by the database module and consumed by intelligence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Data Models
//!
//! Core data structures shared across the server. Storage, intelligence and
//! routes all speak these types; nothing here touches the database directly.
//!
//! ## Core Models
//!
//! - `User` / `UserTier`: account identity and subscription level
//! - `WorkoutItem`: an exercise+variation in a user's persistent plan
//! - `WorkoutSession`: a user's single workout record for one UTC day
//! - `SessionItem`: one plan item attached to a specific day's session
//! - `WorkoutSet`: one logged reps+weight entry under a session item
//! - `ScanLog`: a meal photo scan with AI-derived macro estimate
//! - `PixPayment`: a PIX charge backing the subscription paywall

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::constants::limits;

/// Subscription tier gating feature limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    /// Free tier with a weekly meal-scan limit
    #[default]
    Free,
    /// Paid tier with unlimited meal scans
    Plus,
}

impl UserTier {
    /// Meal scans allowed per ISO week, `None` means unlimited
    #[must_use]
    pub const fn weekly_scan_limit(self) -> Option<u32> {
        match self {
            Self::Free => Some(limits::FREE_WEEKLY_SCANS),
            Self::Plus => None,
        }
    }

    /// Parse the stored column value, defaulting unknown values to free
    #[must_use]
    pub fn from_storage(value: &str) -> Self {
        match value {
            "plus" => Self::Plus,
            _ => Self::Free,
        }
    }

    /// Column value for storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
        }
    }
}

impl Display for UserTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across accounts
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Subscription tier
    pub tier: UserTier,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last request timestamp
    pub last_active: DateTime<Utc>,
    /// Whether the account can authenticate
    pub is_active: bool,
}

impl User {
    /// Create a new free-tier user
    #[must_use]
    pub fn new(email: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            tier: UserTier::Free,
            created_at: now,
            last_active: now,
            is_active: true,
        }
    }
}

/// Biometric profile captured during onboarding, one row per user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricProfile {
    pub user_id: Uuid,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Birth date, used for age-dependent plan generation
    pub birth_date: Option<NaiveDate>,
    /// Self-reported sex, free text
    pub sex: Option<String>,
    /// Self-reported activity level (sedentary, light, moderate, intense)
    pub activity_level: Option<String>,
    /// Stated goal (cut, maintain, bulk)
    pub goal: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// An exercise+variation in a user's persistent workout plan.
///
/// Titles are denormalized at insert time so historical display survives
/// catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutItem {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Muscle-group or split bucket the item belongs to
    pub group_id: Option<String>,
    pub exercise_id: String,
    pub variation_id: String,
    pub exercise_title: String,
    pub variation_title: String,
    pub created_at: DateTime<Utc>,
}

/// A user's single workout record for one UTC calendar day.
///
/// Unique per `(user_id, performed_on)`; re-marking the same day returns the
/// existing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub performed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// One plan item attached to a specific day's session.
///
/// `exercise_id`/`variation_id` are copied from the plan item at attach time
/// so set history keeps its grouping key even if the plan item is later
/// deleted; titles stay on the plan item and are joined at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItem {
    pub id: Uuid,
    pub session_id: Uuid,
    /// Referenced plan item; may dangle after plan edits
    pub workout_item_id: Option<Uuid>,
    pub exercise_id: String,
    pub variation_id: String,
    pub created_at: DateTime<Utc>,
}

/// One logged reps+weight entry under a session item.
///
/// `set_index` starts at 1 per session item, is assigned at insert as
/// `max + 1`, and is never reused after deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: Uuid,
    pub session_item_id: Uuid,
    pub set_index: i64,
    pub reps: i64,
    pub weight_kg: f64,
    /// Rate of perceived exertion, optional
    pub rpe: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A logged meal photo with AI-derived macro estimate.
///
/// `macro_data` carries the analyzer's structured JSON; aggregation reads
/// `macros.calories` from it and treats anything missing or non-numeric
/// as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub macro_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Macro-nutrient totals for one analyzed meal
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

/// Structured result of one meal-photo analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAnalysis {
    /// Short human-readable meal description
    pub title: String,
    /// Estimated macro totals
    pub macros: MacroTotals,
    /// Analyzer confidence in [0, 1] when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// An AI-generated diet plan, append-only; the newest row is current
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a PIX charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Expired,
    Failed,
}

impl PaymentStatus {
    /// Parse the stored column value
    #[must_use]
    pub fn from_storage(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            "expired" => Self::Expired,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Column value for storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A PIX charge created for the subscription upgrade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Charge identifier at the payment provider
    pub provider_charge_id: String,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    /// PIX QR code image payload, when the provider returned one
    pub qr_code: Option<String>,
    /// PIX copy-and-paste code
    pub copy_paste_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// One historical set joined with its exercise identity, the input row for
/// personal-record computation.
///
/// Titles come from a LEFT JOIN against the plan items and are `None` when
/// the plan item was deleted; display falls back to the raw id strings.
#[derive(Debug, Clone)]
pub struct SetHistoryRow {
    pub exercise_id: String,
    pub variation_id: String,
    pub exercise_title: Option<String>,
    pub variation_title: Option<String>,
    pub reps: i64,
    pub weight_kg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip() {
        assert_eq!(UserTier::from_storage("plus"), UserTier::Plus);
        assert_eq!(UserTier::from_storage("free"), UserTier::Free);
        assert_eq!(UserTier::from_storage("garbage"), UserTier::Free);
        assert_eq!(UserTier::Plus.as_str(), "plus");
    }

    #[test]
    fn test_free_tier_has_scan_limit() {
        assert_eq!(UserTier::Free.weekly_scan_limit(), Some(3));
        assert_eq!(UserTier::Plus.weekly_scan_limit(), None);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("ana@example.com".to_string(), None);
        assert_eq!(user.tier, UserTier::Free);
        assert!(user.is_active);
    }
}
