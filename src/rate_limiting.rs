// ABOUTME: Weekly meal-scan quota enforcement per subscription tier
// ABOUTME: Usage is re-derived from scan log counts on every check; nothing is reserved
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Weekly Scan Quota
//!
//! Free-tier users get a fixed number of meal scans per ISO week; plus-tier
//! users bypass the count entirely. The week runs from Monday 00:00 UTC
//! inclusive to the next Monday exclusive, and `weekId` is the ISO date of
//! that Monday, used both for display and as an idempotent bucket key.
//!
//! The check is read-only. A request that fails after passing the gate
//! consumes nothing, since usage is recounted from stored scan logs on the
//! next check. A concurrent burst can race past the limit; accepted.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::models::UserTier;
use crate::utils::time::{day_start, week_start};

/// Current-week usage attached to quota decisions and rejections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanUsage {
    /// ISO date of the Monday beginning the current week
    pub week_id: String,
    pub used: u32,
    pub limit: u32,
}

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Plus tier, no counting performed
    Unlimited,
    /// Free tier with remaining quota
    Allowed(ScanUsage),
    /// Free tier at or over the limit
    LimitReached(ScanUsage),
}

impl QuotaDecision {
    /// Whether the scan may proceed
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Unlimited | Self::Allowed(_))
    }
}

/// Weekly scan quota policy
#[derive(Debug, Clone, Copy)]
pub struct WeeklyScanPolicy {
    limit: u32,
}

impl WeeklyScanPolicy {
    /// Policy with an explicit weekly limit
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self { limit }
    }

    /// Half-open timestamp bounds of the week containing `today`:
    /// `[Monday 00:00, next Monday 00:00)`
    #[must_use]
    pub fn week_bounds(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let monday = week_start(today);
        let next_monday = monday.checked_add_days(Days::new(7)).unwrap_or(monday);
        (day_start(monday), day_start(next_monday))
    }

    /// The week bucket key for `today`
    #[must_use]
    pub fn week_id(today: NaiveDate) -> String {
        week_start(today).format("%Y-%m-%d").to_string()
    }

    /// Decide whether a new scan is permitted.
    ///
    /// `used` is the caller-supplied count of scans already logged in the
    /// current week; plus-tier callers skip the count and pass nothing.
    #[must_use]
    pub fn evaluate(&self, tier: UserTier, used: u32, today: NaiveDate) -> QuotaDecision {
        if tier.weekly_scan_limit().is_none() {
            return QuotaDecision::Unlimited;
        }
        let usage = ScanUsage {
            week_id: Self::week_id(today),
            used,
            limit: self.limit,
        };
        if used >= self.limit {
            QuotaDecision::LimitReached(usage)
        } else {
            QuotaDecision::Allowed(usage)
        }
    }
}

impl Default for WeeklyScanPolicy {
    fn default() -> Self {
        Self::new(limits::FREE_WEEKLY_SCANS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_week_id_is_monday_of_week() {
        // 2026-08-03 is a Monday
        assert_eq!(WeeklyScanPolicy::week_id(d("2026-08-03")), "2026-08-03");
        assert_eq!(WeeklyScanPolicy::week_id(d("2026-08-06")), "2026-08-03");
        assert_eq!(WeeklyScanPolicy::week_id(d("2026-08-09")), "2026-08-03");
    }

    #[test]
    fn test_week_bounds_are_monday_to_monday() {
        let (start, end) = WeeklyScanPolicy::week_bounds(d("2026-08-05"));
        assert_eq!(start.to_rfc3339(), "2026-08-03T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-08-10T00:00:00+00:00");
    }

    #[test]
    fn test_free_tier_blocked_at_limit() {
        let policy = WeeklyScanPolicy::default();
        let today = d("2026-08-04");
        assert!(policy.evaluate(UserTier::Free, 0, today).is_allowed());
        assert!(policy.evaluate(UserTier::Free, 2, today).is_allowed());
        let decision = policy.evaluate(UserTier::Free, 3, today);
        assert!(!decision.is_allowed());
        match decision {
            QuotaDecision::LimitReached(usage) => {
                assert_eq!(usage.week_id, "2026-08-03");
                assert_eq!(usage.used, 3);
                assert_eq!(usage.limit, 3);
            }
            other => panic!("expected LimitReached, got {other:?}"),
        }
    }

    #[test]
    fn test_plus_tier_bypasses_counting() {
        let policy = WeeklyScanPolicy::default();
        assert_eq!(
            policy.evaluate(UserTier::Plus, 999, d("2026-08-04")),
            QuotaDecision::Unlimited
        );
    }

    #[test]
    fn test_usage_serializes_with_camel_case_week_id() {
        let usage = ScanUsage {
            week_id: "2026-08-03".to_owned(),
            used: 1,
            limit: 3,
        };
        let json = serde_json::to_string(&usage).unwrap();
        assert!(json.contains(r#""weekId":"2026-08-03""#));
    }
}
