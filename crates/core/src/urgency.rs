//! Overdue classification for unreturned keys.
//!
//! A key held past 24 hours escalates through `overdue`, `high`, and
//! `critical` tiers. Elapsed time is measured from the moment the request
//! was filed (`requested_at`), i.e. total custody time, which is the
//! behavior the admin dashboards depend on.
//!
//! Classification applies only to approved requests with no return awaiting
//! approval; a request whose return is pending sign-off is the
//! administrator's to act on, not the holder's.

use serde::Serialize;

use crate::status::{RequestStatus, ReturnStatus};
use crate::types::Timestamp;

/// A key becomes overdue after this many hours.
pub const OVERDUE_AFTER_HOURS: i64 = 24;

/// An overdue key escalates to high urgency after this many hours.
pub const HIGH_AFTER_HOURS: i64 = 48;

/// A high-urgency key escalates to critical after this many hours.
pub const CRITICAL_AFTER_HOURS: i64 = 72;

/// Severity tier of an unreturned key, ordered by urgency.
///
/// `Pending` means "not yet overdue" and is omitted from overdue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Pending,
    Overdue,
    High,
    Critical,
}

impl UrgencyTier {
    /// Lowercase label used in API payloads and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyTier::Pending => "pending",
            UrgencyTier::Overdue => "overdue",
            UrgencyTier::High => "high",
            UrgencyTier::Critical => "critical",
        }
    }
}

/// Whole hours elapsed between `requested_at` and `now`.
///
/// Negative if `now` precedes `requested_at` (clock skew); such requests
/// classify as `Pending`.
pub fn elapsed_hours(requested_at: Timestamp, now: Timestamp) -> i64 {
    now.signed_duration_since(requested_at).num_hours()
}

/// Classify a request's urgency at `now`.
///
/// Tier boundaries are closed at the lower bound: exactly 24h is `Overdue`,
/// exactly 48h is `High`, exactly 72h is `Critical`.
pub fn classify(requested_at: Timestamp, now: Timestamp) -> UrgencyTier {
    let hours = elapsed_hours(requested_at, now);
    if hours >= CRITICAL_AFTER_HOURS {
        UrgencyTier::Critical
    } else if hours >= HIGH_AFTER_HOURS {
        UrgencyTier::High
    } else if hours >= OVERDUE_AFTER_HOURS {
        UrgencyTier::Overdue
    } else {
        UrgencyTier::Pending
    }
}

/// Whether a request is subject to urgency classification at all.
pub fn eligible(status: RequestStatus, return_status: ReturnStatus) -> bool {
    status == RequestStatus::Approved && return_status != ReturnStatus::PendingApproval
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn fresh_request_is_not_overdue() {
        assert_eq!(classify(t0(), t0()), UrgencyTier::Pending);
        assert_eq!(classify(t0(), t0() + Duration::hours(23)), UrgencyTier::Pending);
    }

    #[test]
    fn scenario_d_tier_ladder() {
        assert_eq!(classify(t0(), t0() + Duration::hours(30)), UrgencyTier::Overdue);
        assert_eq!(classify(t0(), t0() + Duration::hours(50)), UrgencyTier::High);
        assert_eq!(classify(t0(), t0() + Duration::hours(73)), UrgencyTier::Critical);
    }

    #[test]
    fn boundaries_are_closed_at_the_lower_bound() {
        assert_eq!(classify(t0(), t0() + Duration::hours(24)), UrgencyTier::Overdue);
        assert_eq!(classify(t0(), t0() + Duration::hours(48)), UrgencyTier::High);
        assert_eq!(classify(t0(), t0() + Duration::hours(72)), UrgencyTier::Critical);
        // One minute shy of each boundary stays in the lower tier.
        let just_under = |h: i64| t0() + Duration::hours(h) - Duration::minutes(1);
        assert_eq!(classify(t0(), just_under(24)), UrgencyTier::Pending);
        assert_eq!(classify(t0(), just_under(48)), UrgencyTier::Overdue);
        assert_eq!(classify(t0(), just_under(72)), UrgencyTier::High);
    }

    #[test]
    fn classification_is_monotone_in_elapsed_time() {
        let mut previous = UrgencyTier::Pending;
        for hour in 0..100 {
            let tier = classify(t0(), t0() + Duration::hours(hour));
            assert!(tier >= previous, "tier regressed at hour {hour}");
            previous = tier;
        }
    }

    #[test]
    fn classification_is_idempotent_for_fixed_now() {
        let now = t0() + Duration::hours(49);
        assert_eq!(classify(t0(), now), classify(t0(), now));
    }

    #[test]
    fn clock_skew_classifies_as_pending() {
        assert_eq!(classify(t0(), t0() - Duration::hours(5)), UrgencyTier::Pending);
    }

    #[test]
    fn tiers_order_by_urgency() {
        assert!(UrgencyTier::Pending < UrgencyTier::Overdue);
        assert!(UrgencyTier::Overdue < UrgencyTier::High);
        assert!(UrgencyTier::High < UrgencyTier::Critical);
    }

    #[test]
    fn only_approved_requests_without_pending_return_are_eligible() {
        assert!(eligible(RequestStatus::Approved, ReturnStatus::None));
        assert!(eligible(RequestStatus::Approved, ReturnStatus::Rejected));
        assert!(!eligible(RequestStatus::Approved, ReturnStatus::PendingApproval));
        assert!(!eligible(RequestStatus::Pending, ReturnStatus::None));
        assert!(!eligible(RequestStatus::Returned, ReturnStatus::Approved));
    }

    #[test]
    fn elapsed_hours_truncates_toward_zero() {
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(90)), 1);
        assert_eq!(elapsed_hours(t0(), t0() - Duration::minutes(90)), -1);
    }
}
