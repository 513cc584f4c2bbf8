//! Promotion Timing
//!
//! Classifies a promotion against an instant. The manual `is_active` switch is
//! checked before the validity window.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use crate::promotions::Promotion;

/// Where a promotion sits relative to its validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingStatus {
    /// Inside the validity window and switched on
    Active,

    /// Validity window has not started
    Upcoming,

    /// Validity window has ended
    Expired,

    /// Switched off
    Inactive,
}

impl TimingStatus {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Upcoming => "upcoming",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TimingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`validate_timing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingValidation {
    /// Timing status
    pub status: TimingStatus,

    /// Time until the window opens (`Upcoming`) or closes (`Active`)
    pub time_remaining: Option<SignedDuration>,
}

impl TimingValidation {
    /// Whether the promotion can be applied right now.
    pub const fn is_valid(&self) -> bool {
        matches!(self.status, TimingStatus::Active)
    }
}

/// Classify `promotion` at `now`.
///
/// Both window bounds are inclusive: a promotion is still active at exactly
/// `valid_to`.
pub fn validate_timing(promotion: &Promotion<'_>, now: Timestamp) -> TimingValidation {
    if !promotion.is_active {
        return TimingValidation {
            status: TimingStatus::Inactive,
            time_remaining: None,
        };
    }

    if now < promotion.valid_from {
        return TimingValidation {
            status: TimingStatus::Upcoming,
            time_remaining: Some(promotion.valid_from.duration_since(now)),
        };
    }

    if now > promotion.valid_to {
        return TimingValidation {
            status: TimingStatus::Expired,
            time_remaining: None,
        };
    }

    TimingValidation {
        status: TimingStatus::Active,
        time_remaining: Some(promotion.valid_to.duration_since(now)),
    }
}
