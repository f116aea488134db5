//! # Expiry Classification
//!
//! Day-granular classification of a certificate's remaining validity.
//!
//! `remaining_days` is `floor(seconds_left / 86400)`, so a certificate that
//! expired one second ago has `-1` days left and one with 29 days and 23 hours
//! left has `29`. The floor decides the boundary between [`ExpiryState::Healthy`]
//! and [`ExpiryState::ExpiringSoon`] and must not be rounded.

use crate::constants::SECONDS_PER_DAY;
use chrono::{DateTime, Utc};

/// Expiry state of one certificate at one evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryState {
    /// notAfter is in the past
    Expired,
    /// Still valid, but fewer whole days left than the threshold
    ExpiringSoon,
    /// At least threshold whole days left
    Healthy,
}

impl ExpiryState {
    /// Value published on the certificate gauge
    #[must_use]
    pub fn gauge_value(self) -> f64 {
        match self {
            ExpiryState::Expired => 1.0,
            ExpiryState::ExpiringSoon => 0.5,
            ExpiryState::Healthy => 0.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExpiryState::Expired => "expired",
            ExpiryState::ExpiringSoon => "expiring-soon",
            ExpiryState::Healthy => "healthy",
        }
    }

    /// A certificate stays active until it has expired
    #[must_use]
    pub fn is_active(self) -> bool {
        self != ExpiryState::Expired
    }
}

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub state: ExpiryState,
    /// Whole days until notAfter, floored (negative once expired)
    pub remaining_days: i64,
    /// `remaining_days - threshold_days`; negative inside the warning window
    pub slack_days: i64,
}

/// Classify a certificate ending at `not_after`, evaluated at `now`
#[must_use]
pub fn classify(not_after: DateTime<Utc>, now: DateTime<Utc>, threshold_days: i64) -> Assessment {
    let remaining_days = (not_after - now)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY);
    let slack_days = remaining_days.saturating_sub(threshold_days);

    let state = if remaining_days < 0 {
        ExpiryState::Expired
    } else if slack_days < 0 {
        ExpiryState::ExpiringSoon
    } else {
        ExpiryState::Healthy
    };

    Assessment {
        state,
        remaining_days,
        slack_days,
    }
}
