//! Urgency classification for product dates.
//!
//! A tracked date (expiry or warranty end) is compared against "today" at calendar-day
//! granularity and mapped into one of four buckets. Every view in the application uses
//! this one classifier and the one threshold pair below, so a product never shows as
//! "critical" on one screen and "warning" on another.
//!
//! "Today" is always a calendar date. Callers that start from an instant reduce it with
//! [`today`], which uses UTC; stored dates carry no time of day at all.

use chrono::{NaiveDate, Utc};
use std::fmt;

/// Dates this many days away or fewer (and not yet past) are critical.
pub const CRITICAL_WITHIN_DAYS: i64 = 3;

/// Dates this many days away or fewer (and not critical) are a warning.
pub const WARNING_WITHIN_DAYS: i64 = 7;

/// Urgency bucket of a tracked date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The date has passed
    Expired {
        /// Whole days since the date
        days_past: i64,
    },
    /// Due within [`CRITICAL_WITHIN_DAYS`] days (today included)
    Critical,
    /// Due within [`WARNING_WITHIN_DAYS`] days
    Warning,
    /// Further out
    Good,
}

impl Status {
    /// Short lowercase label used by the chat surface and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired",
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Good => "good",
        }
    }

    /// Whether the date deserves attention.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        !matches!(self, Self::Good)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The current calendar date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole calendar days from `today` until `target` (negative once it has passed).
#[must_use]
pub fn days_remaining(target: NaiveDate, today: NaiveDate) -> i64 {
    target.signed_duration_since(today).num_days()
}

/// Classifies a date relative to `today`. A missing date has no status.
#[must_use]
pub fn classify(target: Option<NaiveDate>, today: NaiveDate) -> Option<Status> {
    target.map(|date| classify_days(days_remaining(date, today)))
}

/// Classifies an already computed day difference.
#[must_use]
pub const fn classify_days(days_remaining: i64) -> Status {
    if days_remaining < 0 {
        Status::Expired {
            days_past: -days_remaining,
        }
    } else if days_remaining <= CRITICAL_WITHIN_DAYS {
        Status::Critical
    } else if days_remaining <= WARNING_WITHIN_DAYS {
        Status::Warning
    } else {
        Status::Good
    }
}
