//! Date comparison helpers.
//!
//! The two platforms report timestamps in different time zones and with
//! different precision, so window comparisons work at date granularity and
//! tolerate a one-day skew.

use chrono::{DateTime, Utc};

/// Compare two optional timestamps at date granularity, tolerating time-zone
/// skew.
///
/// Both absent counts as equal; exactly one absent counts as different.
/// When both are present, only the date components are compared and a
/// difference of up to one day is still considered equal.
#[must_use]
pub fn dates_equal_lenient(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            let days = (a.date_naive() - b.date_naive()).num_days().abs();
            days <= 1
        }
        _ => false,
    }
}
