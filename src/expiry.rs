//! Validity window arithmetic for reminders and prescriptions.
//!
//! Remaining days are rounded up (ceiling), so the last partial day still
//! counts as one day left and the boundary reads 0 rather than -1. A result
//! of 0 or less means expired.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d{1,9})").expect("valid regex"));

/// Days left in a reminder's validity window, `None` when it never expires.
pub fn days_remaining(
    created_at: DateTime<Utc>,
    validity_days: u32,
    now: DateTime<Utc>,
) -> Option<i64> {
    if validity_days == 0 {
        return None;
    }
    Some(days_until_end(created_at, i64::from(validity_days), now))
}

/// Ceiling of the days between `now` and `start + window_days`.
///
/// Computed as an offset in milliseconds, so windows far past the calendar
/// range never overflow. The result saturates at the `i64` bounds.
pub fn days_until_end(start: DateTime<Utc>, window_days: i64, now: DateTime<Utc>) -> i64 {
    let window_ms = i128::from(window_days) * i128::from(MS_PER_DAY);
    let offset_ms = i128::from((start - now).num_milliseconds());
    let days = ceil_div(window_ms + offset_ms, i128::from(MS_PER_DAY));
    i64::try_from(days).unwrap_or(if days > 0 { i64::MAX } else { i64::MIN })
}

fn ceil_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a > 0) == (b > 0)) {
        q + 1
    } else {
        q
    }
}

/// Reads the leading integer of free-text validity ("30 días" → 30).
pub fn parse_validity_days(text: &str) -> Option<i64> {
    LEADING_INTEGER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Days left on a prescription whose validity is free text.
///
/// The window starts at the issue date (midnight UTC) when known, otherwise
/// at `fallback_start`. Returns `None` when the text carries no number.
pub fn prescription_days_remaining(
    issue_date: Option<NaiveDate>,
    fallback_start: DateTime<Utc>,
    validity_text: Option<&str>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let days = parse_validity_days(validity_text?)?;
    let start = issue_date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(fallback_start);
    Some(days_until_end(start, days, now))
}

/// Display state of a validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum ExpiryStatus {
    NoExpiry,
    Active(i64),
    Expired,
}

impl ExpiryStatus {
    pub fn from_days(days: Option<i64>) -> Self {
        match days {
            None => Self::NoExpiry,
            Some(d) if d <= 0 => Self::Expired,
            Some(d) => Self::Active(d),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Badge text, `None` when there is nothing to show.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::NoExpiry => None,
            Self::Expired => Some("Vencida".to_string()),
            Self::Active(1) => Some("1 día restante".to_string()),
            Self::Active(d) => Some(format!("{d} días restantes")),
        }
    }
}
