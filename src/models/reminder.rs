use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Weekday;
use super::schedule::{TimeOfDay, WeekdaySet};
use crate::expiry::{self, ExpiryStatus};

/// Title used in notifications when a reminder has none.
pub const DEFAULT_TITLE: &str = "Hora de tomar";

/// Medication label used when a reminder has none.
pub const DEFAULT_MEDICATION_LABEL: &str = "tu medicamento";

/// A recurring dosage reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub medication: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub title: String,
    pub times: Vec<TimeOfDay>,
    pub active_weekdays: WeekdaySet,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    /// 0 means the reminder never expires.
    #[serde(default)]
    pub validity_days: u32,
}

/// Scheduler-facing state of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Active,
    Expired,
    Disabled,
}

impl Reminder {
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        expiry::days_remaining(self.created_at, self.validity_days, now)
    }

    pub fn expiry(&self, now: DateTime<Utc>) -> ExpiryStatus {
        ExpiryStatus::from_days(self.days_remaining(now))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry(now).is_expired()
    }

    pub fn state(&self, now: DateTime<Utc>) -> ReminderState {
        if !self.enabled {
            ReminderState::Disabled
        } else if self.is_expired(now) {
            ReminderState::Expired
        } else {
            ReminderState::Active
        }
    }

    /// Whether the recurrence rule matches a local wall-clock minute.
    /// Ignores the enabled flag and expiry.
    pub fn matches(&self, local: NaiveDateTime) -> bool {
        let day = Weekday::from(local.weekday());
        if !self.active_weekdays.contains(day) {
            return false;
        }
        let minute = TimeOfDay::from_time(local.time());
        self.times.contains(&minute)
    }

    /// `{title} \u{2014} {medication} {dose}` with Spanish defaults for blank fields.
    pub fn notification_message(&self) -> String {
        let title = non_empty(&self.title).unwrap_or(DEFAULT_TITLE);
        let medication = non_empty(&self.medication).unwrap_or(DEFAULT_MEDICATION_LABEL);
        match non_empty(&self.dose) {
            Some(dose) => format!("{title} \u{2014} {medication} {dose}"),
            None => format!("{title} \u{2014} {medication}"),
        }
    }

    /// Comma separated `HH:MM` list.
    pub fn times_label(&self) -> String {
        self.times
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
