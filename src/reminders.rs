//! Reminder records: creation, listing, toggling, deletion and the expiry sweep.
//!
//! The whole reminder collection is loaded, modified and written back on
//! every mutation. New reminders are prepended (most recent first).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MAX_TIMES_PER_DAY, MAX_VALIDITY_DAYS};
use crate::db::{Collection, RecordStore};
use crate::error::{AppError, AppResult};
use crate::models::{Reminder, TimeOfDay, WeekdaySet};

/// Input for a user-created reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub medication: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub title: String,
    /// `HH:MM` entries, one per daily occurrence.
    pub times: Vec<String>,
    #[serde(default)]
    pub active_weekdays: WeekdaySet,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub validity_days: u32,
}

fn enabled_by_default() -> bool {
    true
}

/// Validate a draft and build the reminder. No store access.
pub fn build_reminder(draft: &ReminderDraft, now: DateTime<Utc>) -> AppResult<Reminder> {
    let medication = draft.medication.trim();
    if medication.is_empty() {
        return Err(AppError::validation("Medication name is required"));
    }
    if draft.times.is_empty() {
        return Err(AppError::validation("At least one time is required"));
    }
    if draft.times.len() > MAX_TIMES_PER_DAY {
        return Err(AppError::validation(format!(
            "At most {MAX_TIMES_PER_DAY} times per day are allowed"
        )));
    }
    if draft.validity_days > MAX_VALIDITY_DAYS {
        return Err(AppError::validation(format!(
            "Validity must be at most {MAX_VALIDITY_DAYS} days"
        )));
    }

    let mut times = Vec::with_capacity(draft.times.len());
    for raw in &draft.times {
        if raw.trim().is_empty() {
            return Err(AppError::validation("Times must not be empty"));
        }
        let time: TimeOfDay = raw
            .parse()
            .map_err(|e: crate::models::schedule::InvalidTime| AppError::validation(e.to_string()))?;
        times.push(time);
    }

    Ok(Reminder {
        id: Uuid::new_v4(),
        medication: medication.to_string(),
        dose: draft.dose.trim().to_string(),
        title: draft.title.trim().to_string(),
        times,
        active_weekdays: draft.active_weekdays,
        enabled: draft.enabled,
        created_at: now,
        validity_days: draft.validity_days,
    })
}

/// Creates a reminder and prepends it to the collection.
pub fn create_reminder(
    store: &RecordStore,
    draft: &ReminderDraft,
    now: DateTime<Utc>,
) -> AppResult<Reminder> {
    let reminder = build_reminder(draft, now)?;
    let mut reminders = list_reminders(store);
    reminders.insert(0, reminder.clone());
    store.save(Collection::Reminders, &reminders)?;
    tracing::info!(id = %reminder.id, medication = %reminder.medication, "Reminder created");
    Ok(reminder)
}

/// All reminders, most recent first.
pub fn list_reminders(store: &RecordStore) -> Vec<Reminder> {
    store.load(Collection::Reminders)
}

/// Flips the enabled flag. Every other field is left untouched.
pub fn toggle_reminder(store: &RecordStore, id: Uuid) -> AppResult<Reminder> {
    let mut reminders = list_reminders(store);
    let reminder = reminders
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::not_found("Reminder", id))?;
    reminder.enabled = !reminder.enabled;
    let updated = reminder.clone();
    store.save(Collection::Reminders, &reminders)?;
    tracing::info!(id = %id, enabled = updated.enabled, "Reminder toggled");
    Ok(updated)
}

/// Hard-deletes a reminder.
pub fn delete_reminder(store: &RecordStore, id: Uuid) -> AppResult<()> {
    let mut reminders = list_reminders(store);
    let before = reminders.len();
    reminders.retain(|r| r.id != id);
    if reminders.len() == before {
        return Err(AppError::not_found("Reminder", id));
    }
    store.save(Collection::Reminders, &reminders)?;
    tracing::info!(id = %id, "Reminder deleted");
    Ok(())
}

/// Disables every enabled reminder whose validity window has ended.
/// Returns the ids that flipped.
pub fn disable_expired(reminders: &mut [Reminder], now: DateTime<Utc>) -> Vec<Uuid> {
    reminders
        .iter_mut()
        .filter(|r| r.enabled && r.is_expired(now))
        .map(|r| {
            r.enabled = false;
            r.id
        })
        .collect()
}

/// Runs `disable_expired` against the store, writing only when something flipped.
///
/// A corrupt collection is left untouched.
pub fn sweep_expired(store: &RecordStore, now: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
    let mut reminders: Vec<Reminder> = store.try_load(Collection::Reminders)?;
    let flipped = disable_expired(&mut reminders, now);
    if !flipped.is_empty() {
        store.save(Collection::Reminders, &reminders)?;
        tracing::info!(count = flipped.len(), "Expired reminders disabled");
    }
    Ok(flipped)
}
