use chrono::Utc;

use super::{resolve_id, short_id, Output};
use crate::cli::ReminderCommand;
use crate::db::RecordStore;
use crate::error::{AppError, AppResult};
use crate::models::{Reminder, ReminderState, WeekdaySet};
use crate::reminders::{self, ReminderDraft};

pub fn execute(store: &RecordStore, command: ReminderCommand, out: Output) -> AppResult<()> {
    match command {
        ReminderCommand::Add {
            medication,
            dose,
            title,
            times,
            days,
            validity_days,
            disabled,
        } => {
            let active_weekdays: WeekdaySet = days
                .parse()
                .map_err(|e: crate::db::DatabaseError| AppError::validation(e.to_string()))?;
            let draft = ReminderDraft {
                medication,
                dose: dose.unwrap_or_default(),
                title: title.unwrap_or_default(),
                times,
                active_weekdays,
                enabled: !disabled,
                validity_days,
            };
            let reminder = reminders::create_reminder(store, &draft, Utc::now())?;
            out.emit(&reminder, || format!("Alarma creada: {}", describe(&reminder)))
        }
        ReminderCommand::List => {
            let all = reminders::list_reminders(store);
            out.emit(&all, || {
                if all.is_empty() {
                    return "No hay alarmas.".to_string();
                }
                all.iter().map(describe).collect::<Vec<_>>().join("\n")
            })
        }
        ReminderCommand::Toggle { id } => {
            let id = resolve_id(&reminders::list_reminders(store), &id, |r| r.id, "Reminder")?;
            let reminder = reminders::toggle_reminder(store, id)?;
            out.emit(&reminder, || describe(&reminder))
        }
        ReminderCommand::Delete { id } => {
            let id = resolve_id(&reminders::list_reminders(store), &id, |r| r.id, "Reminder")?;
            reminders::delete_reminder(store, id)?;
            out.emit(&id, || format!("Alarma {} eliminada", short_id(&id)))
        }
    }
}

/// One listing line: id, label, schedule, state and expiry badge.
pub fn describe(reminder: &Reminder) -> String {
    let now = Utc::now();
    let state = match reminder.state(now) {
        ReminderState::Active => "activa",
        ReminderState::Expired => "vencida",
        ReminderState::Disabled => "desactivada",
    };
    let mut line = format!(
        "[{}] {} · {} · {} · {}",
        short_id(&reminder.id),
        reminder.notification_message(),
        reminder.times_label(),
        reminder.active_weekdays,
        state
    );
    if let Some(badge) = reminder.expiry(now).label() {
        line.push_str(&format!(" ({badge})"));
    }
    line
}
