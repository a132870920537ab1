//! Prescription-to-reminder derivation.
//!
//! Each manual dosing entry that opted into automatic reminders becomes at
//! most one reminder. Daily entries take the first `timesPerDay` slots of the
//! default time ladder; weekly entries fire at 08:00 on their weekday.
//! Monthly entries produce no reminder, only a notice for the user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::DEFAULT_TIME_LADDER;
use crate::models::{DosingEntry, Regimen, Reminder, TimeOfDay, WeekdaySet};

pub const DAILY_TITLE: &str = "Según receta";
pub const WEEKLY_TITLE: &str = "Según receta (semanal)";

/// Reminders built from a prescription plus user-facing notices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derivation {
    pub reminders: Vec<Reminder>,
    pub notices: Vec<String>,
}

impl Derivation {
    /// "Se crearon N alarma(s)", or `None` when nothing was derived.
    pub fn confirmation(&self) -> Option<String> {
        match self.reminders.len() {
            0 => None,
            1 => Some("Se creó 1 alarma".to_string()),
            n => Some(format!("Se crearon {n} alarmas")),
        }
    }
}

/// Derive reminders for every entry with `auto_reminder` set.
///
/// Entries are expected to be normalized. Output order follows input order.
pub fn derive_reminders(entries: &[DosingEntry], now: DateTime<Utc>) -> Derivation {
    let mut out = Derivation::default();
    for entry in entries.iter().filter(|e| e.auto_reminder && e.has_name()) {
        match entry.regimen {
            Regimen::Daily => {
                let times = ladder_times(entry.times_per_day);
                out.reminders.push(derived(entry, DAILY_TITLE, times, entry.active_weekdays, now));
            }
            Regimen::Weekly => {
                // Weekly doses always go in the first ladder slot (08:00).
                let days = WeekdaySet::only(entry.weekday);
                out.reminders.push(derived(entry, WEEKLY_TITLE, ladder_times(1), days, now));
            }
            Regimen::Monthly => {
                tracing::debug!(medication = %entry.name, "Monthly regimen, no reminder derived");
                out.notices.push(format!(
                    "\"{}\": mensual. Crea la alarma manualmente en la sección Alarmas.",
                    entry.name
                ));
            }
        }
    }
    out
}

/// The first `count` slots of the default ladder, clamped to 1..=6.
pub fn ladder_times(count: u8) -> Vec<TimeOfDay> {
    let count = usize::from(count).clamp(1, DEFAULT_TIME_LADDER.len());
    DEFAULT_TIME_LADDER[..count]
        .iter()
        .filter_map(|t| t.parse().ok())
        .collect()
}

fn derived(
    entry: &DosingEntry,
    title: &str,
    times: Vec<TimeOfDay>,
    active_weekdays: WeekdaySet,
    now: DateTime<Utc>,
) -> Reminder {
    Reminder {
        id: Uuid::new_v4(),
        medication: entry.name.clone(),
        dose: entry.dose.clone(),
        title: title.to_string(),
        times,
        active_weekdays,
        enabled: true,
        created_at: now,
        validity_days: 0,
    }
}
