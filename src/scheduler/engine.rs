use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike, Utc};
use uuid::Uuid;

use super::clock::Clock;
use super::notify::{NotificationSink, ReminderEvent};
use crate::db::{Collection, DatabaseError, RecordStore};
use crate::error::AppResult;
use crate::models::Reminder;
use crate::reminders;

/// Evaluates stored reminders against the clock and notifies sinks.
///
/// Reminders are re-read from the store on every tick, so edits made through
/// other handles to the same store are picked up without a restart.
pub struct ReminderScheduler {
    store: Arc<RecordStore>,
    clock: Arc<dyn Clock>,
    sinks: Vec<Box<dyn NotificationSink>>,
    /// Last minute each reminder fired, to fire at most once per minute.
    last_fired: HashMap<Uuid, NaiveDateTime>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            sinks: Vec::new(),
            last_fired: HashMap::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Persist `enabled = false` for every reminder whose validity ended.
    pub fn sweep_expired(&self) -> AppResult<Vec<Uuid>> {
        let now = self.clock.now().with_timezone(&Utc);
        reminders::sweep_expired(&self.store, now)
    }

    /// Fire every enabled, unexpired reminder due at the current minute.
    ///
    /// A corrupt reminder collection is an error; nothing fires and the
    /// stored data is left as is.
    pub fn tick(&mut self) -> Result<Vec<ReminderEvent>, DatabaseError> {
        let now = self.clock.now();
        let utc = now.with_timezone(&Utc);
        let minute = truncate_to_minute(now.naive_local());
        let all: Vec<Reminder> = self.store.try_load(Collection::Reminders)?;

        let known: HashSet<Uuid> = all.iter().map(|r| r.id).collect();
        self.last_fired.retain(|id, _| known.contains(id));

        let mut events = Vec::new();
        for reminder in &all {
            if !reminder.enabled || reminder.is_expired(utc) || !reminder.matches(minute) {
                continue;
            }
            if self.last_fired.get(&reminder.id) == Some(&minute) {
                continue;
            }
            self.last_fired.insert(reminder.id, minute);
            events.push(ReminderEvent {
                reminder_id: reminder.id,
                message: reminder.notification_message(),
                fired_at: now,
            });
        }

        for event in &events {
            for sink in &mut self.sinks {
                if let Err(e) = sink.notify(event) {
                    tracing::warn!(sink = sink.name(), reminder_id = %event.reminder_id, error = %e, "Notification failed");
                }
            }
        }
        if !events.is_empty() {
            tracing::debug!(fired = events.len(), at = %minute, "Reminders fired");
        }
        Ok(events)
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeOfDay, Weekday, WeekdaySet};
    use crate::scheduler::clock::FixedClock;
    use crate::scheduler::notify::ChannelSink;
    use chrono::{DateTime, Duration, FixedOffset};
    use std::sync::mpsc;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    // 2026-10-19 is a Monday.
    const MONDAY_8AM: &str = "2026-10-19T08:00:00-06:00";

    fn reminder(times: &[&str], days: WeekdaySet) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            medication: "Paracetamol".into(),
            dose: "500 mg".into(),
            title: String::new(),
            times: times.iter().map(|t| t.parse::<TimeOfDay>().unwrap()).collect(),
            active_weekdays: days,
            enabled: true,
            created_at: at("2026-10-01T00:00:00Z").with_timezone(&Utc),
            validity_days: 0,
        }
    }

    fn scheduler_with(reminders: &[Reminder], now: &str) -> (ReminderScheduler, Arc<FixedClock>, Arc<RecordStore>) {
        let store = Arc::new(RecordStore::in_memory());
        store.save(Collection::Reminders, reminders).unwrap();
        let clock = Arc::new(FixedClock::new(at(now)));
        let scheduler = ReminderScheduler::new(store.clone(), clock.clone());
        (scheduler, clock, store)
    }

    #[test]
    fn fires_on_matching_weekday_and_minute_only() {
        let r = reminder(&["08:00"], WeekdaySet::only(Weekday::Monday));
        let (mut s, clock, _) = scheduler_with(&[r.clone()], MONDAY_8AM);

        let events = s.tick().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reminder_id, r.id);
        assert_eq!(events[0].message, "Hora de tomar \u{2014} Paracetamol 500 mg");

        clock.set(at("2026-10-19T08:01:00-06:00"));
        assert!(s.tick().unwrap().is_empty());

        clock.set(at("2026-10-20T08:00:00-06:00"));
        assert!(s.tick().unwrap().is_empty());
    }

    #[test]
    fn second_tick_in_same_minute_does_not_refire() {
        let r = reminder(&["08:00"], WeekdaySet::all());
        let (mut s, clock, _) = scheduler_with(&[r], MONDAY_8AM);
        assert_eq!(s.tick().unwrap().len(), 1);
        clock.advance(Duration::seconds(30));
        assert!(s.tick().unwrap().is_empty());

        // Same time next day fires again.
        clock.set(at("2026-10-20T08:00:10-06:00"));
        assert_eq!(s.tick().unwrap().len(), 1);
    }

    #[test]
    fn disabled_and_expired_reminders_never_fire() {
        let mut disabled = reminder(&["08:00"], WeekdaySet::all());
        disabled.enabled = false;
        let mut expired = reminder(&["08:00"], WeekdaySet::all());
        expired.validity_days = 3;
        let empty_days = reminder(&["08:00"], WeekdaySet::empty());
        let (mut s, _, _) = scheduler_with(&[disabled, expired, empty_days], MONDAY_8AM);
        assert!(s.tick().unwrap().is_empty());
    }

    #[test]
    fn events_reach_sinks() {
        let r = reminder(&["07:30", "08:00"], WeekdaySet::all());
        let (s, _, _) = scheduler_with(&[r.clone()], MONDAY_8AM);
        let (tx, rx) = mpsc::channel();
        let mut s = s.with_sink(ChannelSink::new(tx));
        assert_eq!(s.sink_count(), 1);
        s.tick().unwrap();
        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.reminder_id, r.id);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failing_sink_does_not_stop_tick() {
        let r = reminder(&["08:00"], WeekdaySet::all());
        let (s, _, _) = scheduler_with(&[r], MONDAY_8AM);
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut s = s.with_sink(ChannelSink::new(tx));
        assert_eq!(s.tick().unwrap().len(), 1);
    }

    #[test]
    fn picks_up_reminders_added_after_start() {
        let (mut s, _, store) = scheduler_with(&[], MONDAY_8AM);
        assert!(s.tick().unwrap().is_empty());
        store
            .save(Collection::Reminders, &[reminder(&["08:00"], WeekdaySet::all())])
            .unwrap();
        assert_eq!(s.tick().unwrap().len(), 1);
    }

    #[test]
    fn sweep_persists_disabled_flag() {
        let mut expiring = reminder(&["08:00"], WeekdaySet::all());
        expiring.validity_days = 5;
        let (s, _, store) = scheduler_with(&[expiring.clone()], MONDAY_8AM);
        assert_eq!(s.sweep_expired().unwrap(), vec![expiring.id]);
        let stored: Vec<Reminder> = store.load(Collection::Reminders);
        assert!(!stored[0].enabled);
    }
}
