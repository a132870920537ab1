//! Reminder scheduler: clock, notification sinks, tick evaluation and the
//! background loop that hosts them.

pub mod background;
pub mod clock;
pub mod engine;
pub mod notify;

pub use background::{start, SchedulerHandle};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::ReminderScheduler;
pub use notify::{ChannelSink, CommandSink, LogSink, NotificationSink, ReminderEvent};
