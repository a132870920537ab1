//! Notification sinks.
//!
//! The scheduler hands every fired event to each registered sink. A sink
//! failure is logged and never stops the tick.

use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::config::APP_NAME;

/// A reminder that came due.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderEvent {
    pub reminder_id: Uuid,
    pub message: String,
    pub fired_at: DateTime<FixedOffset>,
}

pub trait NotificationSink: Send {
    fn name(&self) -> &'static str;

    fn notify(&mut self, event: &ReminderEvent) -> Result<(), String>;
}

/// In-app message through the tracing log.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn notify(&mut self, event: &ReminderEvent) -> Result<(), String> {
        tracing::info!(
            reminder_id = %event.reminder_id,
            at = %event.fired_at.format("%H:%M"),
            "{}",
            event.message
        );
        Ok(())
    }
}

/// Forwards events to a consumer on the other end of a channel.
pub struct ChannelSink {
    tx: Sender<ReminderEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ReminderEvent>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn notify(&mut self, event: &ReminderEvent) -> Result<(), String> {
        self.tx
            .send(event.clone())
            .map_err(|_| "receiver dropped".to_string())
    }
}

/// Desktop notification through an external program, e.g. `notify-send`.
///
/// The program is called as `<program> [args..] <app name> <message>` and is
/// not waited on. Finished children are reaped on the next notification and
/// children still running after [`NOTIFIER_TIMEOUT`] are killed.
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    running: Vec<(Child, Instant)>,
}

pub const NOTIFIER_TIMEOUT: Duration = Duration::from_secs(30);

impl CommandSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            running: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Split a command line such as `notify-send -u critical` on whitespace.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).with_args(words))
    }

    /// Notifier processes not yet reaped.
    pub fn pending(&self) -> usize {
        self.running.len()
    }

    fn reap(&mut self) {
        let program = &self.program;
        self.running.retain_mut(|(child, started)| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    tracing::warn!(program = %program, %status, "Notifier exited with failure");
                }
                false
            }
            Ok(None) if started.elapsed() < NOTIFIER_TIMEOUT => true,
            Ok(None) => {
                tracing::warn!(program = %program, "Notifier timed out, killing it");
                let _ = child.kill();
                let _ = child.wait();
                false
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "Failed to poll notifier");
                false
            }
        });
    }
}

impl NotificationSink for CommandSink {
    fn name(&self) -> &'static str {
        "command"
    }

    fn notify(&mut self, event: &ReminderEvent) -> Result<(), String> {
        self.reap();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(APP_NAME)
            .arg(&event.message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;
        self.running.push((child, Instant::now()));
        Ok(())
    }
}

impl Drop for CommandSink {
    fn drop(&mut self) {
        for (child, _) in &mut self.running {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn event() -> ReminderEvent {
        ReminderEvent {
            reminder_id: Uuid::new_v4(),
            message: "Hora de tomar \u{2014} Paracetamol 500 mg".into(),
            fired_at: DateTime::parse_from_rfc3339("2026-10-19T08:00:00-06:00").unwrap(),
        }
    }

    #[test]
    fn channel_sink_delivers() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink::new(tx);
        let e = event();
        sink.notify(&e).unwrap();
        assert_eq!(rx.try_recv().unwrap(), e);
    }

    #[test]
    fn channel_sink_reports_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(ChannelSink::new(tx).notify(&event()).is_err());
    }

    #[test]
    fn command_sink_reports_missing_program() {
        let mut sink = CommandSink::new("pastillas-no-such-notifier");
        assert!(sink.notify(&event()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_sink_does_not_wait_for_notifier() {
        let mut sink = CommandSink::new("sh").with_args(["-c", "sleep 5"]);
        let started = Instant::now();
        sink.notify(&event()).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sink.pending(), 1);

        let started = Instant::now();
        drop(sink);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn finished_notifiers_are_reaped() {
        let mut sink = CommandSink::new("true");
        sink.notify(&event()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            sink.reap();
            if sink.pending() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn command_line_splits_program_and_args() {
        let sink = CommandSink::from_command_line("notify-send -u critical").unwrap();
        assert_eq!(sink.program, "notify-send");
        assert_eq!(sink.args, ["-u", "critical"]);
        assert!(CommandSink::from_command_line("   ").is_none());
    }

    #[test]
    fn log_sink_never_fails() {
        assert!(LogSink.notify(&event()).is_ok());
    }
}
