//! Background reminder loop.
//!
//! Sweeps expired reminders once, then ticks the scheduler every interval on
//! a dedicated thread until the handle is shut down or dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::engine::ReminderScheduler;

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_secs(1);

/// Handle for the background scheduler thread.
///
/// `shutdown()` requests a stop; dropping the handle also stops and joins.
pub struct SchedulerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the scheduler on its own thread.
pub fn start(mut scheduler: ReminderScheduler, interval: Duration) -> SchedulerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            interval_secs = interval.as_secs(),
            sinks = scheduler.sink_count(),
            "Reminder scheduler started"
        );
        match scheduler.sweep_expired() {
            Ok(flipped) if !flipped.is_empty() => {
                tracing::info!(count = flipped.len(), "Startup sweep disabled expired reminders");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Startup sweep failed"),
        }
        scheduler_loop(&mut scheduler, interval, &flag);
    });

    SchedulerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn scheduler_loop(scheduler: &mut ReminderScheduler, interval: Duration, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Relaxed) {
        if let Err(e) = scheduler.tick() {
            tracing::warn!(error = %e, "Reminder tick failed");
        }

        // Sleep in small increments for responsive shutdown
        let started = Instant::now();
        while started.elapsed() < interval {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(SLEEP_GRANULARITY.min(interval.saturating_sub(started.elapsed())));
        }
    }
    tracing::info!("Reminder scheduler shutting down");
}
