use std::sync::Arc;
use std::time::Duration;

use crate::db::RecordStore;
use crate::error::AppResult;
use crate::scheduler::{self, CommandSink, LogSink, ReminderScheduler, SystemClock};

/// Host the reminder scheduler until Ctrl-C.
pub async fn serve(store: Arc<RecordStore>, tick_secs: u64, notify_cmd: Option<String>) -> AppResult<()> {
    let mut engine = ReminderScheduler::new(store, Arc::new(SystemClock)).with_sink(LogSink);
    if let Some(sink) = notify_cmd.as_deref().and_then(CommandSink::from_command_line) {
        tracing::info!(command = notify_cmd.as_deref().unwrap_or_default(), "Desktop notifications enabled");
        engine = engine.with_sink(sink);
    }

    let handle = scheduler::start(engine, Duration::from_secs(tick_secs.max(1)));
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
    }
    tracing::info!("Stopping reminder scheduler");
    handle.shutdown();
    tokio::task::spawn_blocking(move || drop(handle))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}
