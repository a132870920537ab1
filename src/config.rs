use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Pastillas";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PASTILLAS_DATA_DIR";

/// Environment variable naming a desktop notifier program (e.g. `notify-send`).
pub const NOTIFY_CMD_ENV: &str = "PASTILLAS_NOTIFY_CMD";

/// Scheduler evaluation period.
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Default time ladder used when reminders are derived from a prescription.
pub const DEFAULT_TIME_LADDER: [&str; 6] = ["08:00", "12:00", "18:00", "22:00", "06:00", "14:00"];

/// Maximum daily occurrences of a single reminder.
pub const MAX_TIMES_PER_DAY: usize = 6;

/// Longest validity window a reminder may be given (about 100 years).
pub const MAX_VALIDITY_DAYS: u32 = 36_500;

/// Maximum medication entries on one manual prescription.
pub const MAX_PRESCRIPTION_MEDICATIONS: usize = 10;

/// Largest attachment accepted for upload (20 MB).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "pastillas.db";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "pastillas=info,pastillas_lib=info"
}

/// Get the application data directory.
/// `$PASTILLAS_DATA_DIR` when set, otherwise ~/Pastillas/ on all platforms.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Get the database path for a data directory.
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}
