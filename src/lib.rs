pub mod attachment;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod derive;
pub mod error;
pub mod expiry;
pub mod labs;
pub mod links;
pub mod models;
pub mod prescriptions;
pub mod reminders;
pub mod scheduler;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Honors `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
