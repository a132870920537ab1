//! Command handlers for the `pastillas` binary.
//!
//! Each handler opens nothing itself: `dispatch` resolves the data directory,
//! opens the record store once and hands it down.

pub mod lab;
pub mod links;
pub mod prescription;
pub mod reminder;
pub mod run;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::config;
use crate::db::{DatabaseError, RecordStore};
use crate::error::{AppError, AppResult};

/// Text or JSON printing, chosen by `--json`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> AppResult<()> {
        if self.json {
            let rendered = serde_json::to_string_pretty(value).map_err(DatabaseError::from)?;
            println!("{rendered}");
        } else {
            let rendered = text();
            if !rendered.is_empty() {
                println!("{rendered}");
            }
        }
        Ok(())
    }
}

pub async fn dispatch(cli: Cli) -> AppResult<()> {
    let data_dir = cli.data_dir.unwrap_or_else(config::app_data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = config::database_path(&data_dir);
    tracing::debug!(path = %db_path.display(), "Opening record store");
    let store = RecordStore::open(&db_path)?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Reminder(args) => reminder::execute(&store, args.command, out),
        Command::Prescription(args) => prescription::execute(&store, args.command, out),
        Command::Lab(args) => lab::execute(&store, args.command, out),
        Command::Links { query } => links::execute(&query.join(" "), out),
        Command::Run { tick_secs, notify_cmd } => {
            run::serve(Arc::new(store), tick_secs, notify_cmd).await
        }
    }
}

/// Resolve a full id or a unique prefix of one against `items`.
pub fn resolve_id<T>(
    items: &[T],
    raw: &str,
    id_of: impl Fn(&T) -> Uuid,
    entity_type: &str,
) -> AppResult<Uuid> {
    let raw = raw.trim().to_lowercase();
    if let Ok(id) = Uuid::parse_str(&raw) {
        return Ok(id);
    }
    if raw.is_empty() {
        return Err(AppError::validation("An id is required"));
    }
    let mut matches = items
        .iter()
        .map(&id_of)
        .filter(|id| id.to_string().starts_with(&raw));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(AppError::not_found(entity_type, raw)),
        (Some(_), Some(_)) => Err(AppError::validation(format!(
            "Id prefix '{raw}' matches more than one {entity_type}"
        ))),
    }
}

/// First eight characters of an id, for listings.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
