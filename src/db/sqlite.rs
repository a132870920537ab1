use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::store::{Collection, CollectionStore};
use super::DatabaseError;

/// Numbered schema scripts, applied in order above the stored version.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/001_collections.sql"),
)];

/// Collection store backed by a single SQLite key/value table.
///
/// Each collection is one row holding the serialized JSON array. Writes of
/// several collections share one transaction, so a prescription and the
/// reminders derived from it land together or not at all.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch(
            "PRAGMA journal_mode=DELETE;
             PRAGMA synchronous=FULL;",
        )?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

fn migrate(conn: &Connection) -> Result<(), DatabaseError> {
    let applied = schema_version(conn)?;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > applied) {
        tracing::info!(version, "Applying schema migration");
        conn.execute_batch(sql)
            .map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// Highest applied migration, 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(0);
    }
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })?;
    Ok(version)
}

impl CollectionStore for SqliteStore {
    fn read(&self, collection: Collection) -> Result<Option<String>, DatabaseError> {
        let conn = self.lock()?;
        let payload = conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1",
                params![collection.key()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_all(&self, writes: &[(Collection, String)]) -> Result<(), DatabaseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (collection, payload) in writes {
            tx.execute(
                "INSERT INTO collections (key, payload, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at",
                params![collection.key(), payload],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_is_at_latest_version() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);
        let collections: i64 = conn
            .query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))
            .unwrap();
        assert_eq!(collections, 0);
    }

    #[test]
    fn migrating_twice_is_a_no_op() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock().unwrap();
        migrate(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn empty_connection_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn read_absent_collection_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.read(Collection::Reminders).unwrap().is_none());
    }

    #[test]
    fn write_then_read_payload() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_all(&[(Collection::Reminders, "[1,2]".to_string())])
            .unwrap();
        assert_eq!(store.read(Collection::Reminders).unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn write_overwrites_existing_payload() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_all(&[(Collection::LabStudies, "[1]".to_string())])
            .unwrap();
        store
            .write_all(&[(Collection::LabStudies, "[]".to_string())])
            .unwrap();
        assert_eq!(store.read(Collection::LabStudies).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn batch_writes_both_collections() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_all(&[
                (Collection::Prescriptions, "[\"p\"]".to_string()),
                (Collection::Reminders, "[\"r\"]".to_string()),
            ])
            .unwrap();
        assert!(store.read(Collection::Prescriptions).unwrap().is_some());
        assert!(store.read(Collection::Reminders).unwrap().is_some());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .write_all(&[(Collection::Reminders, "[42]".to_string())])
                .unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.read(Collection::Reminders).unwrap().as_deref(), Some("[42]"));
    }
}
