//! SQLite storage backend

use super::traits::{OpenStore, Snapshot, StorageError, StorageResult, WikiStore};
use crate::changelog::ChangelogEntry;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const GRAPH_SECTION: &str = "graph";
const TAXONOMY_SECTION: &str = "taxonomy";

/// SQLite-backed wiki store
///
/// The graph and taxonomy are stored as JSON section bodies; the changelog
/// is a table that only ever grows. Thread-safe via internal mutex on the
/// connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sections (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS changelog (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                action TEXT NOT NULL,
                path TEXT NOT NULL,
                entry_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_changelog_path ON changelog(path);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn load_section<T: DeserializeOwned + Default>(conn: &Connection, name: &str) -> StorageResult<T> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM sections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(T::default()),
        }
    }

    /// Number of changelog rows stored
    pub fn changelog_len(&self) -> StorageResult<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM changelog", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl WikiStore for SqliteStore {
    fn load(&self) -> StorageResult<Snapshot> {
        let conn = self.connection()?;
        let graph = Self::load_section(&conn, GRAPH_SECTION)?;
        let taxonomy = Self::load_section(&conn, TAXONOMY_SECTION)?;

        let mut stmt = conn.prepare("SELECT entry_json FROM changelog ORDER BY seq")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut changelog = Vec::new();
        for row in rows {
            let entry: ChangelogEntry = serde_json::from_str(&row?)?;
            changelog.push(entry);
        }

        Ok(Snapshot {
            graph,
            taxonomy,
            changelog,
        })
    }

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        for (name, body) in [
            (GRAPH_SECTION, serde_json::to_string(&snapshot.graph)?),
            (TAXONOMY_SECTION, serde_json::to_string(&snapshot.taxonomy)?),
        ] {
            tx.execute(
                r#"
                INSERT INTO sections (name, body, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    body = excluded.body,
                    updated_at = excluded.updated_at
                "#,
                params![name, body, now],
            )?;
        }

        // Append only the entries past what is already stored
        let stored: i64 = tx.query_row("SELECT COUNT(*) FROM changelog", [], |row| row.get(0))?;
        let mut appended = 0;
        for entry in snapshot.changelog.iter().skip(stored as usize) {
            let action = serde_json::to_value(entry.action)?;
            tx.execute(
                "INSERT INTO changelog (action, path, entry_json) VALUES (?1, ?2, ?3)",
                params![
                    action.as_str().unwrap_or_default(),
                    entry.path,
                    serde_json::to_string(entry)?
                ],
            )?;
            appended += 1;
        }

        tx.commit()?;
        tracing::debug!(appended, "saved SQLite sections");
        Ok(())
    }
}
