use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use super::KeyValueStore;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS key_value (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )";

/// Key-value store kept in a single SQLite table.
/// Writes are upserts, so the last writer wins.
///
/// A file that is not a usable database still opens: reads fail (and the
/// ledger above degrades to empty) while every write reports the error.
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let connection = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        let store = Self { connection };
        if let Err(e) = store.ensure_table() {
            tracing::warn!(error = ?e, "database is not usable, writes will fail");
        }
        Ok(store)
    }

    fn ensure_table(&self) -> Result<()> {
        self.connection
            .execute(CREATE_TABLE, ())
            .context("Failed to create key_value table")?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key {:?}", key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_table()?;
        self.connection
            .execute(
                "INSERT INTO key_value (key, value) VALUES (?1, ?2)
                    ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (key, value),
            )
            .with_context(|| format!("Failed to write key {:?}", key))?;

        tracing::debug!(key, bytes = value.len(), "wrote storage row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("budget").unwrap(), None);
    }

    #[test]
    fn test_upsert() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set("budget", "[1]").unwrap();
        store.set("budget", "[2]").unwrap();
        store.set("other", "x").unwrap();

        assert_eq!(store.get("budget").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("budget.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("budget", "[]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("budget").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_garbage_file_opens_but_reports_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("budget.db");
        fs::write(&path, vec![0x5a; 4096]).unwrap();

        let mut store = SqliteStore::open(&path).unwrap();

        assert!(store.get("budget").is_err());
        assert!(store.set("budget", "[]").is_err());
        // The file is left for the user to inspect
        assert_eq!(fs::read(&path).unwrap(), vec![0x5a; 4096]);
    }
}
