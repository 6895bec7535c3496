//! SQLite document store.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use scorecard_core::{
    CanonicalRecord, DocumentStore, Result, ScoreError, StoreMatch, relevance::best_match,
};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Document store persisted in a SQLite database.
///
/// Each record is stored as one JSON document keyed by instrument name.
/// Text search ranks every stored name with the shared relevance scorer.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ScoreError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| ScoreError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS instruments (
                name TEXT PRIMARY KEY NOT NULL,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ScoreError::Store(e.to_string()))?;

        debug!("SQLite store schema initialized");
        Ok(())
    }

    fn decode(document: &str) -> Result<CanonicalRecord> {
        serde_json::from_str(document).map_err(|e| ScoreError::Store(e.to_string()))
    }

    fn load(conn: &Connection, name: &str) -> Result<Option<CanonicalRecord>> {
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM instruments WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        document.as_deref().map(Self::decode).transpose()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    #[instrument(skip(self))]
    async fn search_text(&self, query: &str) -> Result<Option<StoreMatch>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT name FROM instruments")
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ScoreError::Store(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScoreError::Store(e.to_string()))?;

        let Some((name, relevance)) = best_match(query, names.iter().map(|n| (n.as_str(), n)))
        else {
            debug!(candidates = names.len(), "No store match");
            return Ok(None);
        };

        debug!(instrument = %name, relevance, "Store match");
        Ok(Self::load(&conn, name)?.map(|record| StoreMatch { record, relevance }))
    }

    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<CanonicalRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        Self::load(&conn, name)
    }

    #[instrument(skip(self, record), fields(instrument = %record.name))]
    async fn upsert(&self, record: &CanonicalRecord) -> Result<()> {
        let document = serde_json::to_string(record).map_err(|e| ScoreError::Store(e.to_string()))?;
        let updated_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO instruments (name, document, updated_at)
             VALUES (?1, ?2, ?3)",
            params![record.name, document, updated_at],
        )
        .map_err(|e| ScoreError::Store(e.to_string()))?;

        debug!(bytes = document.len(), "Upserted record");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM instruments", [], |row| row.get(0))
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        usize::try_from(count).map_err(|e| ScoreError::Store(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        conn.execute("DELETE FROM instruments", [])
            .map_err(|e| ScoreError::Store(e.to_string()))?;
        debug!("Cleared SQLite store");
        Ok(())
    }
}
