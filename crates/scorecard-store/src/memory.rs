//! In-memory document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorecard_core::{CanonicalRecord, DocumentStore, Result, StoreMatch, relevance::best_match};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored record with its last write time.
#[derive(Debug, Clone)]
struct StoreEntry {
    record: CanonicalRecord,
    updated_at: DateTime<Utc>,
}

impl StoreEntry {
    fn new(record: CanonicalRecord) -> Self {
        Self {
            record,
            updated_at: Utc::now(),
        }
    }
}

/// Document store backed by a `RwLock`-protected `HashMap`.
///
/// Records are cloned on read and write and are lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, StoreEntry>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with records.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = CanonicalRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.name.clone(), StoreEntry::new(record)))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Returns when a record was last written.
    pub async fn updated_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.records.read().await.get(name).map(|entry| entry.updated_at)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn search_text(&self, query: &str) -> Result<Option<StoreMatch>> {
        let records = self.records.read().await;
        let found = best_match(
            query,
            records.iter().map(|(name, entry)| (name.as_str(), &entry.record)),
        )
        .map(|(record, relevance)| StoreMatch {
            record: record.clone(),
            relevance,
        });

        match &found {
            Some(m) => debug!(instrument = %m.record.name, relevance = m.relevance, "Store match"),
            None => debug!("No store match"),
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<CanonicalRecord>> {
        Ok(self.records.read().await.get(name).map(|entry| entry.record.clone()))
    }

    #[instrument(skip(self, record), fields(instrument = %record.name))]
    async fn upsert(&self, record: &CanonicalRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.name.clone(), StoreEntry::new(record.clone()));
        debug!("Upserted record");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        debug!("Cleared in-memory store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = InMemoryStore::new();
        assert!(store.get("Infosys Ltd").await.unwrap().is_none());

        let mut record = CanonicalRecord::new("Infosys Ltd");
        record.market_cap = "6,33,542".to_string();
        store.upsert(&record).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.updated_at("Infosys Ltd").await.is_some());

        record.market_cap = "7,00,000".to_string();
        store.upsert(&record).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get("Infosys Ltd").await.unwrap().unwrap();
        assert_eq!(stored.market_cap, "7,00,000");
    }

    #[tokio::test]
    async fn test_search_text_ranks_best() {
        let store = InMemoryStore::with_records([
            CanonicalRecord::new("HDFC Bank Ltd"),
            CanonicalRecord::new("HDFC Life Insurance Company Ltd"),
            CanonicalRecord::new("Infosys Ltd"),
        ]);

        let found = store.search_text("HDFC Bank Ltd").await.unwrap().unwrap();
        assert_eq!(found.record.name, "HDFC Bank Ltd");
        assert_eq!(found.relevance, 2.0);

        assert!(store.search_text("Wipro").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryStore::with_records([CanonicalRecord::new("A")]);
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
