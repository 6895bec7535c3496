//! Document store trait for cached instrument records.
//!
//! This module defines the [`DocumentStore`] trait. The store is a cache,
//! never the source of truth for freshness: the resolver decides from the
//! relevance of a match whether the stored record can be used.

use async_trait::async_trait;

use crate::{error::Result, types::CanonicalRecord};

/// Best text-search match returned by a [`DocumentStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct StoreMatch {
    /// The matched record.
    pub record: CanonicalRecord,
    /// Relevance of the match; `1.0` or more counts as a confident match.
    pub relevance: f64,
}

/// Trait for stores of canonical instrument records keyed by name.
///
/// Implementations can keep records in memory, SQLite, or a remote
/// document database. Connection lifecycle belongs to the implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Relevance-ranked text search over record names.
    ///
    /// Returns `Ok(Some(m))` with the single top-ranked match, `Ok(None)` if
    /// nothing matched.
    async fn search_text(&self, query: &str) -> Result<Option<StoreMatch>>;

    /// Retrieves a record by exact name.
    async fn get(&self, name: &str) -> Result<Option<CanonicalRecord>>;

    /// Inserts or replaces the record stored under `record.name`.
    async fn upsert(&self, record: &CanonicalRecord) -> Result<()>;

    /// Returns the number of stored records.
    async fn count(&self) -> Result<usize>;

    /// Removes all stored records.
    async fn clear(&self) -> Result<()>;
}
