//! Instrument resolution against the document store with live fallback.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scorecard_core::{
    CanonicalRecord, CompanyHit, DocumentStore, InstrumentQuery, LiveSource, MarketCapCategory, Result,
    ScoreError,
};

/// Relevance at or above which a stored record is used as is.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Where a resolved record came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The document store, matched with sufficient relevance.
    Cache,
    /// The live source, after which the store was refreshed.
    Live,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::Live => "live",
        })
    }
}

/// A resolved instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The canonical record.
    pub record: CanonicalRecord,
    /// Relevance of the best store match (0 when the store had none).
    pub relevance: f64,
    /// Where the record came from.
    pub origin: Origin,
    /// Market-cap bucket of the record.
    pub category: MarketCapCategory,
}

impl Resolution {
    fn new(record: CanonicalRecord, relevance: f64, origin: Origin) -> Self {
        Self {
            category: record.market_cap_category(),
            record,
            relevance,
            origin,
        }
    }
}

/// Resolves free-text instrument names to canonical records.
///
/// The store is searched with the cleaned name. A match at or above the
/// threshold is returned directly; otherwise the live source is searched, the
/// first company hit is fetched, and the fresh record is upserted under the hit's
/// name.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use scorecard::{InMemoryStore, Resolver, ScreenerSource};
///
/// let resolver = Resolver::new(
///     Arc::new(InMemoryStore::new()),
///     Arc::new(ScreenerSource::new("https://www.screener.in")),
/// );
/// let resolution = resolver.resolve("Infosys Limited").await?;
/// println!("{} ({})", resolution.record.name, resolution.category);
/// ```
pub struct Resolver {
    store: Arc<dyn DocumentStore>,
    source: Option<Arc<dyn LiveSource>>,
    threshold: f64,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &"configured")
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Resolver {
    /// Create a resolver over a store and a live source.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, source: Arc<dyn LiveSource>) -> Self {
        Self {
            store,
            source: Some(source),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Create a resolver that never goes live. Low-relevance lookups fail
    /// with [`ScoreError::NotConfigured`].
    #[must_use]
    pub fn cache_only(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            source: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the relevance threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the relevance threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolves one instrument name.
    ///
    /// # Errors
    /// Fails when the store cannot be searched, the live source has no match,
    /// or the live fetch fails. A failed upsert of a fresh record is logged
    /// and does not fail the resolution.
    pub async fn resolve(&self, name: &str) -> Result<Resolution> {
        let query = InstrumentQuery::new(name);
        if query.cleaned().is_empty() {
            return Err(ScoreError::InvalidParameter("Empty instrument name".to_string()));
        }

        let relevance = match self.store.search_text(query.cleaned()).await? {
            Some(found) if found.relevance >= self.threshold => {
                debug!(
                    instrument = %query,
                    matched = %found.record.name,
                    relevance = found.relevance,
                    "Using stored record"
                );
                return Ok(Resolution::new(found.record, found.relevance, Origin::Cache));
            }
            Some(found) => {
                debug!(
                    instrument = %query,
                    matched = %found.record.name,
                    relevance = found.relevance,
                    "Stored record below threshold"
                );
                found.relevance
            }
            None => 0.0,
        };

        let record = self.refresh(&query).await?;
        Ok(Resolution::new(record, relevance, Origin::Live))
    }

    /// Fetches a fresh record from the live source and upserts it.
    async fn refresh(&self, query: &InstrumentQuery) -> Result<CanonicalRecord> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ScoreError::NotConfigured("live source".to_string()))?;

        let hits = source.search(query.cleaned()).await?;
        let total = hits.len();
        let Some(hit) = hits.into_iter().find(CompanyHit::is_company) else {
            debug!(
                instrument = %query,
                query = query.cleaned(),
                hits = total,
                "No company in live search"
            );
            return Err(ScoreError::NotFound(query.raw().to_string()));
        };

        debug!(instrument = %query, hit = %hit.name, url = %hit.url, "Fetching live record");
        let record = source.fetch_record(&hit).await?;

        match self.store.upsert(&record).await {
            Ok(()) => info!(instrument = %record.name, source = source.name(), "Refreshed record"),
            Err(e) => warn!(instrument = %record.name, error = %e, "Failed to store refreshed record"),
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use scorecard_store::InMemoryStore;

    fn stored(name: &str, market_cap: &str) -> CanonicalRecord {
        let mut record = CanonicalRecord::new(name);
        record.market_cap = market_cap.to_string();
        record
    }

    #[tokio::test]
    async fn test_high_relevance_uses_store() {
        let store = Arc::new(InMemoryStore::with_records([stored("Infosys Ltd", "6,33,542")]));
        let source = Arc::new(FakeSource::default());
        let resolver = Resolver::new(store, source.clone());

        let resolution = resolver.resolve("Infosys Limited").await.unwrap();
        assert_eq!(resolution.origin, Origin::Cache);
        assert_eq!(resolution.record.name, "Infosys Ltd");
        assert_eq!(resolution.relevance, 1.5);
        assert_eq!(resolution.category, MarketCapCategory::LargeCap);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_low_relevance_goes_live_and_upserts() {
        let store = Arc::new(InMemoryStore::with_records([stored("Tata Steel Ltd", "1,80,000")]));
        let source = Arc::new(FakeSource::default().with_company(
            "Tata Motors Ltd",
            "/company/TATAMOTORS/",
            stored("ignored", "3,10,000"),
        ));
        let resolver = Resolver::new(store.clone(), source.clone());

        let resolution = resolver.resolve("Tata Motors").await.unwrap();
        assert_eq!(resolution.origin, Origin::Live);
        assert!(resolution.relevance < 1.0);
        assert_eq!(resolution.record.name, "Tata Motors Ltd");
        assert_eq!(resolution.record.url.as_deref(), Some("/company/TATAMOTORS/"));
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get("Tata Motors Ltd").await.unwrap().is_some());

        // The refreshed record now matches strongly.
        let again = resolver.resolve("Tata Motors Limited").await.unwrap();
        assert_eq!(again.origin, Origin::Cache);
        assert_eq!(again.relevance, 2.0);
    }

    #[tokio::test]
    async fn test_no_live_match_fails() {
        let resolver = Resolver::new(Arc::new(InMemoryStore::new()), Arc::new(FakeSource::default()));
        let err = resolver.resolve("Unknown Widgets Limited").await.unwrap_err();
        assert!(matches!(err, ScoreError::NotFound(name) if name == "Unknown Widgets Limited"));
    }

    #[tokio::test]
    async fn test_placeholder_hit_is_not_a_match() {
        let store = Arc::new(InMemoryStore::new());
        let source = Arc::new(FakeSource::default().with_placeholder(
            "Search everywhere: Unknown Widgets",
            "/full-text-search/?q=Unknown+Widgets",
        ));
        let resolver = Resolver::new(store.clone(), source.clone());

        let err = resolver.resolve("Unknown Widgets Limited").await.unwrap_err();
        assert!(matches!(err, ScoreError::NotFound(name) if name == "Unknown Widgets Limited"));
        assert_eq!(source.calls(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_placeholder_ranked_first_is_skipped() {
        let store = Arc::new(InMemoryStore::new());
        let source = Arc::new(
            FakeSource::default()
                // Ties with the company hit and is listed first.
                .with_placeholder("Tata Motors Ltd", "/full-text-search/?q=Tata+Motors")
                .with_company("Tata Motors Ltd", "/company/TATAMOTORS/", stored("x", "3,10,000")),
        );
        let resolver = Resolver::new(store.clone(), source);

        let resolution = resolver.resolve("Tata Motors Limited").await.unwrap();
        assert_eq!(resolution.record.name, "Tata Motors Ltd");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exact_single_token_match_uses_store() {
        let store = Arc::new(InMemoryStore::with_records([stored("Infosys", "6,33,542")]));
        let source = Arc::new(FakeSource::default().with_company(
            "Infosys Ltd",
            "/company/INFY/",
            stored("ignored", "1"),
        ));
        let resolver = Resolver::new(store, source.clone());

        let resolution = resolver.resolve("Infosys").await.unwrap();
        assert_eq!(resolution.relevance, 1.0);
        assert_eq!(resolution.origin, Origin::Cache);
        assert_eq!(resolution.record.name, "Infosys");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_only() {
        let resolver = Resolver::cache_only(Arc::new(InMemoryStore::new()));
        let err = resolver.resolve("Infosys").await.unwrap_err();
        assert!(matches!(err, ScoreError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_unparsable_market_cap_is_unknown() {
        let store = Arc::new(InMemoryStore::with_records([stored("Zomato Ltd", "n/a")]));
        let resolver = Resolver::new(store, Arc::new(FakeSource::default()));
        let resolution = resolver.resolve("Zomato Ltd").await.unwrap();
        assert_eq!(resolution.category, MarketCapCategory::Unknown);
        assert_eq!(resolution.category.to_string(), "Unknown Category");
    }

    #[tokio::test]
    async fn test_threshold() {
        let store = Arc::new(InMemoryStore::with_records([stored("Tata Steel Ltd", "1")]));
        let resolver = Resolver::new(store, Arc::new(FakeSource::default())).with_threshold(0.5);
        assert_eq!(resolver.threshold(), 0.5);
        let resolution = resolver.resolve("Tata").await.unwrap();
        assert_eq!(resolution.origin, Origin::Cache);
    }
}
