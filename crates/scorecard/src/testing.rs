//! In-crate fakes for resolver and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use scorecard_core::{
    CanonicalRecord, CompanyDocument, CompanyHit, LiveSource, PeerSet, Result, ScoreError,
    relevance::text_score,
};

/// Live source answering from a fixed company list.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    companies: Vec<(CompanyHit, CanonicalRecord)>,
    failing: Vec<String>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn with_company(mut self, name: &str, url: &str, record: CanonicalRecord) -> Self {
        let hit = CompanyHit {
            id: Some(self.companies.len() as i64 + 1),
            name: name.to_string(),
            url: url.to_string(),
        };
        self.companies.push((hit, record));
        self
    }

    /// Adds a catch-all search entry without an id, as directory searches
    /// return when nothing matches. Its page fetches as an empty record.
    pub(crate) fn with_placeholder(mut self, name: &str, url: &str) -> Self {
        let hit = CompanyHit {
            id: None,
            name: name.to_string(),
            url: url.to_string(),
        };
        self.companies.push((hit, CanonicalRecord::default()));
        self
    }

    /// Makes page fetches for `url` fail with a network error.
    pub(crate) fn with_failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveSource for FakeSource {
    fn name(&self) -> &str {
        "Fake"
    }

    /// Hits scoring at least 1.0, best first.
    async fn search(&self, query: &str) -> Result<Vec<CompanyHit>> {
        let mut ranked: Vec<(f64, &CompanyHit)> = self
            .companies
            .iter()
            .map(|(hit, _)| (text_score(query, &hit.name), hit))
            .filter(|(score, _)| *score >= 1.0)
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(ranked.into_iter().map(|(_, hit)| hit.clone()).collect())
    }

    async fn fetch_document(&self, locator: &str) -> Result<CompanyDocument> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|url| url == locator) {
            return Err(ScoreError::Network(format!("HTTP 503 from {locator}")));
        }
        self.companies
            .iter()
            .find(|(hit, _)| hit.url == locator)
            .map(|(_, record)| CompanyDocument {
                record: record.clone(),
                warehouse_id: None,
            })
            .ok_or_else(|| ScoreError::NotFound(locator.to_string()))
    }

    async fn fetch_peers(&self, _warehouse_id: &str) -> Result<PeerSet> {
        Ok(PeerSet::default())
    }
}
