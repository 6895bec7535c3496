//! Live source trait for re-extracting instruments.
//!
//! A [`LiveSource`] is an external instrument directory that can search by
//! name, fetch a structured page for a result, and fetch the peer table the
//! page refers to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::warn;

use crate::{
    error::Result,
    types::{CanonicalRecord, CompanyDocument, PeerSet},
};

/// One search result from a live source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyHit {
    /// Source-specific identifier, when provided.
    #[serde(default)]
    pub id: Option<i64>,
    /// Canonical instrument name; the upsert key.
    pub name: String,
    /// Locator of the instrument page.
    pub url: String,
}

impl CompanyHit {
    /// Returns true for a hit naming a company page. Directory searches also
    /// return catch-all entries (such as a full-text search link) that carry
    /// no id.
    #[must_use]
    pub const fn is_company(&self) -> bool {
        self.id.is_some()
    }
}

/// External instrument directory used to refresh stale records.
#[async_trait]
pub trait LiveSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "Screener").
    fn name(&self) -> &str;

    /// Searches instruments by (cleaned) name, best candidates first.
    async fn search(&self, query: &str) -> Result<Vec<CompanyHit>>;

    /// Fetches and extracts the page at `locator`.
    async fn fetch_document(&self, locator: &str) -> Result<CompanyDocument>;

    /// Fetches the peer table identified by a token found on a page.
    async fn fetch_peers(&self, warehouse_id: &str) -> Result<PeerSet>;

    /// Fetches a complete record for a search hit.
    ///
    /// Default implementation fetches the page, then its peer table when the
    /// page names one. A failed peer fetch leaves the record without peers.
    /// The record is renamed to the hit's canonical name.
    async fn fetch_record(&self, hit: &CompanyHit) -> Result<CanonicalRecord> {
        let document = self.fetch_document(&hit.url).await?;
        let mut record = document.record;

        if let Some(warehouse_id) = document.warehouse_id.as_deref() {
            match self.fetch_peers(warehouse_id).await {
                Ok(peers) => record.peers = peers,
                Err(e) => {
                    warn!(
                        source = self.name(),
                        instrument = %hit.name,
                        error = %e,
                        "Peer fetch failed, keeping record without peers"
                    );
                }
            }
        }

        record.name = hit.name.clone();
        record.url = Some(hit.url.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_hit_is_not_company() {
        let hit: CompanyHit = serde_json::from_str(
            r#"{"id": null, "name": "Search everywhere: Widgets", "url": "/full-text-search/?q=Widgets"}"#,
        )
        .unwrap();
        assert!(!hit.is_company());

        let hit: CompanyHit =
            serde_json::from_str(r#"{"id": 42, "name": "Infosys Ltd", "url": "/company/INFY/"}"#).unwrap();
        assert!(hit.is_company());
    }
}
