#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/scorecard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Live source for a screener-style company directory.
//!
//! [`ScreenerSource`] implements [`LiveSource`] over three endpoints:
//!
//! - `GET {base}/api/company/search/?q=..&v=3&fts=1` - JSON search results
//! - `GET {base}{url}` - company page HTML
//! - `GET {base}/api/company/{warehouse_id}/peers/` - peer table HTML
//!
//! # Example
//!
//! ```no_run
//! use scorecard_core::LiveSource;
//! use scorecard_live::ScreenerSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ScreenerSource::new("https://www.screener.in");
//!
//!     let hits = source.search("Infosys Ltd").await?;
//!     if let Some(hit) = hits.first() {
//!         let record = source.fetch_record(hit).await?;
//!         println!("{}: market cap {}", record.name, record.market_cap);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{StatusCode, header::RETRY_AFTER};
use scorecard_core::{CompanyDocument, CompanyHit, LiveSource, PeerSet, Result, ScoreError};
use scorecard_extract::{parse_company_page, parse_peers_page};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Source name used in logs and errors.
const SOURCE_NAME: &str = "Screener";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause before each peer-table request.
pub const DEFAULT_PEER_DELAY: Duration = Duration::from_secs(1);

/// Default minimum spacing between requests.
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(250);

/// Spaces out requests to the live site.
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Live source backed by a screener-style website.
#[derive(Debug, Clone)]
pub struct ScreenerSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    peer_delay: Duration,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ScreenerSource {
    /// Create a source for the site at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a source with a pre-configured HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            peer_delay: DEFAULT_PEER_DELAY,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause taken before each peer-table request.
    #[must_use]
    pub const fn with_peer_delay(mut self, delay: Duration) -> Self {
        self.peer_delay = delay;
        self
    }

    /// Set the minimum spacing between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a locator against the base URL. Absolute URLs pass through.
    #[must_use]
    pub fn url(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            locator.to_string()
        } else if locator.starts_with('/') {
            format!("{}{locator}", self.base_url)
        } else {
            format!("{}/{locator}", self.base_url)
        }
    }

    /// Sends a GET request and returns the body of a successful response.
    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String> {
        self.rate_limiter.lock().await.wait().await;

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ScoreError::RateLimited {
                source_name: SOURCE_NAME.to_string(),
                retry_after,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ScoreError::NotFound(response.url().to_string()));
        }
        if !status.is_success() {
            let url = response.url().to_string();
            return Err(ScoreError::Network(format!("HTTP {status} from {url}")));
        }

        response
            .text()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))
    }
}

#[async_trait]
impl LiveSource for ScreenerSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<CompanyHit>> {
        if query.trim().is_empty() {
            return Err(ScoreError::InvalidParameter("Empty search query".to_string()));
        }

        debug!(query, "Searching live source");
        let request = self
            .client
            .get(self.url("/api/company/search/"))
            .query(&[("q", query), ("v", "3"), ("fts", "1")]);
        let text = self.get_text(request).await?;

        let hits: Vec<CompanyHit> = serde_json::from_str(&text).map_err(|e| {
            warn!(query, error = %e, "Failed to decode search response");
            ScoreError::Parse(format!("search response: {e}"))
        })?;

        debug!(
            query,
            hits = hits.len(),
            companies = hits.iter().filter(|h| h.is_company()).count(),
            "Search results"
        );
        Ok(hits)
    }

    async fn fetch_document(&self, locator: &str) -> Result<CompanyDocument> {
        if locator.trim().is_empty() {
            return Err(ScoreError::InvalidParameter("Empty locator".to_string()));
        }

        let url = self.url(locator);
        debug!(url = %url, "Fetching company page");
        let html = self.get_text(self.client.get(&url)).await?;
        parse_company_page(&html)
    }

    async fn fetch_peers(&self, warehouse_id: &str) -> Result<PeerSet> {
        if warehouse_id.trim().is_empty() {
            return Err(ScoreError::InvalidParameter("Empty warehouse id".to_string()));
        }

        sleep(self.peer_delay).await;
        let url = self.url(&format!("/api/company/{warehouse_id}/peers/"));
        debug!(url = %url, "Fetching peers");
        let html = self.get_text(self.client.get(&url)).await?;
        parse_peers_page(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
<div data-warehouse-id="1234"></div>
<ul><li data-source="default"><span class="name">Market Cap</span><span class="value">₹ 8,500 Cr.</span></li></ul>
</body></html>"#;

    const PEERS: &str = r#"<table><tbody>
<tr data-row-company-id="1"><td>1.</td><td class="text"><a>Peer Co</a></td><td>100</td><td>15.5</td></tr>
</tbody><tfoot><tr><td></td><td>Median: 1 Co.</td><td>100</td><td>15.5</td></tr></tfoot></table>"#;

    fn source(server: &MockServer) -> ScreenerSource {
        ScreenerSource::new(server.uri())
            .with_peer_delay(Duration::ZERO)
            .with_rate_limit(Duration::ZERO)
    }

    #[test]
    fn test_url_joining() {
        let source = ScreenerSource::new("https://example.com/");
        assert_eq!(source.base_url(), "https://example.com");
        assert_eq!(source.url("/company/INFY/"), "https://example.com/company/INFY/");
        assert_eq!(source.url("company/INFY/"), "https://example.com/company/INFY/");
        assert_eq!(source.url("https://other.org/x"), "https://other.org/x");
    }

    #[tokio::test]
    async fn test_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/search/"))
            .and(query_param("q", "Infosys Ltd"))
            .and(query_param("v", "3"))
            .and(query_param("fts", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Infosys Ltd", "url": "/company/INFY/consolidated/"},
                {"id": null, "name": "Search everywhere: Infosys", "url": "/full-text-search/?q=Infosys"}
            ])))
            .mount(&server)
            .await;

        let hits = source(&server).search("Infosys Ltd").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, Some(1));
        assert_eq!(hits[0].url, "/company/INFY/consolidated/");
        assert_eq!(hits[1].id, None);
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/search/"))
            .and(query_param("q", "Unknown Widgets Ltd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let hits = source(&server).search("Unknown Widgets Ltd").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_placeholder_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/search/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": null, "name": "Search everywhere: Unknown Widgets", "url": "/full-text-search/?q=Unknown+Widgets"}
            ])))
            .mount(&server)
            .await;

        let hits = source(&server).search("Unknown Widgets Ltd").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits.iter().any(CompanyHit::is_company));
    }

    #[tokio::test]
    async fn test_fetch_record_with_peers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ABC/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/company/1234/peers/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PEERS))
            .mount(&server)
            .await;

        let hit = CompanyHit {
            id: Some(7),
            name: "ABC Ltd".to_string(),
            url: "/company/ABC/".to_string(),
        };
        let record = source(&server).fetch_record(&hit).await.unwrap();
        assert_eq!(record.name, "ABC Ltd");
        assert_eq!(record.url.as_deref(), Some("/company/ABC/"));
        assert_eq!(record.market_cap, "8,500");
        assert_eq!(record.peers.len(), 2);
        assert_eq!(record.peers.records()[0].pe, "15.5");
    }

    #[tokio::test]
    async fn test_peer_failure_keeps_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ABC/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/company/1234/peers/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let hit = CompanyHit {
            id: None,
            name: "ABC Ltd".to_string(),
            url: "/company/ABC/".to_string(),
        };
        let record = source(&server).fetch_record(&hit).await.unwrap();
        assert!(record.peers.is_empty());
        assert_eq!(record.market_cap, "8,500");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/LIMITED/"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/company/BROKEN/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source(&server);
        match source.fetch_document("/company/LIMITED/").await {
            Err(ScoreError::RateLimited { retry_after, .. }) => {
                assert_eq!(retry_after, Some(Duration::from_secs(30)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert!(matches!(
            source.fetch_document("/company/MISSING/").await,
            Err(ScoreError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch_document("/company/BROKEN/").await,
            Err(ScoreError::Network(_))
        ));
        assert!(matches!(
            source.fetch_document("  ").await,
            Err(ScoreError::InvalidParameter(_))
        ));
    }
}
