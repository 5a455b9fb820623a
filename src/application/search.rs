//! Concurrent multi-platform search aggregation
//!
//! One fetch+extract pipeline per platform, launched concurrently and
//! collected under a single global deadline. Per-platform failures are
//! absorbed (that platform contributes nothing); the deadline stops the
//! *waiting*, not the in-flight requests - a pipeline that settles late is
//! simply never observed. Results are merged and sorted ascending by price;
//! ties keep discovery order.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use scraper::Html;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::product::{Platform, SearchResultItem};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::SiteParsers;

/// Aggregator-level fault. Distinct from "every platform came back empty",
/// which is an ordinary empty result.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("failed to construct platform parsers: {0}")]
    ParserConstruction(#[source] anyhow::Error),
}

/// Degraded fallback source consulted only when the live scrape path
/// definitively returns nothing - typically previously persisted records.
/// Never merged with partial live results.
#[async_trait]
pub trait StoredResults: Send + Sync {
    async fn recent_results(&self, query: &str) -> Vec<SearchResultItem>;
}

pub struct SearchAggregator {
    fetcher: Arc<dyn PageFetcher>,
    parsers: Arc<SiteParsers>,
    deadline: Duration,
    fallback: Option<Arc<dyn StoredResults>>,
}

impl SearchAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self, AggregationError> {
        let parsers = SiteParsers::new().map_err(AggregationError::ParserConstruction)?;
        Ok(Self {
            fetcher,
            parsers: Arc::new(parsers),
            deadline: ScraperConfig::default().search_deadline(),
            fallback: None,
        })
    }

    /// Override the global fan-out deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Attach a stored-records fallback for the all-platforms-empty case.
    pub fn with_fallback(mut self, fallback: Arc<dyn StoredResults>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn parsers(&self) -> Arc<SiteParsers> {
        Arc::clone(&self.parsers)
    }

    /// Search all platforms for a free-text query.
    ///
    /// Never fails on account of any platform; an empty vec is a valid,
    /// non-error outcome.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, AggregationError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        info!("Searching all platforms for: {query}");
        let deadline = Instant::now() + self.deadline;

        let mut pipelines = FuturesUnordered::new();
        for platform in Platform::SEARCHABLE {
            let fetcher = Arc::clone(&self.fetcher);
            let parsers = Arc::clone(&self.parsers);
            let query = query.to_string();
            pipelines.push(tokio::spawn(async move {
                run_platform_pipeline(platform, &*fetcher, &parsers, &query).await
            }));
        }

        let mut results: Vec<SearchResultItem> = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, pipelines.next()).await {
                Ok(Some(Ok(items))) => results.extend(items),
                Ok(Some(Err(join_err))) => warn!("platform pipeline panicked: {join_err}"),
                Ok(None) => break,
                Err(_) => {
                    // Deadline: stop waiting. Unfinished pipelines stay
                    // detached and their eventual output is discarded.
                    warn!(
                        "search deadline reached, ignoring {} unfinished platform(s)",
                        pipelines.len()
                    );
                    break;
                }
            }
        }

        // Cheapest first; sort_by is stable so ties keep discovery order
        results.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));

        if results.is_empty() {
            if let Some(fallback) = &self.fallback {
                info!("live search empty, consulting stored results");
                return Ok(fallback.recent_results(query).await);
            }
        }

        info!("Total results from all platforms: {}", results.len());
        Ok(results)
    }
}

/// One platform's fetch+extract pipeline. Failures collapse to an empty
/// contribution here; nothing propagates past this function.
async fn run_platform_pipeline(
    platform: Platform,
    fetcher: &dyn PageFetcher,
    parsers: &SiteParsers,
    query: &str,
) -> Vec<SearchResultItem> {
    match fetcher.fetch_search_page(platform, query).await {
        Ok(body) => {
            let items = parse_listing(platform, parsers, &body);
            info!("{platform}: {} products", items.len());
            items
        }
        Err(err) => {
            warn!("{platform} search failed: {err}");
            Vec::new()
        }
    }
}

// Kept synchronous: `Html` is not Send and must never live across an await.
fn parse_listing(platform: Platform, parsers: &SiteParsers, body: &str) -> Vec<SearchResultItem> {
    let document = Html::parse_document(body);
    let items = parsers.parse_search(platform, &document);
    debug!("{platform}: parsed {} accepted items", items.len());
    items
}
