//! Sequential re-pricing pass over tracked products
//!
//! Unlike interactive search this path is deliberately *not* concurrent:
//! items are processed one at a time with a fixed inter-item delay, so
//! repeated hits on the same platform look less like automation. A scrape
//! that fails carries the previous price forward as a fresh history point
//! rather than leaving a gap.
//!
//! The scheduling trigger (cron or otherwise) lives outside this crate; the
//! caller hands in the tracked products and persists the report.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout, Instant};
use tracing::{info, warn};

use crate::application::resolver::ProductResolver;
use crate::domain::alerts::{self, PriceAlert, PriceSnapshot};
use crate::domain::price::{average_price, highest_price, lowest_price};
use crate::domain::product::{PricePoint, ScrapedProduct};

/// Default pause between consecutive items.
pub const DEFAULT_INTER_ITEM_DELAY: Duration = Duration::from_secs(3);
/// Default budget for one single-product scrape.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(45);

/// The stored state of one tracked product, as supplied by the persistence
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub url: String,
    pub title: String,
    pub current_price: f64,
    pub is_out_of_stock: bool,
    pub price_history: Vec<PricePoint>,
}

/// A successful re-scrape: fresh record, extended history, recomputed
/// statistics, and the alert the notification collaborator should consider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub product: ScrapedProduct,
    pub price_history: Vec<PricePoint>,
    pub lowest_price: f64,
    pub highest_price: f64,
    pub average_price: f64,
    pub alert: Option<PriceAlert>,
}

/// Scrape came back empty; the previous price was carried forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedProduct {
    pub url: String,
    pub title: String,
    pub carried_price: f64,
    pub price_history: Vec<PricePoint>,
}

/// The item's budget ran out or the pipeline misbehaved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedProduct {
    pub url: String,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RefreshReport {
    pub updated: Vec<ProductUpdate>,
    pub skipped: Vec<SkippedProduct>,
    pub failed: Vec<FailedProduct>,
    pub duration: Duration,
}

impl RefreshReport {
    pub fn total(&self) -> usize {
        self.updated.len() + self.skipped.len() + self.failed.len()
    }
}

pub struct PriceRefresher {
    resolver: ProductResolver,
    inter_item_delay: Duration,
    item_timeout: Duration,
}

impl PriceRefresher {
    pub fn new(resolver: ProductResolver) -> Self {
        Self {
            resolver,
            inter_item_delay: DEFAULT_INTER_ITEM_DELAY,
            item_timeout: DEFAULT_ITEM_TIMEOUT,
        }
    }

    /// Override pacing, mainly for tests.
    pub fn with_timing(mut self, inter_item_delay: Duration, item_timeout: Duration) -> Self {
        self.inter_item_delay = inter_item_delay;
        self.item_timeout = item_timeout;
        self
    }

    /// Re-scrape every tracked product, sequentially.
    pub async fn refresh_all(&self, tracked: &[TrackedProduct]) -> RefreshReport {
        let started = Instant::now();
        let mut report = RefreshReport::default();

        info!("Re-pricing pass over {} tracked product(s)", tracked.len());

        for (index, item) in tracked.iter().enumerate() {
            if index > 0 {
                sleep(self.inter_item_delay).await;
            }

            match timeout(self.item_timeout, self.resolver.resolve(&item.url)).await {
                Err(_) => {
                    warn!("{}: re-pricing timed out", item.url);
                    report.failed.push(FailedProduct {
                        url: item.url.clone(),
                        title: item.title.clone(),
                        error: format!(
                            "scrape timed out after {}s",
                            self.item_timeout.as_secs()
                        ),
                    });
                }
                Ok(None) => {
                    // Keep the history contiguous with the last known price
                    let mut history = item.price_history.clone();
                    history.push(PricePoint::now(item.current_price));
                    report.skipped.push(SkippedProduct {
                        url: item.url.clone(),
                        title: item.title.clone(),
                        carried_price: item.current_price,
                        price_history: history,
                    });
                }
                Ok(Some(scraped)) => {
                    report.updated.push(self.build_update(item, scraped));
                }
            }
        }

        report.duration = started.elapsed();
        info!(
            "Re-pricing pass done in {:.2}s: {} updated, {} skipped, {} failed",
            report.duration.as_secs_f64(),
            report.updated.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    fn build_update(&self, previous: &TrackedProduct, scraped: ScrapedProduct) -> ProductUpdate {
        // Alert classification looks at the history *before* this scrape
        let lowest_recorded = lowest_price(&previous.price_history);
        let alert = alerts::classify(
            &PriceSnapshot {
                price: previous.current_price,
                is_out_of_stock: previous.is_out_of_stock,
                discount_rate: 0,
            },
            &PriceSnapshot {
                price: scraped.current_price,
                is_out_of_stock: scraped.is_out_of_stock,
                discount_rate: scraped.discount_rate,
            },
            lowest_recorded,
        );

        let mut history = previous.price_history.clone();
        history.push(PricePoint::now(scraped.current_price));

        ProductUpdate {
            lowest_price: lowest_price(&history),
            highest_price: highest_price(&history),
            average_price: average_price(&history),
            price_history: history,
            product: scraped,
            alert,
        }
    }
}
