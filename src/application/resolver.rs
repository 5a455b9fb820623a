//! URL routing and single-product resolution
//!
//! A direct product URL is classified by hostname substring against a fixed
//! ordered list, then dispatched to that platform's fetch+extract path. Every
//! failure below this layer - unsupported host, fetch error, extraction
//! rejection - collapses to `None`; callers only learn "could not resolve".

use std::sync::Arc;

use anyhow::Result;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::domain::product::{Platform, ScrapedProduct};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::SiteParsers;

/// Hostname patterns in match order; first hit wins. `amazon` is
/// deliberately loose to cover the country storefronts (amazon.in,
/// amazon.com, ...).
const HOST_PATTERNS: [(&str, Platform); 4] = [
    ("flipkart.com", Platform::Flipkart),
    ("amazon", Platform::Amazon),
    ("snapdeal.com", Platform::Snapdeal),
    ("myntra.com", Platform::Myntra),
];

/// Classify a product URL by hostname. `None` means unsupported platform,
/// which is a signal, not an error.
pub fn classify_url(url: &str) -> Option<Platform> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    HOST_PATTERNS
        .iter()
        .find(|(pattern, _)| host.contains(pattern))
        .map(|(_, platform)| *platform)
}

pub struct ProductResolver {
    fetcher: Arc<dyn PageFetcher>,
    parsers: Arc<SiteParsers>,
}

impl ProductResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            fetcher,
            parsers: Arc::new(SiteParsers::new()?),
        })
    }

    /// Share an already-constructed parser set.
    pub fn with_parsers(fetcher: Arc<dyn PageFetcher>, parsers: Arc<SiteParsers>) -> Self {
        Self { fetcher, parsers }
    }

    /// Resolve a direct product URL into a full record.
    ///
    /// `None` covers every failure mode: unknown host (no fetch is even
    /// attempted), transport failure, and a page from which neither price
    /// could be extracted.
    pub async fn resolve(&self, url: &str) -> Option<ScrapedProduct> {
        let Some(platform) = classify_url(url) else {
            debug!("unsupported platform for URL: {url}");
            return None;
        };
        debug!("{platform}: resolving product URL: {url}");

        match self.fetcher.fetch_product_page(platform, url).await {
            Ok(body) => {
                let product = parse_product_page(platform, &self.parsers, &body, url);
                if product.is_none() {
                    warn!("{platform}: page fetched but no product could be extracted: {url}");
                }
                product
            }
            Err(err) => {
                warn!("{platform}: product fetch failed: {err}");
                None
            }
        }
    }
}

// Synchronous on purpose: `Html` is not Send.
fn parse_product_page(
    platform: Platform,
    parsers: &SiteParsers,
    body: &str,
    url: &str,
) -> Option<ScrapedProduct> {
    let document = Html::parse_document(body);
    parsers.parse_product(platform, &document, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_hosts() {
        assert_eq!(
            classify_url("https://www.flipkart.com/p/xyz"),
            Some(Platform::Flipkart)
        );
        assert_eq!(
            classify_url("https://www.amazon.in/dp/B0CHX1W1XY"),
            Some(Platform::Amazon)
        );
        assert_eq!(
            classify_url("https://www.amazon.com/dp/B0CHX1W1XY"),
            Some(Platform::Amazon)
        );
        assert_eq!(
            classify_url("https://www.snapdeal.com/product/x/1"),
            Some(Platform::Snapdeal)
        );
        assert_eq!(
            classify_url("https://www.myntra.com/jeans/levis/1/buy"),
            Some(Platform::Myntra)
        );
    }

    #[test]
    fn unknown_hosts_and_garbage_yield_none() {
        assert_eq!(classify_url("https://www.ebay.com/itm/123"), None);
        assert_eq!(classify_url("not a url"), None);
        assert_eq!(classify_url(""), None);
    }

    #[test]
    fn classification_uses_the_hostname_not_the_path() {
        // A path mentioning another platform must not confuse routing
        assert_eq!(
            classify_url("https://www.ebay.com/search?q=amazon+echo"),
            None
        );
    }

    #[test]
    fn flipkart_is_matched_before_the_loose_amazon_pattern() {
        // Order in HOST_PATTERNS is part of the contract
        assert_eq!(HOST_PATTERNS[0].1, Platform::Flipkart);
        assert_eq!(HOST_PATTERNS[1].1, Platform::Amazon);
    }
}
