//! PriceWise core - multi-platform product search and price-scrape aggregation
//!
//! This crate implements the scraping core of a price-tracking application:
//! concurrent search fan-out across several e-commerce platforms, selector
//! cascade extraction from their HTML, single-product resolution by URL, and
//! a sequential re-pricing pass for already-tracked products.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

// Re-export the common surface for callers
pub use application::resolver::{classify_url, ProductResolver};
pub use application::refresh::{PriceRefresher, RefreshReport, TrackedProduct};
pub use application::search::{AggregationError, SearchAggregator, StoredResults};
pub use domain::product::{Platform, PricePoint, ScrapedProduct, SearchResultItem};
pub use infrastructure::http_client::{FetchError, HttpClient, PageFetcher};
