//! Application module - the operations callers actually invoke
//!
//! Search fan-out, single-product resolution by URL, and the sequential
//! re-pricing pass over already-tracked products.

pub mod refresh;
pub mod resolver;
pub mod search;

pub use refresh::{PriceRefresher, RefreshReport, TrackedProduct};
pub use resolver::{classify_url, ProductResolver};
pub use search::{AggregationError, SearchAggregator, StoredResults};
