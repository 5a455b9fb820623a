//! Infrastructure module - HTTP transport, HTML parsing, config and logging

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;

pub use config::{ProxyConfig, ScraperConfig};
pub use http_client::{FetchError, HttpClient, PageFetcher};
