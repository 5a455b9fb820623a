//! HTTP retrieval for the scraping pipelines
//!
//! Two transport strategies per request: proxied through the rotating-session
//! forward proxy (tried first whenever credentials are configured) and direct
//! with browser-like headers. Proxy failure falls back to direct where a
//! direct path exists; missing credentials skip the proxy entirely.
//!
//! The proxied path builds a fresh client per call because the session suffix
//! in the proxy username changes on every request. Certificate validation is
//! relaxed on that path only - the proxy terminates TLS.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, PRAGMA, REFERER,
    USER_AGENT,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::product::Platform;
use crate::infrastructure::config::{ProxyConfig, ScraperConfig};

/// Transport-layer failure for one platform's pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{platform}: request failed: {source}")]
    Transport {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },

    #[error("{platform}: HTTP status {status} for {url}")]
    Status {
        platform: Platform,
        status: StatusCode,
        url: String,
    },

    #[error("{platform}: proxy credentials not configured and platform has no direct path")]
    ProxyUnavailable { platform: Platform },

    #[error("{platform}: failed to build HTTP client: {source}")]
    ClientBuild {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },
}

/// Whether a fetch is for a search listing or a single product page.
/// Budgets and direct-path availability differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Search,
    Product,
}

/// Session-id generation as an injected capability so tests can supply
/// deterministic ids.
pub trait SessionIds: Send + Sync {
    fn next_session_id(&self) -> String;
}

/// Default generator: a short random alphanumeric token per call, so
/// consecutive calls exit through different proxy sessions.
#[derive(Debug, Default)]
pub struct RandomSessionIds;

impl SessionIds for RandomSessionIds {
    fn next_session_id(&self) -> String {
        (0..7).map(|_| fastrand::alphanumeric()).collect()
    }
}

/// Raw-HTML retrieval seam between the aggregation layer and the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the platform's search listing page for a free-text query.
    async fn fetch_search_page(
        &self,
        platform: Platform,
        query: &str,
    ) -> Result<String, FetchError>;

    /// Fetch a single product page by URL.
    async fn fetch_product_page(
        &self,
        platform: Platform,
        url: &str,
    ) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher implementing the proxied-then-direct policy.
pub struct HttpClient {
    direct: Client,
    headers: HeaderMap,
    config: ScraperConfig,
    proxy: ProxyConfig,
    sessions: Arc<dyn SessionIds>,
}

impl HttpClient {
    pub fn new(config: ScraperConfig, proxy: ProxyConfig) -> Result<Self> {
        Self::with_session_ids(config, proxy, Arc::new(RandomSessionIds))
    }

    pub fn with_session_ids(
        config: ScraperConfig,
        proxy: ProxyConfig,
        sessions: Arc<dyn SessionIds>,
    ) -> Result<Self> {
        let headers = Self::browser_headers(&config.user_agent)?;
        let direct = Client::builder()
            .default_headers(headers.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()
            .context("Failed to build direct HTTP client")?;

        Ok(Self { direct, headers, config, proxy, sessions })
    }

    /// Headers that make the request look like an ordinary browser page
    /// load; several of the target sites reject bare client requests.
    fn browser_headers(user_agent: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent).context("Invalid user agent")?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        Ok(headers)
    }

    /// Platforms with a working direct (unproxied) strategy for this kind
    /// of fetch. Snapdeal and Myntra listings are proxy-only; without
    /// credentials they simply contribute zero results.
    fn has_direct(platform: Platform, kind: FetchKind) -> bool {
        match kind {
            FetchKind::Search => matches!(platform, Platform::Amazon | Platform::Flipkart),
            FetchKind::Product => true,
        }
    }

    fn timeout_for(&self, platform: Platform, kind: FetchKind) -> Duration {
        match kind {
            FetchKind::Search => self.config.search_timeout_secs.for_platform(platform),
            FetchKind::Product => self.config.product_timeout_secs.for_platform(platform),
        }
    }

    async fn fetch(
        &self,
        platform: Platform,
        url: &str,
        kind: FetchKind,
    ) -> Result<String, FetchError> {
        let timeout = self.timeout_for(platform, kind);

        if self.proxy.is_configured() {
            match self.fetch_proxied(platform, url, timeout).await {
                Ok(html) => return Ok(html),
                Err(err) if Self::has_direct(platform, kind) => {
                    warn!("{platform} proxy fetch failed, falling back to direct: {err}");
                }
                Err(err) => return Err(err),
            }
        } else if !Self::has_direct(platform, kind) {
            debug!("{platform}: proxy credentials not configured, skipping");
            return Err(FetchError::ProxyUnavailable { platform });
        } else {
            debug!("{platform}: proxy credentials not configured, fetching directly");
        }

        let direct_timeout = match kind {
            FetchKind::Search => timeout,
            FetchKind::Product => Duration::from_secs(self.config.direct_timeout_secs),
        };
        self.fetch_direct(platform, url, direct_timeout).await
    }

    async fn fetch_proxied(
        &self,
        platform: Platform,
        url: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let session_id = self.sessions.next_session_id();
        let username = self
            .proxy
            .session_username(&session_id)
            .ok_or(FetchError::ProxyUnavailable { platform })?;
        let password = self.proxy.password.clone().unwrap_or_default();

        let proxy = reqwest::Proxy::all(self.proxy.endpoint())
            .map_err(|source| FetchError::ClientBuild { platform, source })?
            .basic_auth(&username, &password);

        // Fresh client per call: the session suffix differs every time
        let client = Client::builder()
            .default_headers(self.headers.clone())
            .proxy(proxy)
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuild { platform, source })?;

        debug!("{platform}: fetching via proxy session {session_id}: {url}");
        self.send(&client, platform, url, None).await
    }

    async fn fetch_direct(
        &self,
        platform: Platform,
        url: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        debug!("{platform}: fetching directly: {url}");
        self.send(&self.direct, platform, url, Some(timeout)).await
    }

    async fn send(
        &self,
        client: &Client,
        platform: Platform,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<String, FetchError> {
        let mut request = client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        // Snapdeal and Myntra check the referer on listing requests
        if matches!(platform, Platform::Snapdeal | Platform::Myntra) {
            if let Ok(referer) = HeaderValue::from_str(&format!("{}/", platform.base_url())) {
                request = request.header(REFERER, referer);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|source| FetchError::Transport { platform, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { platform, status, url: url.to_string() });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { platform, source })?;

        debug!("{platform}: fetched {} chars from {url}", body.len());
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_search_page(
        &self,
        platform: Platform,
        query: &str,
    ) -> Result<String, FetchError> {
        let url = platform.search_url(query);
        self.fetch(platform, &url, FetchKind::Search).await
    }

    async fn fetch_product_page(
        &self,
        platform: Platform,
        url: &str,
    ) -> Result<String, FetchError> {
        self.fetch(platform, url, FetchKind::Product).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSessions(AtomicUsize);

    impl SessionIds for CountingSessions {
        fn next_session_id(&self) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            "fixed00".to_string()
        }
    }

    #[test]
    fn client_creation_succeeds_with_defaults() {
        let client = HttpClient::new(ScraperConfig::default(), ProxyConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn direct_path_availability() {
        assert!(HttpClient::has_direct(Platform::Amazon, FetchKind::Search));
        assert!(HttpClient::has_direct(Platform::Flipkart, FetchKind::Search));
        assert!(!HttpClient::has_direct(Platform::Snapdeal, FetchKind::Search));
        assert!(!HttpClient::has_direct(Platform::Myntra, FetchKind::Search));
        assert!(HttpClient::has_direct(Platform::Myntra, FetchKind::Product));
    }

    #[test]
    fn random_session_ids_are_alphanumeric_and_fresh() {
        let ids = RandomSessionIds;
        let a = ids.next_session_id();
        let b = ids.next_session_id();
        assert_eq!(a.len(), 7);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        // Two draws colliding would be a one-in-billions event
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn missing_credentials_go_direct_without_drawing_a_session() {
        let sessions = Arc::new(CountingSessions(AtomicUsize::new(0)));
        let client = HttpClient::with_session_ids(
            ScraperConfig::default(),
            ProxyConfig::default(),
            Arc::clone(&sessions) as Arc<dyn SessionIds>,
        )
        .unwrap();

        // Product fetches have a direct path on every platform. An
        // unroutable loopback port fails at the transport layer, which is
        // past the point where a proxied attempt would have drawn a session.
        let err = client
            .fetch_product_page(Platform::Amazon, "http://127.0.0.1:9/dp/B0")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(sessions.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn proxy_only_search_without_credentials_fails_fast() {
        let client = HttpClient::new(ScraperConfig::default(), ProxyConfig::default()).unwrap();
        let err = client
            .fetch_search_page(Platform::Snapdeal, "shoes")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ProxyUnavailable { platform: Platform::Snapdeal }));
    }
}
