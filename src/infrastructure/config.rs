//! Scraper configuration
//!
//! Two tiers: tunables with sensible defaults (timeouts, caps, the global
//! search deadline) and externally supplied proxy credentials read from the
//! environment. Absent or placeholder credentials are a recognized state,
//! not an error - fetching downgrades to the direct path where one exists.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::product::Platform;

/// Environment variable holding the forward-proxy username.
pub const PROXY_USERNAME_VAR: &str = "BRIGHT_DATA_USERNAME";
/// Environment variable holding the forward-proxy password.
pub const PROXY_PASSWORD_VAR: &str = "BRIGHT_DATA_PASSWORD";

/// Rotating-session forward proxy endpoint. Host and port are fixed;
/// only the credentials come from outside.
pub const PROXY_HOST: &str = "brd.superproxy.io";
pub const PROXY_PORT: u16 = 22225;

/// Forward-proxy credentials, possibly unconfigured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Read credentials from the environment.
    pub fn from_env() -> Self {
        Self {
            username: std::env::var(PROXY_USERNAME_VAR).ok(),
            password: std::env::var(PROXY_PASSWORD_VAR).ok(),
        }
    }

    /// Both credentials present and neither a placeholder.
    pub fn is_configured(&self) -> bool {
        fn usable(value: &Option<String>) -> bool {
            match value {
                Some(v) => !v.is_empty() && v != "undefined",
                None => false,
            }
        }
        usable(&self.username) && usable(&self.password)
    }

    /// Proxy username with a per-call session suffix appended, so the
    /// proxy assigns a fresh exit session for this request.
    pub fn session_username(&self, session_id: &str) -> Option<String> {
        self.username
            .as_deref()
            .map(|u| format!("{u}-session-{session_id}"))
    }

    /// Proxy endpoint URL for reqwest.
    pub fn endpoint(&self) -> String {
        format!("http://{PROXY_HOST}:{PROXY_PORT}")
    }
}

/// Timeout budgets and result caps for the scraping pipelines.
///
/// Search budgets are deliberately asymmetric and tight: one slow platform
/// must not be able to stall the whole fan-out. Single-product budgets are
/// looser because only one page is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Per-platform search-page timeouts in seconds
    pub search_timeout_secs: PlatformTimeouts,
    /// Per-platform product-page timeouts in seconds
    pub product_timeout_secs: PlatformTimeouts,
    /// Timeout for direct (unproxied) fallback requests in seconds
    pub direct_timeout_secs: u64,
    /// Global deadline for one search fan-out in seconds
    pub search_deadline_secs: u64,
    /// Browser-like User-Agent sent on every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformTimeouts {
    pub amazon: u64,
    pub flipkart: u64,
    pub snapdeal: u64,
    pub myntra: u64,
}

impl PlatformTimeouts {
    pub fn for_platform(&self, platform: Platform) -> Duration {
        let secs = match platform {
            Platform::Amazon => self.amazon,
            Platform::Flipkart => self.flipkart,
            Platform::Snapdeal => self.snapdeal,
            Platform::Myntra => self.myntra,
            Platform::Unknown => self.amazon,
        };
        Duration::from_secs(secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_timeout_secs: PlatformTimeouts {
                amazon: 12,
                flipkart: 10,
                snapdeal: 12,
                myntra: 15,
            },
            product_timeout_secs: PlatformTimeouts {
                amazon: 20,
                flipkart: 30,
                snapdeal: 10,
                myntra: 10,
            },
            direct_timeout_secs: 15,
            search_deadline_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn search_deadline(&self) -> Duration {
        Duration::from_secs(self.search_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_are_unconfigured() {
        let config = ProxyConfig::default();
        assert!(!config.is_configured());
    }

    #[test]
    fn placeholder_credentials_are_unconfigured() {
        let config = ProxyConfig {
            username: Some("undefined".to_string()),
            password: Some("undefined".to_string()),
        };
        assert!(!config.is_configured());

        let empty = ProxyConfig {
            username: Some(String::new()),
            password: Some("secret".to_string()),
        };
        assert!(!empty.is_configured());
    }

    #[test]
    fn session_suffix_is_appended_to_username() {
        let config = ProxyConfig {
            username: Some("user123".to_string()),
            password: Some("secret".to_string()),
        };
        assert_eq!(
            config.session_username("ab12cd").as_deref(),
            Some("user123-session-ab12cd")
        );
    }

    #[test]
    fn search_budgets_are_tighter_than_product_budgets_for_slow_sites() {
        let config = ScraperConfig::default();
        assert!(config.search_timeout_secs.flipkart <= 12);
        assert!(config.search_deadline_secs == 15);
    }
}
