//! Product records produced by the scraping pipelines
//!
//! `ScrapedProduct` is the full single-product record handed to the
//! persistence collaborator; `SearchResultItem` is the subset shown in a
//! search result list. Neither is cached or persisted by this crate - both
//! are built fresh on every request and handed off immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::price;

/// Maximum length a scraped title is truncated to.
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum number of items accepted from one platform's listing page.
pub const MAX_RESULTS_PER_PLATFORM: usize = 10;

/// The e-commerce platforms the scraper knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Amazon,
    Flipkart,
    Snapdeal,
    Myntra,
    Unknown,
}

impl Platform {
    /// Platforms that participate in a search fan-out.
    pub const SEARCHABLE: [Platform; 4] = [
        Platform::Amazon,
        Platform::Flipkart,
        Platform::Snapdeal,
        Platform::Myntra,
    ];

    /// Display name used in result records and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Flipkart => "Flipkart",
            Platform::Snapdeal => "Snapdeal",
            Platform::Myntra => "Myntra",
            Platform::Unknown => "Unknown",
        }
    }

    /// Build the platform's native search URL for a free-text query.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        match self {
            Platform::Amazon => format!("https://www.amazon.in/s?k={encoded}"),
            Platform::Flipkart => format!("https://www.flipkart.com/search?q={encoded}"),
            // Snapdeal wants the keyword twice and a pile of empty state params
            Platform::Snapdeal => format!(
                "https://www.snapdeal.com/search?keyword={encoded}&santizedKeyword=&catId=&categoryId=0&suggested=false&vertical=&noOfResults=20&searchState=&clickSrc=&lastKeyword=&prodCatId=&changeBackToAll=false&foundInAll=false&categoryName=&remediation=false&searchKeyword={encoded}"
            ),
            // Myntra searches by path segment rather than a query parameter
            Platform::Myntra => format!("https://www.myntra.com/{encoded}"),
            Platform::Unknown => String::new(),
        }
    }

    /// Base URL used to resolve relative product links from listing pages.
    pub fn base_url(&self) -> &'static str {
        match self {
            Platform::Amazon => "https://www.amazon.in",
            Platform::Flipkart => "https://www.flipkart.com",
            Platform::Snapdeal => "https://www.snapdeal.com",
            Platform::Myntra => "https://www.myntra.com",
            Platform::Unknown => "",
        }
    }

    /// Default star rating reported when the markup carries none.
    pub fn default_stars(&self) -> f64 {
        match self {
            Platform::Amazon => 4.5,
            Platform::Flipkart => 4.2,
            Platform::Snapdeal => 4.0,
            Platform::Myntra => 4.3,
            Platform::Unknown => 0.0,
        }
    }

    /// Default review count reported when the markup carries none.
    pub fn default_reviews_count(&self) -> u32 {
        match self {
            Platform::Amazon | Platform::Flipkart => 100,
            Platform::Snapdeal => 50,
            Platform::Myntra => 75,
            Platform::Unknown => 0,
        }
    }

    /// Default category label for single-product records.
    pub fn default_category(&self) -> &'static str {
        match self {
            Platform::Myntra => "Fashion",
            _ => "category",
        }
    }

    /// Default list-display rating string for search results.
    pub fn default_rating(&self) -> &'static str {
        match self {
            Platform::Myntra => "4.2",
            _ => "4.0",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One observed price with its observation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub date: DateTime<Utc>,
}

impl PricePoint {
    pub fn now(price: f64) -> Self {
        Self { price, date: Utc::now() }
    }
}

/// Full product record extracted from a single product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    /// Canonical product URL - identity key within a platform
    pub url: String,
    pub platform: Platform,
    /// May be empty when every title selector missed
    pub title: String,
    pub current_price: f64,
    pub original_price: f64,
    pub currency: String,
    pub image: String,
    pub is_out_of_stock: bool,
    pub description: String,
    pub category: String,
    pub reviews_count: u32,
    pub stars: f64,
    /// Percentage saved versus the original price, rounded
    pub discount_rate: i64,
}

impl ScrapedProduct {
    /// Assemble a record from raw extracted fields, enforcing the price
    /// fallback rule: each price falls back to the other, and a candidate
    /// with neither is rejected outright.
    #[allow(clippy::too_many_arguments)]
    pub fn from_extracted(
        url: &str,
        platform: Platform,
        title: Option<String>,
        current_price: Option<f64>,
        original_price: Option<f64>,
        currency: Option<String>,
        image: Option<String>,
        is_out_of_stock: bool,
        description: Option<String>,
    ) -> Option<Self> {
        let current = current_price.or(original_price)?;
        let original = original_price.or(current_price)?;

        Some(Self {
            url: url.to_string(),
            platform,
            title: price::truncate_title(title.unwrap_or_default().trim()),
            current_price: current,
            original_price: original,
            currency: currency.unwrap_or_else(|| "₹".to_string()),
            image: price::normalize_image_url(&image.unwrap_or_default()),
            is_out_of_stock,
            description: description.unwrap_or_default(),
            category: platform.default_category().to_string(),
            reviews_count: platform.default_reviews_count(),
            stars: platform.default_stars(),
            discount_rate: price::discount_rate(original, current),
        })
    }
}

/// List-display subset used for search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub price: f64,
    pub url: String,
    pub image: String,
    pub platform: Platform,
    pub rating: String,
    pub currency: String,
}

impl SearchResultItem {
    /// Acceptance rule for list items: a positive price, a non-empty title
    /// and a non-empty URL must all be present.
    pub fn is_acceptable(&self) -> bool {
        self.price > 0.0 && !self.title.is_empty() && !self.url.is_empty()
    }
}
