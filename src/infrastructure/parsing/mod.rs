//! Selector-cascade HTML extraction
//!
//! Every semantic field is extracted by trying an ordered list of CSS
//! selector candidates and taking the first non-empty match. No single
//! selector on these sites is assumed stable; the cascade order is the
//! resilience strategy and must be deterministic.
//!
//! Selectors are compiled once per parser at construction. A selector that
//! fails to compile is logged and dropped; a cascade with no valid selector
//! at all is a construction error.

pub mod amazon;
pub mod flipkart;
pub mod myntra;
pub mod snapdeal;

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::product::{Platform, ScrapedProduct, SearchResultItem, MAX_RESULTS_PER_PLATFORM};

/// Compile a cascade of selector strings, keeping candidate order.
pub(crate) fn compile_selectors(sources: &[&str]) -> Result<Vec<Selector>> {
    let mut selectors = Vec::with_capacity(sources.len());
    let mut errors = Vec::new();

    for source in sources {
        match Selector::parse(source) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile selector '{source}': {e}");
                errors.push(format!("'{source}': {e}"));
            }
        }
    }

    if selectors.is_empty() {
        anyhow::bail!("No valid selectors compiled. Errors: {}", errors.join(", "));
    }
    Ok(selectors)
}

/// First non-empty text match across a document-level cascade.
pub(crate) fn first_text(html: &Html, cascade: &[Selector]) -> Option<String> {
    cascade.iter().find_map(|selector| {
        html.select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    })
}

/// First non-empty text match within one element.
pub(crate) fn first_text_in(element: &ElementRef, cascade: &[Selector]) -> Option<String> {
    cascade.iter().find_map(|selector| {
        element
            .select(selector)
            .next()
            .map(|el| element_text(el))
            .filter(|text| !text.is_empty())
    })
}

/// First non-empty attribute value across a document-level cascade.
pub(crate) fn first_attr(html: &Html, cascade: &[Selector], attr: &str) -> Option<String> {
    cascade.iter().find_map(|selector| {
        html.select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// First non-empty attribute value within one element.
pub(crate) fn first_attr_in(
    element: &ElementRef,
    cascade: &[Selector],
    attr: &str,
) -> Option<String> {
    cascade.iter().find_map(|selector| {
        element
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Whether any selector in the cascade matches anything.
pub(crate) fn any_match(html: &Html, cascade: &[Selector]) -> bool {
    cascade.iter().any(|selector| html.select(selector).next().is_some())
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolve a possibly relative product link against the platform base URL.
pub(crate) fn resolve_link(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Walk the container cascade and extract list items.
///
/// The first container selector that yields at least one accepted item wins;
/// remaining candidates are not tried, so overlapping selectors cannot
/// double-count. At most [`MAX_RESULTS_PER_PLATFORM`] DOM nodes are
/// considered per selector, and within the set no two items may share a URL.
pub(crate) fn collect_list_items<F>(
    html: &Html,
    containers: &[Selector],
    platform: Platform,
    extract: F,
) -> Vec<SearchResultItem>
where
    F: Fn(&ElementRef) -> Option<SearchResultItem>,
{
    let mut items: Vec<SearchResultItem> = Vec::new();

    for selector in containers {
        let elements: Vec<ElementRef> =
            html.select(selector).take(MAX_RESULTS_PER_PLATFORM).collect();
        debug!("{platform}: container selector matched {} elements", elements.len());
        if elements.is_empty() {
            continue;
        }

        for element in &elements {
            let Some(item) = extract(element) else { continue };
            if !item.is_acceptable() {
                continue;
            }
            if items.iter().any(|existing| existing.url == item.url) {
                continue;
            }
            items.push(item);
        }

        // First successful selector wins
        if !items.is_empty() {
            break;
        }
    }

    debug!("{platform}: extracted {} list items", items.len());
    items
}

/// The compiled parser set for all supported platforms.
///
/// Construction fails only if a whole cascade is invalid, which is treated
/// as an aggregator-level fault upstream.
pub struct SiteParsers {
    amazon: amazon::AmazonParser,
    flipkart: flipkart::FlipkartParser,
    snapdeal: snapdeal::SnapdealParser,
    myntra: myntra::MyntraParser,
}

impl SiteParsers {
    pub fn new() -> Result<Self> {
        Ok(Self {
            amazon: amazon::AmazonParser::new()?,
            flipkart: flipkart::FlipkartParser::new()?,
            snapdeal: snapdeal::SnapdealParser::new()?,
            myntra: myntra::MyntraParser::new()?,
        })
    }

    /// Extract search result items from a platform's listing page.
    pub fn parse_search(&self, platform: Platform, html: &Html) -> Vec<SearchResultItem> {
        match platform {
            Platform::Amazon => self.amazon.parse_search(html),
            Platform::Flipkart => self.flipkart.parse_search(html),
            Platform::Snapdeal => self.snapdeal.parse_search(html),
            Platform::Myntra => self.myntra.parse_search(html),
            Platform::Unknown => Vec::new(),
        }
    }

    /// Extract a full product record from a platform's product page.
    pub fn parse_product(
        &self,
        platform: Platform,
        html: &Html,
        url: &str,
    ) -> Option<ScrapedProduct> {
        match platform {
            Platform::Amazon => self.amazon.parse_product(html, url),
            Platform::Flipkart => self.flipkart.parse_product(html, url),
            Platform::Snapdeal => self.snapdeal.parse_product(html, url),
            Platform::Myntra => self.myntra.parse_product(html, url),
            Platform::Unknown => None,
        }
    }
}
