//! Flipkart page extraction
//!
//! Flipkart's class names are build artifacts (`_30jeq3`, `Nx9bqj`) that
//! rotate between deployments, hence the longer cascades of historical
//! names on both the product and listing paths.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::{
    collect_list_items, compile_selectors, first_attr, first_attr_in, first_text, first_text_in,
    resolve_link,
};
use crate::domain::price::parse_price;
use crate::domain::product::{Platform, ScrapedProduct, SearchResultItem};

pub struct FlipkartParser {
    // product page
    title: Vec<Selector>,
    current_price: Vec<Selector>,
    original_price: Vec<Selector>,
    image: Vec<Selector>,
    stock_banner: Vec<Selector>,
    description: Vec<Selector>,
    // search listing
    containers: Vec<Selector>,
    item_title: Vec<Selector>,
    item_price: Vec<Selector>,
    item_link: Vec<Selector>,
    item_image: Vec<Selector>,
    item_rating: Vec<Selector>,
}

impl FlipkartParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: compile_selectors(&[
                "span.VU-ZEz",
                "._6EBuvT span",
                "h1 span",
                "._35KyD6",
            ])?,
            current_price: compile_selectors(&[
                ".Nx9bqj.CxhGGd",
                "._30jeq3._16Jk6d",
                "._25b18c .lxXXQ8",
            ])?,
            original_price: compile_selectors(&[
                "._3I9_wc._27UcVY",
                "._3auQ3N._1POkHg",
                "._2Rrra5",
            ])?,
            image: compile_selectors(&["._53J4C- img", "._1Nyybr img", "._2r_T1I img"])?,
            stock_banner: compile_selectors(&["._16FRp0"])?,
            description: compile_selectors(&["._3WHvuP", "._1mXcCf"])?,
            containers: compile_selectors(&[
                "div._1AtVbE",
                "div._2kHMtA",
                "div._13oc-S",
                "div[data-id]",
            ])?,
            item_title: compile_selectors(&[
                "div._4rR01T",
                "a.s1Q9rs",
                "._2WkVRV",
                ".IRpwTa",
            ])?,
            item_price: compile_selectors(&["div._30jeq3", "._25b18c", "._1_WHN1"])?,
            item_link: compile_selectors(&["a._1fQZEK", "a.s1Q9rs", "a._2rpwqI"])?,
            item_image: compile_selectors(&["img._396cs4", "img._2r_T1I", "img"])?,
            item_rating: compile_selectors(&["div._3LWZlK", "._3LWZlK"])?,
        })
    }

    pub fn parse_product(&self, html: &Html, url: &str) -> Option<ScrapedProduct> {
        let title = first_text(html, &self.title);
        let current_price = first_text(html, &self.current_price).and_then(|t| parse_price(&t));
        let original_price = first_text(html, &self.original_price).and_then(|t| parse_price(&t));

        let out_of_stock = first_text(html, &self.stock_banner)
            .map(|t| {
                let t = t.to_lowercase();
                t.contains("out of stock") || t.contains("coming soon")
            })
            .unwrap_or(false);

        let image = first_attr(html, &self.image, "src");
        let description = first_text(html, &self.description);

        ScrapedProduct::from_extracted(
            url,
            Platform::Flipkart,
            title,
            current_price,
            original_price,
            Some("₹".to_string()),
            image,
            out_of_stock,
            description,
        )
    }

    pub fn parse_search(&self, html: &Html) -> Vec<SearchResultItem> {
        collect_list_items(html, &self.containers, Platform::Flipkart, |element| {
            self.extract_search_item(element)
        })
    }

    fn extract_search_item(&self, element: &ElementRef) -> Option<SearchResultItem> {
        let title = first_text_in(element, &self.item_title)?;
        let price = first_text_in(element, &self.item_price).and_then(|t| parse_price(&t))?;

        let href = first_attr_in(element, &self.item_link, "href")?;
        let url = resolve_link(&href, Platform::Flipkart.base_url());

        let image = first_attr_in(element, &self.item_image, "src").unwrap_or_default();
        let rating = first_text_in(element, &self.item_rating)
            .unwrap_or_else(|| Platform::Flipkart.default_rating().to_string());

        Some(SearchResultItem {
            title: crate::domain::price::truncate_title(&title),
            price,
            url,
            image,
            platform: Platform::Flipkart,
            rating,
            currency: "₹".to_string(),
        })
    }
}
