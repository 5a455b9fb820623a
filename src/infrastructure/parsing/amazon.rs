//! Amazon page extraction
//!
//! Product pages carry prices in half a dozen competing widgets and the
//! image URLs inside a JSON attribute (`data-a-dynamic-image`), so this
//! parser is the busiest of the four.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::{
    collect_list_items, compile_selectors, first_attr, first_attr_in, first_text, first_text_in,
    resolve_link,
};
use crate::domain::price::parse_price;
use crate::domain::product::{Platform, ScrapedProduct, SearchResultItem};

pub struct AmazonParser {
    // product page
    title: Vec<Selector>,
    current_price: Vec<Selector>,
    original_price: Vec<Selector>,
    availability: Vec<Selector>,
    dynamic_image: Vec<Selector>,
    currency_symbol: Vec<Selector>,
    savings: Vec<Selector>,
    description: Vec<Selector>,
    // search listing
    containers: Vec<Selector>,
    item_title: Vec<Selector>,
    item_price: Vec<Selector>,
    item_link: Vec<Selector>,
    item_image: Vec<Selector>,
    item_rating: Vec<Selector>,
}

impl AmazonParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: compile_selectors(&["#productTitle"])?,
            current_price: compile_selectors(&[
                ".priceToPay span.a-price-whole",
                ".a.size.base.a-color-price",
                ".a-button-selected .a-color-base",
            ])?,
            original_price: compile_selectors(&[
                "#priceblock_ourprice",
                ".a-price.a-text-price span.a-offscreen",
                "#listPrice",
                "#priceblock_dealprice",
                ".a-size-base.a-color-price",
            ])?,
            availability: compile_selectors(&["#availability span"])?,
            dynamic_image: compile_selectors(&["#imgBlkFront", "#landingImage"])?,
            currency_symbol: compile_selectors(&[".a-price-symbol"])?,
            savings: compile_selectors(&[".savingsPercentage"])?,
            description: compile_selectors(&[
                "#productDescription",
                ".a-unordered-list .a-list-item",
                ".a-expander-content p",
            ])?,
            containers: compile_selectors(&[
                r#"div[data-component-type="s-search-result"]"#,
                "div.s-result-item[data-asin]",
                ".s-result-item",
            ])?,
            item_title: compile_selectors(&[
                "h2 a span",
                "h2.a-size-mini span",
                ".a-size-base-plus",
                ".a-size-medium",
            ])?,
            item_price: compile_selectors(&[
                ".a-price-whole",
                ".a-price .a-offscreen",
                "span.a-price span",
            ])?,
            item_link: compile_selectors(&["h2 a", ".a-link-normal"])?,
            item_image: compile_selectors(&["img.s-image", "img"])?,
            item_rating: compile_selectors(&["span.a-icon-alt", ".a-star-small span"])?,
        })
    }

    pub fn parse_product(&self, html: &Html, url: &str) -> Option<ScrapedProduct> {
        let title = first_text(html, &self.title);
        let current_price = first_text(html, &self.current_price).and_then(|t| parse_price(&t));
        let original_price = first_text(html, &self.original_price).and_then(|t| parse_price(&t));

        let out_of_stock = first_text(html, &self.availability)
            .map(|t| t.to_lowercase() == "currently unavailable")
            .unwrap_or(false);

        let image = first_attr(html, &self.dynamic_image, "data-a-dynamic-image")
            .and_then(|json| first_dynamic_image_url(&json));

        let currency = first_text(html, &self.currency_symbol).or_else(|| Some("$".to_string()));
        let description = first_text(html, &self.description);

        let mut product = ScrapedProduct::from_extracted(
            url,
            Platform::Amazon,
            title,
            current_price,
            original_price,
            currency,
            image,
            out_of_stock,
            description,
        )?;

        // The badge on the page beats the derived rate when present
        if let Some(saved) = first_text(html, &self.savings)
            .and_then(|t| t.replace(['-', '%'], "").trim().parse::<i64>().ok())
        {
            product.discount_rate = saved;
        }

        Some(product)
    }

    pub fn parse_search(&self, html: &Html) -> Vec<SearchResultItem> {
        collect_list_items(html, &self.containers, Platform::Amazon, |element| {
            self.extract_search_item(element)
        })
    }

    fn extract_search_item(&self, element: &ElementRef) -> Option<SearchResultItem> {
        let title = first_text_in(element, &self.item_title)?;
        let price = first_text_in(element, &self.item_price).and_then(|t| parse_price(&t))?;

        let href = first_attr_in(element, &self.item_link, "href")?;
        let url = resolve_link(&href, Platform::Amazon.base_url());

        let image = first_attr_in(element, &self.item_image, "src").unwrap_or_default();
        let rating = first_text_in(element, &self.item_rating)
            .and_then(|t| t.split_whitespace().next().map(str::to_string))
            .unwrap_or_else(|| Platform::Amazon.default_rating().to_string());

        Some(SearchResultItem {
            title: crate::domain::price::truncate_title(&title),
            price,
            url,
            image,
            platform: Platform::Amazon,
            rating,
            currency: "₹".to_string(),
        })
    }
}

/// Pull the first image URL out of Amazon's `data-a-dynamic-image` JSON
/// attribute, which maps image URLs to pixel dimensions.
fn first_dynamic_image_url(json: &str) -> Option<String> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).ok()?;
    map.keys().next().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"
        <html><body>
            <span id="productTitle"> Apple iPhone 15 (128 GB) - Black </span>
            <div class="priceToPay"><span class="a-price-whole">69,900</span></div>
            <div class="a-price a-text-price"><span class="a-offscreen">₹79,900</span></div>
            <div id="availability"><span> In Stock </span></div>
            <img id="landingImage"
                 data-a-dynamic-image='{"https://m.media-amazon.com/images/I/abc.jpg":[500,500],"https://m.media-amazon.com/images/I/def.jpg":[300,300]}'/>
            <span class="a-price-symbol">₹</span>
            <span class="savingsPercentage">-13%</span>
        </body></html>
    "#;

    #[test]
    fn extracts_full_product_record() {
        let parser = AmazonParser::new().unwrap();
        let html = Html::parse_document(PRODUCT_PAGE);
        let product = parser
            .parse_product(&html, "https://www.amazon.in/dp/B0CHX1W1XY")
            .unwrap();

        assert_eq!(product.title, "Apple iPhone 15 (128 GB) - Black");
        assert_eq!(product.current_price, 69900.0);
        assert_eq!(product.original_price, 79900.0);
        assert_eq!(product.currency, "₹");
        assert_eq!(product.image, "https://m.media-amazon.com/images/I/abc.jpg");
        assert_eq!(product.discount_rate, 13);
        assert!(!product.is_out_of_stock);
    }

    #[test]
    fn unavailable_marker_sets_out_of_stock() {
        let parser = AmazonParser::new().unwrap();
        let html = Html::parse_document(
            r#"<span id="productTitle">X</span>
               <div class="priceToPay"><span class="a-price-whole">100</span></div>
               <div id="availability"><span>Currently unavailable</span></div>"#,
        );
        let product = parser.parse_product(&html, "https://www.amazon.in/dp/x").unwrap();
        assert!(product.is_out_of_stock);
    }

    #[test]
    fn product_without_any_price_is_rejected() {
        let parser = AmazonParser::new().unwrap();
        let html =
            Html::parse_document(r#"<span id="productTitle">No price here</span>"#);
        assert!(parser.parse_product(&html, "https://www.amazon.in/dp/x").is_none());
    }

    fn search_card(asin: &str, title: &str, price: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result" data-asin="{asin}">
                   <h2><a href="/dp/{asin}"><span>{title}</span></a></h2>
                   <span class="a-price"><span class="a-price-whole">{price}</span></span>
                   <img class="s-image" src="https://m.media-amazon.com/{asin}.jpg"/>
                   <span class="a-icon-alt">4.4 out of 5 stars</span>
               </div>"#
        )
    }

    #[test]
    fn search_results_are_extracted_with_absolute_urls() {
        let parser = AmazonParser::new().unwrap();
        let page = format!(
            "<html><body>{}{}</body></html>",
            search_card("B001", "iPhone 15", "79,900"),
            search_card("B002", "iPhone 15 Plus", "89,900"),
        );
        let html = Html::parse_document(&page);
        let items = parser.parse_search(&html);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://www.amazon.in/dp/B001");
        assert_eq!(items[0].price, 79900.0);
        assert_eq!(items[0].rating, "4.4");
        assert_eq!(items[0].platform, Platform::Amazon);
    }

    #[test]
    fn duplicate_urls_within_a_page_are_dropped() {
        let parser = AmazonParser::new().unwrap();
        let page = format!(
            "<html><body>{}{}</body></html>",
            search_card("B001", "iPhone 15", "79,900"),
            search_card("B001", "iPhone 15 again", "79,900"),
        );
        let html = Html::parse_document(&page);
        assert_eq!(parser.parse_search(&html).len(), 1);
    }

    #[test]
    fn cards_without_price_are_skipped_silently() {
        let parser = AmazonParser::new().unwrap();
        let page = format!(
            r#"<html><body>
                 <div data-component-type="s-search-result" data-asin="B000">
                     <h2><a href="/dp/B000"><span>Sponsored junk</span></a></h2>
                 </div>
                 {}
               </body></html>"#,
            search_card("B001", "iPhone 15", "79,900"),
        );
        let html = Html::parse_document(&page);
        let items = parser.parse_search(&html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "iPhone 15");
    }

    #[test]
    fn dynamic_image_takes_first_key() {
        let json = r#"{"https://a.jpg":[1,1],"https://b.jpg":[2,2]}"#;
        assert_eq!(first_dynamic_image_url(json).as_deref(), Some("https://a.jpg"));
        assert_eq!(first_dynamic_image_url("not json"), None);
    }
}
