//! Myntra page extraction
//!
//! Fashion-only platform: listing cards split the display name into a brand
//! line and a product line, and product pages mark sizes individually as out
//! of stock.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::{
    any_match, collect_list_items, compile_selectors, first_attr, first_attr_in, first_text,
    first_text_in, resolve_link,
};
use crate::domain::price::parse_price;
use crate::domain::product::{Platform, ScrapedProduct, SearchResultItem};

pub struct MyntraParser {
    // product page
    title: Vec<Selector>,
    current_price: Vec<Selector>,
    original_price: Vec<Selector>,
    image: Vec<Selector>,
    stock_markers: Vec<Selector>,
    description: Vec<Selector>,
    // search listing
    containers: Vec<Selector>,
    item_title: Vec<Selector>,
    item_price: Vec<Selector>,
    item_link: Vec<Selector>,
    item_image: Vec<Selector>,
    item_rating: Vec<Selector>,
}

impl MyntraParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: compile_selectors(&[".pdp-title", "h1.pdp-name", "h1"])?,
            current_price: compile_selectors(&[".pdp-price strong", ".price-discount"])?,
            original_price: compile_selectors(&[".pdp-mrp", ".price-original"])?,
            image: compile_selectors(&[".image-grid-image", ".img-responsive"])?,
            stock_markers: compile_selectors(&[
                ".size-buttons-size-button-out-of-stock",
                ".notify-me",
            ])?,
            description: compile_selectors(&[
                ".pdp-product-description-content",
                ".product-description",
            ])?,
            containers: compile_selectors(&[".product-base, .search-product"])?,
            item_title: compile_selectors(&[".product-product", ".product-brand"])?,
            item_price: compile_selectors(&[".product-discountedPrice", ".product-price span"])?,
            item_link: compile_selectors(&["a"])?,
            item_image: compile_selectors(&["img.img-responsive", "img"])?,
            item_rating: compile_selectors(&[".product-rating"])?,
        })
    }

    pub fn parse_product(&self, html: &Html, url: &str) -> Option<ScrapedProduct> {
        let title = first_text(html, &self.title);
        let current_price = first_text(html, &self.current_price).and_then(|t| parse_price(&t));
        let original_price = first_text(html, &self.original_price).and_then(|t| parse_price(&t));

        let out_of_stock = any_match(html, &self.stock_markers);
        let image = first_attr(html, &self.image, "src");
        let description = first_text(html, &self.description);

        ScrapedProduct::from_extracted(
            url,
            Platform::Myntra,
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
        collect_list_items(html, &self.containers, Platform::Myntra, |element| {
            self.extract_search_item(element)
        })
    }

    fn extract_search_item(&self, element: &ElementRef) -> Option<SearchResultItem> {
        let title = first_text_in(element, &self.item_title)?;
        let price = first_text_in(element, &self.item_price).and_then(|t| parse_price(&t))?;

        let href = first_attr_in(element, &self.item_link, "href")?;
        let url = resolve_link(&href, Platform::Myntra.base_url());

        let image = first_attr_in(element, &self.item_image, "src").unwrap_or_default();
        let rating = first_text_in(element, &self.item_rating)
            .unwrap_or_else(|| Platform::Myntra.default_rating().to_string());

        Some(SearchResultItem {
            title: crate::domain::price::truncate_title(&title),
            price,
            url,
            image,
            platform: Platform::Myntra,
            rating,
            currency: "₹".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_product_with_fashion_category() {
        let parser = MyntraParser::new().unwrap();
        let html = Html::parse_document(
            r#"<html><body>
                 <h1 class="pdp-title">Roadster Men Navy Jacket</h1>
                 <div class="pdp-price"><strong>₹1,499</strong></div>
                 <span class="pdp-mrp">Rs. 2,999</span>
                 <img class="image-grid-image" src="//assets.myntassets.com/jacket.jpg"/>
               </body></html>"#,
        );
        let product = parser
            .parse_product(&html, "https://www.myntra.com/jackets/roadster/123/buy")
            .unwrap();

        assert_eq!(product.title, "Roadster Men Navy Jacket");
        assert_eq!(product.current_price, 1499.0);
        assert_eq!(product.original_price, 2999.0);
        assert_eq!(product.category, "Fashion");
        assert_eq!(product.stars, 4.3);
        assert_eq!(product.image, "https://assets.myntassets.com/jacket.jpg");
    }

    #[test]
    fn out_of_stock_size_buttons_mark_the_product() {
        let parser = MyntraParser::new().unwrap();
        let html = Html::parse_document(
            r#"<h1 class="pdp-title">X</h1>
               <div class="pdp-price"><strong>₹999</strong></div>
               <button class="size-buttons-size-button-out-of-stock">M</button>"#,
        );
        let product = parser
            .parse_product(&html, "https://www.myntra.com/x/1/buy")
            .unwrap();
        assert!(product.is_out_of_stock);
    }

    #[test]
    fn search_cards_use_default_rating_when_missing() {
        let parser = MyntraParser::new().unwrap();
        let html = Html::parse_document(
            r#"<html><body>
                 <li class="product-base">
                   <a href="/tshirts/hm/789/buy">
                     <div class="product-product">Printed T-shirt</div>
                     <span class="product-discountedPrice">Rs. 699</span>
                   </a>
                 </li>
               </body></html>"#,
        );
        let items = parser.parse_search(&html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rating, "4.2");
        assert_eq!(items[0].url, "https://www.myntra.com/tshirts/hm/789/buy");
    }
}
