//! Snapdeal page extraction
//!
//! Listing cards expose the title either as element text or as a `title`
//! attribute on a `<p>`, so the item extractor tries both.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::{
    any_match, collect_list_items, compile_selectors, first_attr, first_attr_in, first_text,
    first_text_in, resolve_link,
};
use crate::domain::price::parse_price;
use crate::domain::product::{Platform, ScrapedProduct, SearchResultItem};

pub struct SnapdealParser {
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
    item_title_attr: Vec<Selector>,
    item_price: Vec<Selector>,
    item_link: Vec<Selector>,
    item_image: Vec<Selector>,
}

impl SnapdealParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: compile_selectors(&["h1.pdp-e-i-head", ".title-section h1", "h1"])?,
            current_price: compile_selectors(&[
                ".payBlkBig",
                ".pdp-final-price span",
                ".selling-price span",
            ])?,
            original_price: compile_selectors(&[
                ".pdp-strikthrough-price",
                ".lfloat.marR10 span",
            ])?,
            image: compile_selectors(&[
                ".cloudzoom",
                ".productImage img",
                r#"img[itemprop="image"]"#,
            ])?,
            stock_markers: compile_selectors(&[".sold-out-err", ".notify-me"])?,
            description: compile_selectors(&[".product-desc-content", ".detailssubbox"])?,
            containers: compile_selectors(&[".product-tuple-listing, .col-xs-6"])?,
            item_title: compile_selectors(&[".product-title", ".prodName"])?,
            item_title_attr: compile_selectors(&["p[title]"])?,
            item_price: compile_selectors(&[
                ".product-price",
                ".lfloat.product-price",
                ".selling-price",
            ])?,
            item_link: compile_selectors(&["a.dp-widget-link", r#"a[href*="/product/"]"#])?,
            item_image: compile_selectors(&["img.product-image", "img"])?,
        })
    }

    pub fn parse_product(&self, html: &Html, url: &str) -> Option<ScrapedProduct> {
        let title = first_text(html, &self.title);
        let current_price = first_text(html, &self.current_price).and_then(|t| parse_price(&t));
        let original_price = first_text(html, &self.original_price).and_then(|t| parse_price(&t));

        // "Sold out" banner or a notify-me widget both mean unavailable
        let out_of_stock = any_match(html, &self.stock_markers);

        let image = first_attr(html, &self.image, "src");
        let description = first_text(html, &self.description);

        ScrapedProduct::from_extracted(
            url,
            Platform::Snapdeal,
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
        collect_list_items(html, &self.containers, Platform::Snapdeal, |element| {
            self.extract_search_item(element)
        })
    }

    fn extract_search_item(&self, element: &ElementRef) -> Option<SearchResultItem> {
        let title = first_text_in(element, &self.item_title)
            .or_else(|| first_attr_in(element, &self.item_title_attr, "title"))?;
        let price = first_text_in(element, &self.item_price).and_then(|t| parse_price(&t))?;

        let href = first_attr_in(element, &self.item_link, "href")?;
        let url = resolve_link(&href, Platform::Snapdeal.base_url());

        let image = first_attr_in(element, &self.item_image, "src").unwrap_or_default();

        Some(SearchResultItem {
            title: crate::domain::price::truncate_title(&title),
            price,
            url,
            image,
            platform: Platform::Snapdeal,
            rating: Platform::Snapdeal.default_rating().to_string(),
            currency: "₹".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_product_page() {
        let parser = SnapdealParser::new().unwrap();
        let html = Html::parse_document(
            r#"<html><body>
                 <h1 class="pdp-e-i-head">Nike Running Shoes</h1>
                 <span class="payBlkBig">2499</span>
                 <span class="pdp-strikthrough-price">Rs. 4,999</span>
                 <img class="cloudzoom" src="https://n1.sdlcdn.com/shoe.jpg"/>
               </body></html>"#,
        );
        let product = parser
            .parse_product(&html, "https://www.snapdeal.com/product/nike/123")
            .unwrap();

        assert_eq!(product.title, "Nike Running Shoes");
        assert_eq!(product.current_price, 2499.0);
        assert_eq!(product.original_price, 4999.0);
        assert_eq!(product.discount_rate, 50);
        assert_eq!(product.category, "category");
    }

    #[test]
    fn notify_me_widget_means_out_of_stock() {
        let parser = SnapdealParser::new().unwrap();
        let html = Html::parse_document(
            r#"<h1 class="pdp-e-i-head">X</h1>
               <span class="payBlkBig">999</span>
               <div class="notify-me">Notify me</div>"#,
        );
        let product = parser
            .parse_product(&html, "https://www.snapdeal.com/product/x/1")
            .unwrap();
        assert!(product.is_out_of_stock);
    }

    #[test]
    fn listing_title_falls_back_to_title_attribute() {
        let parser = SnapdealParser::new().unwrap();
        let html = Html::parse_document(
            r#"<html><body>
                 <div class="product-tuple-listing">
                   <p title="Puma Sneakers White"></p>
                   <span class="product-price">Rs. 1,899</span>
                   <a class="dp-widget-link" href="/product/puma/456"></a>
                 </div>
               </body></html>"#,
        );
        let items = parser.parse_search(&html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Puma Sneakers White");
        assert_eq!(items[0].price, 1899.0);
        assert_eq!(items[0].url, "https://www.snapdeal.com/product/puma/456");
    }
}
