//! Domain module - platform model, product records and pure price logic
//!
//! Everything in here is synchronous and free of I/O so it can be tested
//! without fixtures or a network.

pub mod alerts;
pub mod price;
pub mod product;

pub use product::{Platform, PricePoint, ScrapedProduct, SearchResultItem};
