//! Price-change classification for the notification collaborator
//!
//! The core never sends email itself; it only compares a previously stored
//! snapshot against a freshly scraped one and names the event, if any. The
//! notification layer decides what to do with it.

use serde::{Deserialize, Serialize};

/// Discount percentage at or above which a threshold alert fires.
pub const DISCOUNT_THRESHOLD: i64 = 40;

/// The kinds of price events worth telling a tracking user about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceAlert {
    /// Product was out of stock and is available again
    BackInStock,
    /// Fresh price undercuts every previously recorded one
    LowestPrice,
    /// Discount versus the original price crossed the threshold
    ThresholdMet,
}

/// The fields of a product record that alert classification looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub price: f64,
    pub is_out_of_stock: bool,
    pub discount_rate: i64,
}

/// Classify the change between two snapshots.
///
/// Checks are ordered: stock recovery beats a new low, which beats a
/// threshold discount. `lowest_recorded` is the lowest price in the stored
/// history, 0 when there is none yet.
pub fn classify(
    previous: &PriceSnapshot,
    current: &PriceSnapshot,
    lowest_recorded: f64,
) -> Option<PriceAlert> {
    if previous.is_out_of_stock && !current.is_out_of_stock {
        return Some(PriceAlert::BackInStock);
    }
    if lowest_recorded > 0.0 && current.price < lowest_recorded {
        return Some(PriceAlert::LowestPrice);
    }
    if current.discount_rate >= DISCOUNT_THRESHOLD {
        return Some(PriceAlert::ThresholdMet);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(price: f64, out_of_stock: bool, discount: i64) -> PriceSnapshot {
        PriceSnapshot { price, is_out_of_stock: out_of_stock, discount_rate: discount }
    }

    #[test]
    fn stock_recovery_wins_over_everything() {
        let alert = classify(&snapshot(1000.0, true, 0), &snapshot(500.0, false, 50), 900.0);
        assert_eq!(alert, Some(PriceAlert::BackInStock));
    }

    #[test]
    fn new_lowest_price() {
        let alert = classify(&snapshot(1000.0, false, 0), &snapshot(800.0, false, 10), 900.0);
        assert_eq!(alert, Some(PriceAlert::LowestPrice));
    }

    #[test]
    fn threshold_discount() {
        let alert = classify(&snapshot(1000.0, false, 0), &snapshot(950.0, false, 45), 900.0);
        assert_eq!(alert, Some(PriceAlert::ThresholdMet));
    }

    #[test]
    fn no_event_when_nothing_notable_happened() {
        let alert = classify(&snapshot(1000.0, false, 0), &snapshot(990.0, false, 5), 900.0);
        assert_eq!(alert, None);
    }

    #[test]
    fn empty_history_never_fires_lowest() {
        let alert = classify(&snapshot(1000.0, false, 0), &snapshot(1.0, false, 0), 0.0);
        assert_eq!(alert, None);
    }
}
