//! Price normalization and price-history arithmetic
//!
//! Raw price strings arrive in whatever shape the platform markup uses:
//! `₹79,900`, `Rs. 1,299`, `1,234.56`, sometimes with stray whitespace or a
//! trailing separator. `parse_price` is the single place those are turned
//! into numbers; everything downstream works with `Option<f64>`.

use crate::domain::product::{PricePoint, MAX_TITLE_LEN};

/// Parse a raw price string into a positive number.
///
/// Normalization rules:
/// - currency glyphs (`₹`, `$`, `Rs`) and thousands separators are stripped
/// - at most one decimal point is kept; a second one ends the number
/// - anything that does not parse, or parses to a value <= 0, is `None`
pub fn parse_price(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_dot = false;
    let mut negative = false;

    for ch in raw.chars() {
        match ch {
            '0'..='9' => cleaned.push(ch),
            '.' if !seen_dot && !cleaned.is_empty() => {
                seen_dot = true;
                cleaned.push(ch);
            }
            '.' if seen_dot => break,
            '-' if cleaned.is_empty() => negative = true,
            ',' | '₹' | '$' | ' ' | '\u{a0}' => continue,
            // Currency letters ("Rs.") only prefix a price; once digits
            // have started, any letter ends the number
            _ if cleaned.is_empty() => continue,
            _ => break,
        }
    }

    let cleaned = cleaned.trim_end_matches('.');
    let value: f64 = cleaned.parse().ok()?;
    (!negative && value > 0.0).then_some(value)
}

/// Rewrite scheme-relative image URLs to `https:`; empty stays empty.
pub fn normalize_image_url(image: &str) -> String {
    if image.is_empty() || image.starts_with("http") {
        image.to_string()
    } else {
        format!("https:{image}")
    }
}

/// Truncate a title to the display bound, on a char boundary.
pub fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_LEN).collect()
}

/// Percentage saved versus the original price, rounded to a whole number.
/// Zero when either price is absent or the original is not positive.
pub fn discount_rate(original: f64, current: f64) -> i64 {
    if original <= 0.0 || current <= 0.0 {
        return 0;
    }
    ((original - current) / original * 100.0).round() as i64
}

/// Lowest observed price in a history, 0 when empty.
pub fn lowest_price(history: &[PricePoint]) -> f64 {
    let lowest = history.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    if lowest.is_finite() {
        lowest
    } else {
        0.0
    }
}

/// Highest observed price in a history, 0 when empty.
pub fn highest_price(history: &[PricePoint]) -> f64 {
    history.iter().map(|p| p.price).fold(0.0, f64::max)
}

/// Mean price over a history, 0 when empty.
pub fn average_price(history: &[PricePoint]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().map(|p| p.price).sum::<f64>() / history.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("₹79,900", Some(79900.0))]
    #[case("79,900", Some(79900.0))]
    #[case("Rs. 1,299", Some(1299.0))]
    #[case("1,234.56", Some(1234.56))]
    #[case("₹499.00", Some(499.0))]
    #[case("  ₹2,499 ", Some(2499.0))]
    #[case("$59.99", Some(59.99))]
    fn parses_platform_price_strings(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_price(raw), expected);
    }

    #[rstest]
    #[case("")]
    #[case("Currently unavailable")]
    #[case("₹")]
    #[case("0")]
    #[case("₹0.00")]
    #[case("-500")]
    fn rejects_non_prices(#[case] raw: &str) {
        assert_eq!(parse_price(raw), None);
    }

    #[test]
    fn second_decimal_point_ends_the_number() {
        // "1.234.56" style strings come from locale-mixed markup
        assert_eq!(parse_price("1.234.56"), Some(1.234));
    }

    #[test]
    fn letters_after_the_first_digit_end_the_number() {
        // Currency letters are only stripped as a prefix; "1r2" must not
        // collapse to 12
        assert_eq!(parse_price("1r2"), Some(1.0));
        assert_eq!(parse_price("2,499 Rs"), Some(2499.0));
    }

    #[test]
    fn scheme_relative_image_is_rewritten() {
        assert_eq!(
            normalize_image_url("//img.example.com/p.jpg"),
            "https://img.example.com/p.jpg"
        );
        assert_eq!(
            normalize_image_url("https://img.example.com/p.jpg"),
            "https://img.example.com/p.jpg"
        );
        assert_eq!(normalize_image_url(""), "");
    }

    #[test]
    fn title_is_bounded() {
        let long = "x".repeat(500);
        assert_eq!(truncate_title(&long).len(), MAX_TITLE_LEN);
        assert_eq!(truncate_title("short"), "short");
    }

    #[test]
    fn discount_rate_rounds() {
        assert_eq!(discount_rate(1000.0, 750.0), 25);
        assert_eq!(discount_rate(79900.0, 69900.0), 13);
        assert_eq!(discount_rate(0.0, 750.0), 0);
        assert_eq!(discount_rate(1000.0, 0.0), 0);
    }

    #[test]
    fn history_statistics() {
        let history = vec![
            PricePoint::now(1000.0),
            PricePoint::now(900.0),
            PricePoint::now(1100.0),
        ];
        assert_eq!(lowest_price(&history), 900.0);
        assert_eq!(highest_price(&history), 1100.0);
        assert_eq!(average_price(&history), 1000.0);
    }

    #[test]
    fn empty_history_statistics_are_zero() {
        assert_eq!(lowest_price(&[]), 0.0);
        assert_eq!(highest_price(&[]), 0.0);
        assert_eq!(average_price(&[]), 0.0);
    }
}
