/// Converts raw on-page price text into a number.
///
/// Everything except ASCII digits and '.' is discarded first, so currency symbols,
/// thousands separators and whitespace fall away. Returns `None` when nothing
/// numeric is left or the remainder is not a valid decimal ("1.2.3").
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_separators() {
        assert_eq!(parse_price("₹1,234.50"), Some(1234.50));
        assert_eq!(parse_price("  ₹ 54,999 "), Some(54999.0));
        assert_eq!(parse_price("1,299."), Some(1299.0));
    }

    #[test]
    fn empty_or_non_numeric_is_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("Currently unavailable"), None);
        assert_eq!(parse_price("."), None);
    }

    #[test]
    fn malformed_decimal_is_none() {
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn zero_is_a_price_not_a_miss() {
        assert_eq!(parse_price("₹0"), Some(0.0));
    }
}
