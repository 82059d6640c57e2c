//! Currency symbol detection.

/// Symbols recognized on receipts.
pub const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];

/// First currency symbol in the text, or `default`.
pub fn detect_currency(text: &str, default: &str) -> String {
    text.chars()
        .find(|c| CURRENCY_SYMBOLS.contains(c))
        .map(String::from)
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_currency() {
        assert_eq!(detect_currency("Total €12.50", "$"), "€");
        assert_eq!(detect_currency("£1.00 and $2.00", "$"), "£");
        assert_eq!(detect_currency("Total 12.50", "$"), "$");
    }
}
