//! Price parsing with OCR-error recovery.
//!
//! Tokens come out of OCR with stray symbols, dropped or doubled decimal
//! points and thousands separators. Parsing is lossy but deterministic and
//! never fails: anything unusable becomes zero.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Lower bound (exclusive) for an accepted item price.
pub const MIN_ITEM_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Upper bound (exclusive) for an accepted item price.
pub const MAX_ITEM_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Zero at money scale (`0.00`).
pub const ZERO_MONEY: Decimal = Decimal::from_parts(0, 0, 0, false, 2);

/// Round to cents and pin the scale to exactly two fractional digits.
pub fn to_money(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

/// Parse a loosely formatted price token into a two-decimal amount.
///
/// - everything except digits and `.` is dropped, so the result is always a
///   magnitude (`"-1.00"` parses as `1.00`);
/// - the first `.` separates whole units; digits after it (including those
///   after any further stray dots) are joined and truncated to two places,
///   so `"12.345"` and `"12.3.45"` both give `12.34`;
/// - a token without a point is read as cents (`"599"` is `5.99`) unless it
///   has more than two digits and exceeds 1000, in which case it is whole
///   units (`"1500"` is `1500.00`).
pub fn parse_price(token: &str) -> Decimal {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let segments: Vec<&str> = cleaned.split('.').collect();

    if segments.len() == 1 {
        return parse_undotted(segments[0]);
    }

    let whole = if segments[0].is_empty() { "0" } else { segments[0] };
    let fraction: String = segments[1..].concat().chars().take(2).collect();

    let literal = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    Decimal::from_str(&literal)
        .map(to_money)
        .unwrap_or(ZERO_MONEY)
}

fn parse_undotted(digits: &str) -> Decimal {
    let Ok(value) = Decimal::from_str(digits) else {
        return ZERO_MONEY;
    };

    if digits.len() > 2 && value > Decimal::ONE_THOUSAND {
        to_money(value)
    } else {
        to_money(value / Decimal::ONE_HUNDRED)
    }
}

/// Sanity range for item prices: `0.01 < price < 1000`.
pub fn accept_price(price: Decimal) -> bool {
    price > MIN_ITEM_PRICE && price < MAX_ITEM_PRICE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_decimal() {
        assert_eq!(parse_price("3.99"), dec("3.99"));
        assert_eq!(parse_price("$12.50"), dec("12.50"));
        assert_eq!(parse_price("1,234.56"), dec("1234.56"));
    }

    #[test]
    fn test_parse_always_two_places() {
        assert_eq!(parse_price("3.99").to_string(), "3.99");
        assert_eq!(parse_price("7").to_string(), "0.07");
        assert_eq!(parse_price("5.").to_string(), "5.00");
        assert_eq!(parse_price("2.5").to_string(), "2.50");
    }

    #[test]
    fn test_parse_undotted_as_cents() {
        assert_eq!(parse_price("599"), dec("5.99"));
        assert_eq!(parse_price("1000"), dec("10.00"));
        assert_eq!(parse_price("12"), dec("0.12"));
    }

    #[test]
    fn test_parse_large_undotted_as_whole_units() {
        assert_eq!(parse_price("1500"), dec("1500.00"));
        assert_eq!(parse_price("$2499"), dec("2499.00"));
    }

    #[test]
    fn test_parse_truncates_extra_fraction_digits() {
        assert_eq!(parse_price("12.345"), dec("12.34"));
        assert_eq!(parse_price("12.3.45"), dec("12.34"));
        assert_eq!(parse_price("1.9.9.9"), dec("1.99"));
    }

    #[test]
    fn test_parse_is_idempotent_on_canonical_output() {
        for token in ["0.50", "3.99", "12.50", "999.99", "12.345", "599"] {
            let once = parse_price(token);
            assert_eq!(parse_price(&once.to_string()), once, "token {token}");
        }
    }

    #[test]
    fn test_parse_discards_sign() {
        assert_eq!(parse_price("-1.00"), dec("1.00"));
        assert_eq!(parse_price("-$2.25"), dec("2.25"));
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_price("").to_string(), "0.00");
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("abc"), Decimal::ZERO);
        assert_eq!(parse_price("."), Decimal::ZERO);
        assert_eq!(parse_price("..."), Decimal::ZERO);
        assert_eq!(parse_price("9".repeat(40).as_str()), Decimal::ZERO);
    }

    #[test]
    fn test_leading_point() {
        assert_eq!(parse_price(".99"), dec("0.99"));
    }

    #[test]
    fn test_accept_price_bounds() {
        assert!(!accept_price(dec("0.00")));
        assert!(!accept_price(dec("0.01")));
        assert!(accept_price(dec("0.02")));
        assert!(accept_price(dec("999.99")));
        assert!(!accept_price(dec("1000.00")));
        assert!(!accept_price(dec("1500.00")));
    }

    #[test]
    fn test_to_money_rounds_half_away_from_zero() {
        assert_eq!(to_money(dec("2.345")).to_string(), "2.35");
        assert_eq!(to_money(dec("4")).to_string(), "4.00");
    }
}
