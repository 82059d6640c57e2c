//! Repair passes for common OCR corruption in receipt text.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Placeholder standing in for a protected decimal point while the repair
/// passes run. Private-use code point, never produced by OCR engines.
pub const DECIMAL_SENTINEL: &str = "\u{E000}";

lazy_static! {
    /// A genuine decimal: digit, point, two digits.
    static ref GENUINE_DECIMAL: Regex = Regex::new(r"(\d)\.(\d{2})").unwrap();

    /// A decimal point misread as a letter that looks like `1`.
    static ref LETTER_FOR_POINT: Regex = Regex::new(r"(\d)[lI](\d)").unwrap();

    /// `$500` that should read `$5.00`. The trailing group keeps the match
    /// off digits and protected decimals, so `$2000.00` is left alone.
    static ref DROPPED_CENTS: Regex =
        Regex::new(r"\$(\d{1,2})0{2,}([^\w\x{E000}]|$)").unwrap();

    /// Two numeric tokens split by a single space. Tokens may carry date and
    /// time separators so `03/15/2024 10:45` is seen whole.
    static ref SPLIT_DIGITS: Regex =
        Regex::new(r"(\d+(?:[/:-]\d+)*) (\d+(?:[/:-]\d+)*)").unwrap();
}

/// Normalize raw OCR text.
///
/// Passes run in a fixed order: protect genuine decimals, turn `12l50` into
/// `12.50`, turn `$500` into `$5.00`, join digits split by a single space,
/// then restore the protected decimals. Pure and deterministic.
pub fn normalize(raw: &str) -> String {
    let protected = GENUINE_DECIMAL.replace_all(raw, format!("${{1}}{DECIMAL_SENTINEL}${{2}}"));
    let repaired = LETTER_FOR_POINT.replace_all(&protected, "${1}.${2}");
    let repaired = DROPPED_CENTS.replace_all(&repaired, "$$${1}.00${2}");
    let joined = join_split_digits(&repaired);

    joined.replace(DECIMAL_SENTINEL, ".")
}

/// `replace_all` does not revisit a digit consumed by the previous match, so
/// `1 2 3` needs a second pass. Dates and times are never glued to a
/// neighbouring number.
fn join_split_digits(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = SPLIT_DIGITS
            .replace_all(&current, |caps: &Captures| {
                if is_date_or_time(&caps[1]) || is_date_or_time(&caps[2]) {
                    caps[0].to_string()
                } else {
                    format!("{}{}", &caps[1], &caps[2])
                }
            })
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn is_date_or_time(token: &str) -> bool {
    token.contains(['/', ':', '-'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_genuine_decimals() {
        let out = normalize("Total $12.50");
        assert!(out.contains("$12.50"));
        assert_eq!(out, "Total $12.50");
    }

    #[test]
    fn test_letter_for_point() {
        assert_eq!(normalize("12l50"), "12.50");
        assert_eq!(normalize("Soda 1I99"), "Soda 1.99");
    }

    #[test]
    fn test_letters_between_words_untouched() {
        assert_eq!(normalize("Milk Ilk"), "Milk Ilk");
        assert_eq!(normalize("A1l"), "A1l");
    }

    #[test]
    fn test_dropped_cents() {
        assert_eq!(normalize("Total $500"), "Total $5.00");
        assert_eq!(normalize("Cash $1200"), "Cash $12.00");
        assert_eq!(normalize("Cash $5.00"), "Cash $5.00");
        assert_eq!(normalize("Tip $300\nTotal"), "Tip $3.00\nTotal");
    }

    #[test]
    fn test_dropped_cents_leaves_real_decimals() {
        assert_eq!(normalize("Total $2000.00"), "Total $2000.00");
        assert_eq!(normalize("$1000.00"), "$1000.00");
        assert_eq!(normalize("TV $100.00"), "TV $100.00");
        assert_eq!(normalize("Ref $5000"), "Ref $50.00");
    }

    #[test]
    fn test_joins_split_digits() {
        assert_eq!(normalize("Tax 1 50"), "Tax 150");
        assert_eq!(normalize("Ref 1 2 3"), "Ref 123");
    }

    #[test]
    fn test_date_and_time_stay_apart() {
        assert_eq!(normalize("03/15/2024 10:45"), "03/15/2024 10:45");
        assert_eq!(normalize("10:45 03/15/2024"), "10:45 03/15/2024");
        assert_eq!(normalize("2024-03-15 10:45 AM"), "2024-03-15 10:45 AM");
    }

    #[test]
    fn test_does_not_join_across_wide_gaps() {
        let text = "Milk   3.99\nBread   2.50\nTax   0.50\nTotal   6.99";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_protected_decimal_survives_letter_pass() {
        assert_eq!(normalize("4.25 and 3l75"), "4.25 and 3.75");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let text = "Store Name: Corner Market\n03/15/2024\nMilk  3.99";
        assert_eq!(normalize(&normalize(text)), normalize(text));
    }
}
