//! Amount extraction for receipt summary fields.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::TotalStrategy;

use super::patterns::{
    CREDIT_CARD, DECIMAL_AMOUNT, DISCOUNT_LABEL, LOOSE_AMOUNT, TAX_LABEL, TIP_LABEL, TOTAL_LABEL,
};
use super::price::{parse_price, to_money, ZERO_MONEY};
use super::{ExtractionMatch, FieldExtractor};

/// Amount extractor: every non-percentage decimal token in the text.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DECIMAL_AMOUNT
            .captures_iter(text)
            .filter(|caps| caps.get(2).is_none())
            .filter_map(|caps| {
                let token = caps.get(1)?;
                Some(
                    ExtractionMatch::new(parse_price(token.as_str()), token.as_str())
                        .with_position(token.start(), token.end()),
                )
            })
            .collect()
    }
}

/// First amount in a span of text. Tokens with two decimals win; otherwise
/// the first loose numeric token goes through the price heuristics.
/// Percentages are never amounts.
fn first_amount(text: &str) -> Option<Decimal> {
    if let Some(amount) = AmountExtractor::new().extract(text) {
        return Some(amount.value);
    }

    LOOSE_AMOUNT
        .captures_iter(text)
        .filter(|caps| caps.get(2).is_none())
        .map(|caps| parse_price(&caps[1]))
        .next()
}

/// Every amount on a line: all decimal tokens, or the first loose token
/// when the line has none.
fn line_amounts(line: &str) -> Vec<Decimal> {
    let amounts: Vec<Decimal> = AmountExtractor::new()
        .extract_all(line)
        .into_iter()
        .map(|m| m.value)
        .collect();

    if amounts.is_empty() {
        first_amount(line).into_iter().collect()
    } else {
        amounts
    }
}

/// Sum every amount on every line accepted by `include`.
fn sum_labelled(text: &str, label: &Regex, include: impl Fn(&str) -> bool) -> Decimal {
    let sum: Decimal = text
        .lines()
        .filter(|line| label.is_match(line) && include(line))
        .flat_map(line_amounts)
        .sum();
    to_money(sum)
}

/// Extract the grand total.
///
/// `BottomUp` returns the first amount on the last line that mentions the
/// word "total", so a grand total printed after a subtotal wins.
/// `Anchored` returns the first amount anywhere after the first "total".
pub fn extract_total(text: &str, strategy: TotalStrategy) -> Decimal {
    let total = match strategy {
        TotalStrategy::BottomUp => text
            .lines()
            .rev()
            .filter(|line| TOTAL_LABEL.is_match(line))
            .find_map(first_amount),
        TotalStrategy::Anchored => TOTAL_LABEL
            .find(text)
            .and_then(|m| first_amount(&text[m.end()..])),
    };

    debug!("Total ({:?}): {:?}", strategy, total);
    total.map(to_money).unwrap_or(ZERO_MONEY)
}

/// Sum of every amount on lines mentioning "tax" or "fee".
pub fn extract_tax(text: &str) -> Decimal {
    sum_labelled(text, &TAX_LABEL, |_| true)
}

/// Sum of discount-like lines (discount, credit, coupon, promotion, rebate,
/// offer) as a positive magnitude. Credit-card payment lines are not
/// discounts.
pub fn extract_discount(text: &str) -> Decimal {
    sum_labelled(text, &DISCOUNT_LABEL, |line| !CREDIT_CARD.is_match(line))
}

/// Sum of tip and gratuity lines.
pub fn extract_tip(text: &str) -> Decimal {
    sum_labelled(text, &TIP_LABEL, |_| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const RECEIPT: &str = "Milk   3.99\nBread   2.50\nSubtotal   6.49\nTax   0.50\nTotal   6.99";

    #[test]
    fn test_total_bottom_up() {
        assert_eq!(extract_total(RECEIPT, TotalStrategy::BottomUp), dec("6.99"));
    }

    #[test]
    fn test_total_bottom_up_prefers_last_total_line() {
        let text = "Sub Total 6.49\nTax 0.50\nTotal 6.99\nCash 10.00";
        assert_eq!(extract_total(text, TotalStrategy::BottomUp), dec("6.99"));
        assert_eq!(extract_total(text, TotalStrategy::Anchored), dec("6.49"));
    }

    #[test]
    fn test_total_anchored_crosses_lines() {
        let text = "TOTAL\n$12.00\nThank you";
        assert_eq!(extract_total(text, TotalStrategy::Anchored), dec("12.00"));
        assert_eq!(extract_total(text, TotalStrategy::BottomUp), Decimal::ZERO);
    }

    #[test]
    fn test_total_skips_lines_without_amount() {
        let text = "Total 6.99\nTotal savings today!";
        assert_eq!(extract_total(text, TotalStrategy::BottomUp), dec("6.99"));
    }

    #[test]
    fn test_total_undotted_fallback() {
        assert_eq!(extract_total("Total 699", TotalStrategy::BottomUp), dec("6.99"));
    }

    #[test]
    fn test_total_missing() {
        assert_eq!(extract_total("Milk 3.99", TotalStrategy::BottomUp), Decimal::ZERO);
    }

    #[test]
    fn test_tax_sums_all_lines() {
        let text = "State Tax 0.40\nCity tax 0.10\nBag Fee 0.05\nCoffee 3.50";
        assert_eq!(extract_tax(text), dec("0.55"));
    }

    #[test]
    fn test_tax_ignores_percentages() {
        assert_eq!(extract_tax("Tax 8.25% 0.66"), dec("0.66"));
        assert_eq!(extract_tax("Tax 8% 0.66"), dec("0.66"));
    }

    #[test]
    fn test_tax_missing_is_zero() {
        let tax = extract_tax("Milk 3.99");
        assert_eq!(tax, Decimal::ZERO);
        assert_eq!(tax.to_string(), "0.00");
    }

    #[test]
    fn test_discount_is_positive_magnitude() {
        assert_eq!(extract_discount("Coupon -1.00"), dec("1.00"));
        assert_eq!(
            extract_discount("Member Discount -0.50\nPromotion 1.25\nMilk 3.99"),
            dec("1.75")
        );
    }

    #[test]
    fn test_discount_ignores_credit_card_payment() {
        assert_eq!(extract_discount("Credit Card 6.99\nStore Credit -2.00"), dec("2.00"));
    }

    #[test]
    fn test_tip() {
        assert_eq!(extract_tip("Tip 2.00\nGratuity 1.50"), dec("3.50"));
        assert_eq!(extract_tip("Tipsy Cake 4.00"), Decimal::ZERO);
    }

    #[test]
    fn test_extract_all_amounts() {
        let results = AmountExtractor::new().extract_all("Milk 3.99, Tax 8% 0.30, Total 4.29");
        let values: Vec<Decimal> = results.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![dec("3.99"), dec("0.30"), dec("4.29")]);
        assert_eq!(results[0].position, Some((5, 9)));
    }
}
