//! Line-item extraction.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::config::ItemStrategy;
use crate::models::receipt::LineItem;

use super::patterns::{
    DATE_ISO, DATE_MDY, ITEM_GAP_LINE, ITEM_SCAN, ITEM_SPACE_LINE, NAME_NOISE, SUMMARY_LINE,
};
use super::price::{accept_price, parse_price, to_money, MAX_ITEM_PRICE};
use super::FieldExtractor;

/// Line-item extractor.
#[derive(Debug, Clone, Copy)]
pub struct ItemExtractor {
    strategy: ItemStrategy,
    recover_large_prices: bool,
}

impl ItemExtractor {
    pub fn new() -> Self {
        Self {
            strategy: ItemStrategy::Auto,
            recover_large_prices: false,
        }
    }

    /// Set the extraction strategy. `Model` behaves like `Auto` here; the
    /// processor routes it to the AI extractor before this is reached.
    pub fn with_strategy(mut self, strategy: ItemStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Divide prices above 1000 by 100 before the sanity check.
    pub fn with_large_price_recovery(mut self, enabled: bool) -> Self {
        self.recover_large_prices = enabled;
        self
    }

    fn accept(&self, raw_name: &str, raw_price: &str) -> Option<LineItem> {
        let name = clean_item_name(raw_name);
        if name.is_empty() {
            return None;
        }

        let mut price = parse_price(raw_price);
        if self.recover_large_prices && price > MAX_ITEM_PRICE {
            price = to_money(price / Decimal::ONE_HUNDRED);
        }

        if !accept_price(price) {
            trace!("Rejected item {:?} at {}", name, price);
            return None;
        }

        Some(LineItem::new(name, price))
    }

    fn by_lines(&self, text: &str) -> Vec<LineItem> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !is_summary_line(line))
            .filter_map(|line| {
                if let Some(caps) = ITEM_GAP_LINE.captures(line) {
                    return self.accept(&caps[1], &caps[2]);
                }
                let caps = ITEM_SPACE_LINE.captures(line)?;
                if !plausible_spaced_price(&caps[2]) {
                    trace!("Skipped {:?}: short number after a single space", line);
                    return None;
                }
                self.accept(&caps[1], &caps[2])
            })
            .collect()
    }

    fn by_scan(&self, text: &str) -> Vec<LineItem> {
        ITEM_SCAN
            .captures_iter(text)
            .filter(|caps| !SUMMARY_LINE.is_match(&caps[1]))
            .filter_map(|caps| self.accept(&caps[1], &caps[2]))
            .collect()
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let items = match self.strategy {
            ItemStrategy::Lines => self.by_lines(text),
            ItemStrategy::Scan => self.by_scan(text),
            ItemStrategy::Auto | ItemStrategy::Model => {
                let items = self.by_lines(text);
                if items.is_empty() {
                    debug!("No items found line by line, scanning whole text");
                    self.by_scan(text)
                } else {
                    items
                }
            }
        };

        debug!("Extracted {} items ({:?})", items.len(), self.strategy);
        items
    }
}

/// Extract line items from normalized text with the default strategy.
pub fn extract_items(text: &str) -> Vec<LineItem> {
    ItemExtractor::new().extract_all(text)
}

/// Extract one item per line: `name<2+ spaces>price`, falling back to
/// `name<space>price` at end of line.
pub fn extract_items_by_lines(text: &str) -> Vec<LineItem> {
    ItemExtractor::new()
        .with_strategy(ItemStrategy::Lines)
        .extract_all(text)
}

/// Extract items by scanning the whole text for "text then price",
/// regardless of line boundaries.
pub fn extract_items_by_scan(text: &str) -> Vec<LineItem> {
    ItemExtractor::new()
        .with_strategy(ItemStrategy::Scan)
        .extract_all(text)
}

/// Remove the standalone words "price", "total" and "tax", collapse spaces
/// and trim label punctuation.
pub fn clean_item_name(raw: &str) -> String {
    let stripped = NAME_NOISE.replace_all(raw, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '.' | '*' | '@' | '#' | '='));

    if trimmed.chars().any(char::is_alphanumeric) {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// A price after a single space needs a decimal point or three digits, so
/// `Cashier 7` or `Aisle 12` are not read as cents.
fn plausible_spaced_price(token: &str) -> bool {
    token.contains('.') || token.chars().filter(char::is_ascii_digit).count() >= 3
}

/// Lines owned by a summary field (tax, total, discount, tip, payment) or
/// carrying a date never describe an item.
fn is_summary_line(line: &str) -> bool {
    SUMMARY_LINE.is_match(line) || DATE_MDY.is_match(line) || DATE_ISO.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn item(name: &str, price: &str) -> LineItem {
        LineItem::new(name, Decimal::from_str(price).unwrap())
    }

    #[test]
    fn test_lines_basic_receipt() {
        let text = "Milk   3.99\nBread   2.50\nTax   0.50\nTotal   6.99";
        assert_eq!(
            extract_items(text),
            vec![item("Milk", "3.99"), item("Bread", "2.50")]
        );
    }

    #[test]
    fn test_lines_single_space_fallback() {
        let text = "Eggs 2.49\nChoc Milk $4.10";
        assert_eq!(
            extract_items_by_lines(text),
            vec![item("Eggs", "2.49"), item("Choc Milk", "4.10")]
        );
    }

    #[test]
    fn test_single_space_needs_real_price() {
        let text = "Cashier 7\nAisle 12\nMilk   3.99\nGum 199\nVISA 1234";
        assert_eq!(
            extract_items_by_lines(text),
            vec![item("Milk", "3.99"), item("Gum", "1.99")]
        );
        assert_eq!(extract_items_by_lines("Pen   7"), vec![item("Pen", "0.07")]);
    }

    #[test]
    fn test_lines_keep_multiword_names_before_gap() {
        let text = "Organic Whole Milk    5.49";
        assert_eq!(extract_items(text), vec![item("Organic Whole Milk", "5.49")]);
    }

    #[test]
    fn test_undotted_price_is_cents() {
        assert_eq!(extract_items("Gum   199"), vec![item("Gum", "1.99")]);
    }

    #[test]
    fn test_sanity_filter() {
        let text = "Freebie   0.00\nTV   1500.00\nLaptop   999.99\nPenny   0.01";
        assert_eq!(extract_items(text), vec![item("Laptop", "999.99")]);
    }

    #[test]
    fn test_large_price_recovery() {
        let extractor = ItemExtractor::new().with_large_price_recovery(true);
        assert_eq!(
            extractor.extract_all("Cheese   1549.00"),
            vec![item("Cheese", "15.49")]
        );
        assert!(extract_items("Cheese   1549.00").is_empty());
    }

    #[test]
    fn test_summary_lines_are_not_items() {
        let text = "Milk   3.99\nSubtotal   3.99\nCoupon -1.00\nSales Tax   0.30\nTip   1.00\n03/15/2024 10 45";
        assert_eq!(extract_items(text), vec![item("Milk", "3.99")]);
    }

    #[test]
    fn test_noise_words_removed_from_names() {
        let text = "Apples price   1.25";
        assert_eq!(extract_items(text), vec![item("Apples", "1.25")]);
    }

    #[test]
    fn test_preserves_source_order() {
        let text = "Zucchini  1.10\nApple  0.80\nMango  2.00";
        let names: Vec<_> = extract_items(text).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Zucchini", "Apple", "Mango"]);
    }

    #[test]
    fn test_scan_handles_two_columns() {
        let text = "Milk 3.99  Bread 2.50\nTotal 6.49";
        assert_eq!(
            extract_items_by_scan(text),
            vec![item("Milk", "3.99"), item("Bread", "2.50")]
        );
    }

    #[test]
    fn test_auto_falls_back_to_scan() {
        // No line ends in a price, so the line pass finds nothing.
        let text = "Milk 3.99 each\nBread 2.50 each";
        assert_eq!(
            extract_items(text),
            vec![item("Milk", "3.99"), item("Bread", "2.50")]
        );
    }

    #[test]
    fn test_clean_item_name() {
        assert_eq!(clean_item_name("  Milk  "), "Milk");
        assert_eq!(clean_item_name("Total"), "");
        assert_eq!(clean_item_name("TAX:"), "");
        assert_eq!(clean_item_name("Bread price"), "Bread");
        assert_eq!(clean_item_name("Totally Nuts"), "Totally Nuts");
        assert_eq!(clean_item_name("**"), "");
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_items("").is_empty());
        assert!(extract_items("\n\n   \n").is_empty());
    }
}
