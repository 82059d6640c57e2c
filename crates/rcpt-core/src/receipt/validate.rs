//! Cross-validation of item sum, tax, tip and discount against the total.

use rust_decimal::Decimal;

use crate::models::receipt::{LineItem, ReceiptRecord};

use super::rules::to_money;

/// Default reconciliation tolerance (one cent).
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// How a record's amounts reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// `sum(items) + tax + tip - discount`, or `None` on arithmetic overflow.
    pub computed: Option<Decimal>,
    /// Extracted total.
    pub total: Decimal,
    /// Whether `|computed - total| <= tolerance`.
    pub matches: bool,
}

impl Reconciliation {
    /// `computed - total`, when computable.
    pub fn difference(&self) -> Option<Decimal> {
        self.computed.and_then(|c| c.checked_sub(self.total))
    }
}

/// Whether `sum(items) + tax - discount` is within one cent of `total`.
///
/// `discount` is taken as a magnitude regardless of its sign. Never panics;
/// overflow counts as a mismatch.
pub fn validate_total(items: &[LineItem], tax: Decimal, discount: Decimal, total: Decimal) -> bool {
    expected_total(items, tax, Decimal::ZERO, discount)
        .is_some_and(|computed| within(computed, total, DEFAULT_TOLERANCE))
}

/// Reconcile a full record, tip included.
pub fn reconcile(record: &ReceiptRecord, tolerance: Decimal) -> Reconciliation {
    let computed = expected_total(&record.items, record.tax, record.tip, record.discount);
    Reconciliation {
        computed,
        total: record.total,
        matches: computed.is_some_and(|c| within(c, record.total, tolerance)),
    }
}

fn expected_total(
    items: &[LineItem],
    tax: Decimal,
    tip: Decimal,
    discount: Decimal,
) -> Option<Decimal> {
    let items_sum = items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.price))?;

    items_sum
        .checked_add(tax)?
        .checked_add(tip)?
        .checked_sub(discount.abs())
        .map(to_money)
}

fn within(computed: Decimal, total: Decimal, tolerance: Decimal) -> bool {
    computed
        .checked_sub(total)
        .is_some_and(|diff| diff.abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("Milk", dec("3.99")),
            LineItem::new("Bread", dec("2.50")),
        ]
    }

    #[test]
    fn test_matching_total() {
        assert!(validate_total(&items(), dec("0.50"), Decimal::ZERO, dec("6.99")));
    }

    #[test]
    fn test_tolerance_is_one_cent() {
        assert!(validate_total(&items(), dec("0.50"), Decimal::ZERO, dec("7.00")));
        assert!(validate_total(&items(), dec("0.50"), Decimal::ZERO, dec("6.98")));
        assert!(!validate_total(&items(), dec("0.50"), Decimal::ZERO, dec("7.01")));
    }

    #[test]
    fn test_discount_sign_does_not_matter() {
        assert!(validate_total(&items(), dec("0.50"), dec("1.00"), dec("5.99")));
        assert!(validate_total(&items(), dec("0.50"), dec("-1.00"), dec("5.99")));
    }

    #[test]
    fn test_empty_items() {
        assert!(validate_total(&[], Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        assert!(!validate_total(&[], Decimal::ZERO, Decimal::ZERO, dec("1.00")));
    }

    #[test]
    fn test_overflow_is_mismatch() {
        let huge = vec![
            LineItem::new("A", Decimal::MAX),
            LineItem::new("B", Decimal::MAX),
        ];
        assert!(!validate_total(&huge, Decimal::ZERO, Decimal::ZERO, Decimal::MAX));
    }

    #[test]
    fn test_reconcile_includes_tip() {
        let record = ReceiptRecord {
            store: "Cafe".to_string(),
            date: String::new(),
            items: items(),
            tax: dec("0.50"),
            tip: dec("1.00"),
            discount: Decimal::ZERO,
            total: dec("7.99"),
            currency: "$".to_string(),
        };

        let r = reconcile(&record, DEFAULT_TOLERANCE);
        assert!(r.matches);
        assert_eq!(r.computed, Some(dec("7.99")));
        assert_eq!(r.difference(), Some(Decimal::ZERO));
    }
}
