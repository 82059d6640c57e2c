//! Receipt data models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RcptError;

/// Store name used when no `Store Name:` line is present.
pub const UNKNOWN_STORE: &str = "Unknown Store";

/// A single purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item name, trimmed and stripped of the words "price", "total" and "tax".
    pub name: String,

    /// Item price with exactly two fractional digits.
    pub price: Decimal,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// A normalized receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Store name, or [`UNKNOWN_STORE`].
    pub store: String,

    /// Purchase date as `YYYY-MM-DD`, or empty when none was found.
    pub date: String,

    /// Items in source order.
    pub items: Vec<LineItem>,

    /// Sum of all tax and fee lines.
    pub tax: Decimal,

    /// Tip or gratuity.
    #[serde(default)]
    pub tip: Decimal,

    /// Discount total, sign according to [`DiscountSign`](super::config::DiscountSign).
    pub discount: Decimal,

    /// Grand total.
    pub total: Decimal,

    /// Single-character currency symbol.
    pub currency: String,
}

impl ReceiptRecord {
    /// Sum of all item prices.
    pub fn items_sum(&self) -> Decimal {
        let mut sum: Decimal = self.items.iter().map(|i| i.price).sum();
        sum.rescale(2);
        sum
    }
}

/// Output shape for a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl From<&RcptError> for ErrorResult {
    fn from(err: &RcptError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// What a single invocation produces: a record or an error object, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Record(ReceiptRecord),
    Error(ErrorResult),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

impl<E> From<Result<ReceiptRecord, E>> for Outcome
where
    E: Into<RcptError>,
{
    fn from(result: Result<ReceiptRecord, E>) -> Self {
        match result {
            Ok(record) => Outcome::Record(record),
            Err(err) => Outcome::Error(ErrorResult::from(&err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> ReceiptRecord {
        ReceiptRecord {
            store: "Corner Market".to_string(),
            date: "2024-03-15".to_string(),
            items: vec![
                LineItem::new("Milk", dec("3.99")),
                LineItem::new("Bread", dec("2.50")),
            ],
            tax: dec("0.50"),
            tip: dec("0.00"),
            discount: dec("0.00"),
            total: dec("6.99"),
            currency: "$".to_string(),
        }
    }

    #[test]
    fn test_items_sum() {
        assert_eq!(sample().items_sum(), dec("6.49"));
    }

    #[test]
    fn test_record_outcome_serializes_as_plain_record() {
        let json = serde_json::to_value(Outcome::Record(sample())).unwrap();
        assert_eq!(json["store"], "Corner Market");
        assert_eq!(json["items"][1]["name"], "Bread");
        assert_eq!(json["total"], "6.99");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_outcome_has_single_field() {
        let outcome = Outcome::from(Err::<ReceiptRecord, _>(RcptError::EmptyText));
        assert!(outcome.is_error());

        let json = serde_json::to_value(&outcome).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "no text found in receipt");
    }

    #[test]
    fn test_outcome_deserializes_either_shape() {
        let err: Outcome = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(err.is_error());

        let json = serde_json::to_string(&sample()).unwrap();
        let rec: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, Outcome::Record(sample()));
    }
}
