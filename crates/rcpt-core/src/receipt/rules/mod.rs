//! Rule-based extractors for receipt fields.

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod items;
pub mod patterns;
pub mod price;
pub mod store;

pub use amounts::{extract_discount, extract_tax, extract_tip, extract_total, AmountExtractor};
pub use currency::detect_currency;
pub use dates::{extract_date, DateExtractor};
pub use items::{
    clean_item_name, extract_items, extract_items_by_lines, extract_items_by_scan, ItemExtractor,
};
pub use price::{accept_price, parse_price, to_money, ZERO_MONEY};
pub use store::extract_store;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field. Defaults to the single match.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.extract(text).into_iter().collect()
    }
}

/// An extracted value and where it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
