//! Receipt processor assembling normalization, extraction and validation.

use image::DynamicImage;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::ai::{extract_items_via_model, ItemModel};
use crate::error::{RcptError, Result};
use crate::models::config::{DiscountSign, ExtractionConfig, ItemStrategy, TotalStrategy};
use crate::models::receipt::{LineItem, ReceiptRecord};
use crate::ocr::OcrBackend;
use crate::text::normalize;

use super::rules::{
    detect_currency, extract_date, extract_discount, extract_store, extract_tax, extract_tip,
    extract_total, FieldExtractor, ItemExtractor,
};
use super::validate::reconcile;

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt data.
    pub record: ReceiptRecord,
    /// Text after OCR repair, as seen by the extractors.
    pub normalized_text: String,
    /// Whether items, tax, tip and discount add up to the total.
    pub total_matches: bool,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-based receipt processor.
#[derive(Debug, Clone, Default)]
pub struct ReceiptProcessor {
    config: ExtractionConfig,
}

impl ReceiptProcessor {
    /// Create a processor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor from an extraction config.
    pub fn from_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Set the item extraction strategy.
    pub fn with_item_strategy(mut self, strategy: ItemStrategy) -> Self {
        self.config.item_strategy = strategy;
        self
    }

    /// Set the total extraction strategy.
    pub fn with_total_strategy(mut self, strategy: TotalStrategy) -> Self {
        self.config.total_strategy = strategy;
        self
    }

    /// Set the sign convention for the stored discount.
    pub fn with_discount_sign(mut self, sign: DiscountSign) -> Self {
        self.config.discount_sign = sign;
        self
    }

    /// Enable the divide-by-100 retry for item prices above 1000.
    pub fn with_large_price_recovery(mut self, enabled: bool) -> Self {
        self.config.recover_large_prices = enabled;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract a receipt from raw OCR text with the rule-based item extractor.
    ///
    /// Fails only on empty input, or when the configured item strategy is
    /// [`ItemStrategy::Model`], which needs [`process_with_model`](Self::process_with_model).
    pub fn process_text(&self, raw: &str) -> Result<ExtractionResult> {
        let clock = Stopwatch::start();
        let normalized = normalize_nonempty(raw)?;

        if self.config.item_strategy == ItemStrategy::Model {
            return Err(RcptError::Config(
                "item strategy `model` needs an AI item model".to_string(),
            ));
        }

        let items = ItemExtractor::new()
            .with_strategy(self.config.item_strategy)
            .with_large_price_recovery(self.config.recover_large_prices)
            .extract_all(&normalized);

        Ok(self.assemble(normalized, items, clock))
    }

    /// Run `backend` on an image, then extract from the recognized text.
    pub fn process_image<B: OcrBackend>(
        &self,
        backend: &B,
        image: &DynamicImage,
    ) -> Result<ExtractionResult> {
        let text = backend.recognize(image)?;
        debug!("OCR produced {} characters", text.len());
        self.process_text(&text)
    }

    /// Extract a receipt taking items from `model` and every other field
    /// from the rule extractors. Any model failure fails the whole receipt.
    pub async fn process_with_model<M: ItemModel>(
        &self,
        raw: &str,
        model: &M,
    ) -> Result<ExtractionResult> {
        let clock = Stopwatch::start();
        let normalized = normalize_nonempty(raw)?;

        let items = extract_items_via_model(model, &normalized).await?;

        Ok(self.assemble(normalized, items, clock))
    }

    fn assemble(&self, normalized: String, items: Vec<LineItem>, clock: Stopwatch) -> ExtractionResult {
        let mut warnings = Vec::new();

        let store = extract_store(&normalized);
        let date = extract_date(&normalized);
        let tax = extract_tax(&normalized);
        let tip = extract_tip(&normalized);
        let discount = extract_discount(&normalized);
        let total = extract_total(&normalized, self.config.total_strategy);
        let currency = detect_currency(&normalized, &self.config.default_currency);

        if items.is_empty() {
            warnings.push("no line items found".to_string());
        }
        if date.is_empty() {
            warnings.push("no purchase date found".to_string());
        }
        if total.is_zero() {
            warnings.push("no total found".to_string());
        }

        let record = ReceiptRecord {
            store,
            date,
            items,
            tax,
            tip,
            discount: signed_discount(discount, self.config.discount_sign),
            total,
            currency,
        };

        let check = reconcile(&record, self.config.tolerance);
        if !check.matches {
            let message = match check.computed {
                Some(computed) => format!(
                    "items + tax + tip - discount = {} but total is {}",
                    computed, record.total
                ),
                None => "amounts overflow, total not checked".to_string(),
            };
            warn!("{}", message);
            warnings.push(message);
        }

        let processing_time_ms = clock.elapsed_ms();
        info!(
            "Extracted {} items from {} ({}{}) in {}ms",
            record.items.len(),
            record.store,
            record.currency,
            record.total,
            processing_time_ms
        );

        ExtractionResult {
            record,
            normalized_text: normalized,
            total_matches: check.matches,
            warnings,
            processing_time_ms,
        }
    }
}

fn normalize_nonempty(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(RcptError::EmptyText);
    }
    Ok(normalize(raw))
}

fn signed_discount(magnitude: Decimal, sign: DiscountSign) -> Decimal {
    match sign {
        DiscountSign::Negative if !magnitude.is_zero() => -magnitude,
        _ => magnitude,
    }
}

/// Wall-clock timer. `Instant` is unavailable on wasm32, where it reads zero.
#[derive(Debug, Clone, Copy)]
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        #[cfg(not(target_arch = "wasm32"))]
        let ms = self.start.elapsed().as_millis() as u64;
        #[cfg(target_arch = "wasm32")]
        let ms = 0;
        ms
    }
}
