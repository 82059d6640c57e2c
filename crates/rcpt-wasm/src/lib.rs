//! WASM bindings for receipt OCR text extraction.
//!
//! OCR happens in the host (browser or Node.js); these bindings take its
//! text and return the structured receipt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use rcpt_core::models::config::{DiscountSign, ExtractionConfig, ItemStrategy, TotalStrategy};
use rcpt_core::models::receipt::{LineItem, Outcome, ReceiptRecord};
use rcpt_core::receipt::ReceiptProcessor;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// Extract a receipt from OCR text.
///
/// Returns the receipt record, or `{error}` when nothing could be extracted.
#[wasm_bindgen]
pub fn process_text(text: &str) -> Result<JsValue, JsValue> {
    let outcome = Outcome::from(ReceiptProcessor::new().process_text(text).map(|r| r.record));
    to_js(&outcome)
}

/// Repair common OCR corruption in receipt text.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    rcpt_core::text::normalize(text)
}

/// Parse a loosely formatted price token (e.g. "$1,234.56" or "599").
///
/// Returned as a string with exactly two decimals to avoid float rounding.
#[wasm_bindgen]
pub fn parse_price(token: &str) -> String {
    rcpt_core::receipt::rules::parse_price(token).to_string()
}

#[derive(Debug, Deserialize)]
struct TotalCheck {
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default)]
    tax: Decimal,
    #[serde(default)]
    discount: Decimal,
    total: Decimal,
}

/// Check `sum(items) + tax - discount` against `total` within one cent.
///
/// Takes JSON `{items: [{name, price}], tax, discount, total}`; amounts may
/// be numbers or strings.
#[wasm_bindgen]
pub fn validate_total(json: &str) -> Result<bool, JsValue> {
    let check: TotalCheck = serde_json::from_str(json).map_err(js_error)?;
    Ok(rcpt_core::validate_total(
        &check.items,
        check.tax,
        check.discount,
        check.total,
    ))
}

/// Configurable receipt extractor for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    config: ExtractionConfig,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a new receipt extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Set the item strategy: "lines", "scan" or "auto".
    #[wasm_bindgen]
    pub fn set_item_strategy(&mut self, strategy: &str) -> Result<(), JsValue> {
        let strategy: ItemStrategy = parse_choice(strategy)?;
        if strategy == ItemStrategy::Model {
            return Err(js_error("item strategy `model` is not available in WASM"));
        }
        self.config.item_strategy = strategy;
        Ok(())
    }

    /// Set the total strategy: "bottom_up" or "anchored".
    #[wasm_bindgen]
    pub fn set_total_strategy(&mut self, strategy: &str) -> Result<(), JsValue> {
        self.config.total_strategy = parse_choice::<TotalStrategy>(strategy)?;
        Ok(())
    }

    /// Store discounts as negative adjustments instead of magnitudes.
    #[wasm_bindgen]
    pub fn set_negative_discount(&mut self, negative: bool) {
        self.config.discount_sign = if negative {
            DiscountSign::Negative
        } else {
            DiscountSign::Magnitude
        };
    }

    /// Retry item prices above 1000 divided by 100.
    #[wasm_bindgen]
    pub fn set_recover_large_prices(&mut self, enabled: bool) {
        self.config.recover_large_prices = enabled;
    }

    /// Currency symbol used when the text has none.
    #[wasm_bindgen]
    pub fn set_default_currency(&mut self, currency: &str) {
        self.config.default_currency = currency.to_string();
    }

    fn processor(&self) -> ReceiptProcessor {
        ReceiptProcessor::from_config(self.config.clone())
    }

    /// Extract a receipt from text. Returns the record or `{error}`.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let outcome = Outcome::from(self.processor().process_text(text).map(|r| r.record));
        to_js(&outcome)
    }

    /// Get extraction result with metadata.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.processor().process_text(text).map_err(js_error)?;

        #[derive(Serialize)]
        struct ExtractResult {
            receipt: ReceiptRecord,
            normalized_text: String,
            total_matches: bool,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        let output = ExtractResult {
            receipt: result.record,
            normalized_text: result.normalized_text,
            total_matches: result.total_matches,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        };

        to_js(&output)
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a snake_case config choice the way the config file spells it.
fn parse_choice<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| js_error(format!("unknown option: {}", value)))
}
