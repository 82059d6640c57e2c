//! Configuration structures for the receipt pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// AI item extractor configuration.
    pub ai: AiConfig,
}

/// How line items are located in the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStrategy {
    /// One item per line, name followed by a trailing price.
    Lines,
    /// Whole-text scan for "text then price", ignoring line boundaries.
    Scan,
    /// Lines first, whole-text scan when lines yield nothing.
    #[default]
    Auto,
    /// Delegate to the AI item extractor.
    Model,
}

/// Which "total" line wins when several are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalStrategy {
    /// Last total-labelled line in reading order.
    #[default]
    BottomUp,
    /// First amount after the first `Total` label anywhere in the text.
    Anchored,
}

/// Sign stored in [`ReceiptRecord::discount`](super::receipt::ReceiptRecord::discount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSign {
    /// Non-negative magnitude.
    #[default]
    Magnitude,
    /// Non-positive adjustment.
    Negative,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Item extraction strategy.
    pub item_strategy: ItemStrategy,

    /// Total extraction strategy.
    pub total_strategy: TotalStrategy,

    /// Sign convention for the stored discount.
    pub discount_sign: DiscountSign,

    /// Divide item prices above 1000 by 100 before the sanity check.
    pub recover_large_prices: bool,

    /// Currency symbol used when none is found in the text.
    pub default_currency: String,

    /// Allowed difference between computed and extracted totals.
    pub tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            item_strategy: ItemStrategy::default(),
            total_strategy: TotalStrategy::default(),
            discount_sign: DiscountSign::default(),
            recover_large_prices: false,
            default_currency: "$".to_string(),
            tolerance: Decimal::new(1, 2),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` tokens in recognized text instead of replacing them with spaces.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            keep_unk: false,
        }
    }
}

/// AI item extractor configuration.
///
/// The API key is only ever read from here; the library never consults
/// environment variables on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,

    /// Model name sent with each request.
    pub model: String,

    /// API key for the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4-turbo".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RcptConfig::default();
        assert_eq!(config.extraction.item_strategy, ItemStrategy::Auto);
        assert_eq!(config.extraction.total_strategy, TotalStrategy::BottomUp);
        assert_eq!(config.extraction.discount_sign, DiscountSign::Magnitude);
        assert_eq!(config.extraction.tolerance.to_string(), "0.01");
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"extraction": {"item_strategy": "scan", "discount_sign": "negative"}}"#;
        let config: RcptConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extraction.item_strategy, ItemStrategy::Scan);
        assert_eq!(config.extraction.discount_sign, DiscountSign::Negative);
        assert_eq!(config.extraction.default_currency, "$");
        assert_eq!(config.ai.timeout_secs, 60);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("rcpt-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = RcptConfig::default();
        config.extraction.total_strategy = TotalStrategy::Anchored;
        config.save(&path).unwrap();

        let loaded = RcptConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.total_strategy, TotalStrategy::Anchored);

        std::fs::remove_dir_all(&dir).ok();
    }
}
