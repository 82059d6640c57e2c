//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - OCR text repair (misread decimal points, dropped cents, split digits)
//! - Price parsing with OCR-error recovery
//! - Receipt field extraction (store, date, items, tax, tip, discount, total)
//! - Cross-validation of items and summary amounts against the total
//! - OCR and AI item-extraction collaborators behind small traits

pub mod ai;
pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;
pub mod text;

pub use error::{AiError, OcrError, RcptError, Result};
pub use models::config::{AiConfig, ExtractionConfig, OcrConfig, RcptConfig};
pub use models::receipt::{ErrorResult, LineItem, Outcome, ReceiptRecord};
pub use ocr::{OcrBackend, StaticText};
#[cfg(feature = "native")]
pub use ocr::PureOcrBackend;
pub use ai::ItemModel;
#[cfg(feature = "ai")]
pub use ai::OpenAiItemModel;
pub use receipt::{ExtractionResult, ReceiptProcessor};
pub use receipt::{reconcile, validate_total};
pub use text::normalize;
