//! Receipt field extraction module.

mod processor;
pub mod rules;
pub mod validate;

pub use processor::{ExtractionResult, ReceiptProcessor};
pub use validate::{reconcile, validate_total, Reconciliation};
