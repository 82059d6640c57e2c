//! OCR text cleanup.

mod repair;

pub use repair::{normalize, DECIMAL_SENTINEL};
