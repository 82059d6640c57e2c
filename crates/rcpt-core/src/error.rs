//! Error types for the rcpt-core library.
//!
//! Only pipeline-fatal conditions are errors. Individual field and item
//! extractors degrade to defaults and never produce one of these.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// The OCR collaborator could not produce text.
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    /// OCR succeeded but there was nothing to extract from.
    #[error("no text found in receipt")]
    EmptyText,

    /// The AI item extractor failed or returned an unusable response.
    #[error("AI item extraction failed: {0}")]
    Ai(#[from] AiError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by OCR backends.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised by the AI item-extraction collaborator.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key was configured for the model endpoint.
    #[error("no API key configured")]
    MissingApiKey,

    /// The request could not be sent or the response body could not be read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response was not a JSON array of `{name, price}` objects.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
