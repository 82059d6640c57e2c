//! OCR collaborators.
//!
//! The extraction pipeline only needs text. Anything that turns an image
//! into text implements [`OcrBackend`].

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrBackend;

use image::DynamicImage;

use crate::error::OcrError;

/// Turns a receipt image into raw text.
pub trait OcrBackend {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Backend that ignores the image and returns preset text.
///
/// Useful when OCR already happened elsewhere and for tests.
#[derive(Debug, Clone)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for StaticText {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}
