//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::OcrBackend;

/// Detection model file name inside the model directory.
pub const DETECTION_MODEL: &str = "det.onnx";
/// Recognition model file name inside the model directory.
pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
/// Character dictionary file name inside the model directory.
pub const DICTIONARY: &str = "latin_dict.txt";

/// Rows closer than this many pixels are read as one line.
const ROW_HEIGHT: f64 = 20.0;

/// OCR backend backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrBackend {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrBackend {
    /// Load the models from `config.model_dir`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Self::from_dir(&config.model_dir, config.keep_unk)
    }

    /// Load the models from a directory.
    pub fn from_dir(model_dir: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join(DETECTION_MODEL);
        let rec_path = model_dir.join(RECOGNITION_MODEL);
        let dict_path = model_dir.join(DICTIONARY);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine, keep_unk })
    }
}

impl OcrBackend for PureOcrBackend {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("image has no pixels".to_string()));
        }

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let regions: Vec<((f64, f64), String)> = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                (top_left(&r.bounding_box), text)
            })
            .collect();

        let text = reading_order(regions);

        info!(
            "OCR complete on {}x{} image in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Lay regions out as receipt text: rows top to bottom, one line per
/// `ROW_HEIGHT` band, regions in a row left to right separated by two spaces.
fn reading_order(mut regions: Vec<((f64, f64), String)>) -> String {
    let row = |y: f64| (y / ROW_HEIGHT) as i64;

    regions.retain(|(_, text)| !text.trim().is_empty());
    regions.sort_by(|((ax, ay), _), ((bx, by), _)| {
        row(*ay)
            .cmp(&row(*by))
            .then(ax.partial_cmp(bx).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut text = String::new();
    let mut current_row = None;
    for ((_, y), region) in regions {
        match current_row {
            Some(r) if r == row(y) => text.push_str("  "),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_row = Some(row(y));
        text.push_str(region.trim());
    }
    text
}

/// Smallest x and y of a region's outline.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_is_model_load_error() {
        let dir = std::env::temp_dir().join("rcpt-no-models-here");
        let err = PureOcrBackend::from_dir(&dir, false).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }

    fn region(x: f64, y: f64, text: &str) -> ((f64, f64), String) {
        ((x, y), text.to_string())
    }

    #[test]
    fn test_reading_order_pairs_name_and_price() {
        let regions = vec![
            region(300.0, 102.0, "3.99"),
            region(10.0, 130.0, "Bread"),
            region(10.0, 100.0, "Milk"),
            region(300.0, 128.0, "2.50"),
            region(10.0, 10.0, "Corner Market"),
        ];
        assert_eq!(
            reading_order(regions),
            "Corner Market\nMilk  3.99\nBread  2.50"
        );
    }

    #[test]
    fn test_reading_order_feeds_item_extraction() {
        let text = reading_order(vec![region(10.0, 100.0, "Milk"), region(300.0, 102.0, "3.99")]);
        let items = crate::receipt::rules::extract_items(&text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].price.to_string(), "3.99");
    }

    #[test]
    fn test_reading_order_skips_blank_regions() {
        let regions = vec![region(0.0, 0.0, "  "), region(0.0, 40.0, "Total  6.99")];
        assert_eq!(reading_order(regions), "Total  6.99");
        assert_eq!(reading_order(Vec::new()), "");
    }
}
