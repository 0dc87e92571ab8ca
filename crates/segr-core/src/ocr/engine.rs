//! Pure Rust OCR using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::PageTextExtractor;
use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::pdf::PdfDocument;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let [det_path, rec_path, dict_path] = config.model_files();

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }

    /// Recognize the text of an image, in reading order.
    pub fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut lines: Vec<((f64, f64), String)> = results
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

        // Rows are bucketed by 20px so slightly skewed boxes stay on one line.
        lines.sort_by(|((ax, ay), _), ((bx, by), _)| {
            let row_a = (ay / 20.0) as i64;
            let row_b = (by / 20.0) as i64;
            row_a
                .cmp(&row_b)
                .then(ax.partial_cmp(bx).unwrap_or(std::cmp::Ordering::Equal))
        });

        debug!(
            "OCR on {}x{} image: {} text regions in {}ms",
            width,
            height,
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(lines
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

/// Runs OCR on the raster image of each scanned page.
pub struct OcrTextExtractor {
    engine: PureOcrEngine,
}

impl OcrTextExtractor {
    pub fn new(engine: PureOcrEngine) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Ok(Self::new(PureOcrEngine::from_config(config)?))
    }
}

impl PageTextExtractor for OcrTextExtractor {
    fn extract_page(&self, document: &PdfDocument, page: usize) -> Result<String, OcrError> {
        let images = document.page_images(page)?;

        // The largest image on a scanned page is the scan itself.
        let image = images
            .iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or(OcrError::NoImage(page))?;

        self.engine.extract_text(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_to_load() {
        let config = OcrConfig {
            model_dir: "/nonexistent/models".into(),
            ..OcrConfig::default()
        };
        assert!(matches!(
            PureOcrEngine::from_config(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
