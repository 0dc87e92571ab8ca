//! Configuration structures for the segregation pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SegrError};

/// Main configuration for the segr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegrConfig {
    /// Page text source configuration.
    pub text: TextConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Output file configuration.
    pub output: OutputConfig,
}

/// Where page text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    /// Text layer when long enough, OCR otherwise.
    Auto,
    /// Text layer only.
    Embedded,
    /// OCR on page images only.
    Ocr,
}

/// Page text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Text source selection.
    pub source: TextSource,

    /// Minimum trimmed text length for `auto` to trust the text layer.
    pub min_text_length: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            source: TextSource::Auto,
            min_text_length: 50,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Whether the detection and recognition models are present on disk.
    pub fn models_present(&self) -> bool {
        self.model_files().iter().all(|path| path.exists())
    }

    /// Detection model, recognition model and dictionary, resolved against `model_dir`.
    pub fn model_files(&self) -> [PathBuf; 3] {
        [
            self.model_dir.join(&self.detection_model),
            self.model_dir.join(&self.recognition_model),
            self.model_dir.join(&self.dictionary),
        ]
    }
}

/// Order in which invoice groups are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupOrder {
    /// Order in which each key first received a page.
    #[default]
    FirstSeen,
    /// Sorted by account number, then bill date.
    Key,
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Group write order.
    pub order: GroupOrder,

    /// Replace existing files with the same name.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            order: GroupOrder::FirstSeen,
            overwrite: true,
        }
    }
}

impl SegrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| SegrError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let failed = |reason: String| SegrError::Write {
            path: path.to_path_buf(),
            reason,
        };
        let content = serde_json::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SegrConfig =
            serde_json::from_str(r#"{"output": {"order": "key"}}"#).unwrap();
        assert_eq!(config.output.order, GroupOrder::Key);
        assert!(config.output.overwrite);
        assert_eq!(config.text.source, TextSource::Auto);
        assert_eq!(config.ocr.detection_model, "det.onnx");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SegrConfig::default();
        config.text.source = TextSource::Embedded;
        config.text.min_text_length = 10;
        config.save(&path).unwrap();

        let loaded = SegrConfig::from_file(&path).unwrap();
        assert_eq!(loaded.text.source, TextSource::Embedded);
        assert_eq!(loaded.text.min_text_length, 10);
        assert_eq!(loaded.ocr.model_files()[0], PathBuf::from("models/det.onnx"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SegrConfig::from_file(&path).unwrap_err();
        assert!(matches!(&err, SegrError::Config { path: p, .. } if p == &path));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SegrConfig::from_file(Path::new("/nonexistent/segr.json")).unwrap_err();
        assert!(matches!(err, SegrError::Config { .. }));
    }

    #[test]
    fn test_models_present_requires_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = OcrConfig::default();
        config.model_dir = dir.path().to_path_buf();
        assert!(!config.models_present());

        for path in &config.model_files()[..2] {
            std::fs::write(path, b"").unwrap();
        }
        assert!(!config.models_present());

        std::fs::write(&config.model_files()[2], b"").unwrap();
        assert!(config.models_present());
    }
}
