use crate::image_classifier::interface::EngineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_input_size() -> [u32; 2] {
    [224, 224]
}

/// Bundled model descriptor. File names are relative to the manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelManifest {
    pub model_file: String,
    pub labels_file: String,
    /// `[width, height]` the model expects.
    #[serde(default = "default_input_size")]
    pub input_size: [u32; 2],
}

impl ModelManifest {
    pub fn read(path: &Path) -> Result<(Self, PathBuf), EngineError> {
        if !path.is_file() {
            return Err(EngineError::ModelNotFound(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidModel(format!("{}: {}", path.display(), e)))?;

        let manifest: ModelManifest = serde_json::from_str(&text)
            .map_err(|e| EngineError::InvalidModel(format!("{}: {}", path.display(), e)))?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok((manifest, base_dir))
    }

    pub fn read_labels(&self, base_dir: &Path) -> Result<Vec<String>, EngineError> {
        let path = base_dir.join(&self.labels_file);
        let text = std::fs::read_to_string(&path)
            .map_err(|_| EngineError::ModelNotFound(path.display().to_string()))?;

        let labels: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if labels.is_empty() {
            return Err(EngineError::InvalidModel(format!(
                "{} lists no labels",
                path.display()
            )));
        }

        Ok(labels)
    }
}
