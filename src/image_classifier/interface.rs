use crate::device_capture::captured_image::CapturedImage;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub confidence: f32,
}

impl Label {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("model asset not found: {0}")]
    ModelNotFound(String),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("configuration rejected: {0}")]
    Rejected(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("labeler is closed")]
    Closed,
}

/// On-device labeling runtime.
pub trait LabelEngine: Send + Sync {
    fn load_model(&self, name: &str, asset_path: &Path) -> Result<Box<dyn LoadedModel>, EngineError>;
}

pub trait LoadedModel: Send + Sync {
    /// Builds a labeler that only reports labels scoring at least `confidence_threshold`.
    fn configure(self: Box<Self>, confidence_threshold: f32) -> Result<Box<dyn Labeler>, EngineError>;
}

pub trait Labeler: Send + Sync {
    /// Labels sorted by descending confidence.
    fn label(&self, image: &CapturedImage) -> Result<Vec<Label>, EngineError>;

    fn close(&self) -> Result<(), EngineError>;
}
