use crate::device_capture::captured_image::CapturedImage;
use crate::image_classifier::interface::{EngineError, Label, LabelEngine, Labeler, LoadedModel};
use crate::image_classifier::tract::image::to_tensor;
use crate::image_classifier::tract::manifest::ModelManifest;
use crate::library::logger::interface::Logger;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

pub struct LabelEngineTractOnnx {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl LabelEngineTractOnnx {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("label_engine").with_namespace("tract"),
        }
    }
}

impl LabelEngine for LabelEngineTractOnnx {
    fn load_model(&self, name: &str, asset_path: &Path) -> Result<Box<dyn LoadedModel>, EngineError> {
        let (manifest, base_dir) = ModelManifest::read(asset_path)?;
        let labels = manifest.read_labels(&base_dir)?;

        let model_path = base_dir.join(&manifest.model_file);
        if !model_path.is_file() {
            return Err(EngineError::ModelNotFound(model_path.display().to_string()));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(&model_path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| EngineError::InvalidModel(format!("{}: {}", model_path.display(), e)))?;

        let _ = self.logger.info(&format!(
            "Loaded {} ({} labels, input {}x{})",
            name,
            labels.len(),
            manifest.input_size[0],
            manifest.input_size[1]
        ));

        Ok(Box::new(ModelTractOnnx {
            plan,
            labels,
            input_size: manifest.input_size,
        }))
    }
}

struct ModelTractOnnx {
    plan: Plan,
    labels: Vec<String>,
    input_size: [u32; 2],
}

impl LoadedModel for ModelTractOnnx {
    fn configure(self: Box<Self>, confidence_threshold: f32) -> Result<Box<dyn Labeler>, EngineError> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(EngineError::Rejected(format!(
                "confidence threshold {} outside [0, 1]",
                confidence_threshold
            )));
        }

        Ok(Box::new(LabelerTractOnnx {
            plan: self.plan,
            labels: self.labels,
            input_size: self.input_size,
            confidence_threshold,
            closed: AtomicBool::new(false),
        }))
    }
}

struct LabelerTractOnnx {
    plan: Plan,
    labels: Vec<String>,
    input_size: [u32; 2],
    confidence_threshold: f32,
    closed: AtomicBool,
}

impl Labeler for LabelerTractOnnx {
    fn label(&self, image: &CapturedImage) -> Result<Vec<Label>, EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }

        let image = image
            .to_dynamic()
            .ok_or_else(|| EngineError::Inference("pixel buffer does not match its size".to_string()))?;

        let input = to_tensor(&image, self.input_size[0], self.input_size[1]);

        let outputs = self
            .plan
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| EngineError::Inference("model produced no output".to_string()))?;

        let scores: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(|e| EngineError::Inference(e.to_string()))?
            .iter()
            .copied()
            .collect();

        Ok(labels_from_scores(&scores, &self.labels, self.confidence_threshold))
    }

    fn close(&self) -> Result<(), EngineError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        Ok(())
    }
}

fn is_probability_vector(scores: &[f32]) -> bool {
    let sum: f32 = scores.iter().sum();
    scores.iter().all(|score| (0.0..=1.0).contains(score)) && (sum - 1.0).abs() < 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|score| (score - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Labels at or above `confidence_threshold`, highest first. Scores that do
/// not already form a probability vector are treated as logits.
fn labels_from_scores(scores: &[f32], labels: &[String], confidence_threshold: f32) -> Vec<Label> {
    let probabilities = if is_probability_vector(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let mut found: Vec<Label> = probabilities
        .into_iter()
        .enumerate()
        .filter(|(_, confidence)| *confidence >= confidence_threshold)
        .map(|(index, confidence)| Label {
            text: labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", index)),
            confidence,
        })
        .collect();

    found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::library::logger::impl_console::LoggerConsole;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_probabilities_are_filtered_and_sorted() {
        let labels = labels_from_scores(&[0.15, 0.85], &names(&["not_barrel", "barrel"]), 0.6);

        assert_eq!(labels, vec![Label::new("barrel", 0.85)]);
    }

    #[test]
    fn test_logits_go_through_softmax() {
        let labels = labels_from_scores(&[4.0, -2.0, 0.5], &names(&["barrel", "drum", "tank"]), 0.6);

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "barrel");
        assert!(labels[0].confidence > 0.9);
    }

    #[test]
    fn test_unnamed_classes_get_an_index_label() {
        let labels = labels_from_scores(&[0.0, 0.0, 1.0], &names(&["barrel"]), 0.6);

        assert_eq!(labels, vec![Label::new("class_2", 1.0)]);
    }

    #[test]
    fn test_missing_manifest_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = LabelEngineTractOnnx::new(Arc::new(LoggerConsole::new(
            Config::default().logger_timezone,
        )));

        let result = engine.load_model("barrel", &dir.path().join("automl/manifest.json"));

        assert!(matches!(result, Err(EngineError::ModelNotFound(_))));
    }

    #[test]
    fn test_missing_model_file_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("manifest.json"),
            r#"{"modelFile": "model.onnx", "labelsFile": "dict.txt"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("dict.txt"), "barrel\nnot_barrel\n").unwrap();
        let engine = LabelEngineTractOnnx::new(Arc::new(LoggerConsole::new(
            Config::default().logger_timezone,
        )));

        let result = engine.load_model("barrel", &dir.path().join("manifest.json"));

        assert!(matches!(result, Err(EngineError::ModelNotFound(path)) if path.ends_with("model.onnx")));
    }

    #[test]
    fn test_corrupt_model_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("manifest.json"),
            r#"{"modelFile": "model.onnx", "labelsFile": "dict.txt"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("dict.txt"), "barrel\n").unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"definitely not protobuf").unwrap();
        let engine = LabelEngineTractOnnx::new(Arc::new(LoggerConsole::new(
            Config::default().logger_timezone,
        )));

        let result = engine.load_model("barrel", &dir.path().join("manifest.json"));

        assert!(matches!(result, Err(EngineError::InvalidModel(_))));
    }
}
