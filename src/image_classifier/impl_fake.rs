use crate::device_capture::captured_image::CapturedImage;
use crate::image_classifier::interface::{EngineError, Label, LabelEngine, Labeler, LoadedModel};
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum FakeOutput {
    Random,
    Labels(Vec<Label>),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct FakeEngineStats {
    pub loads: AtomicUsize,
    pub labels: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FakeEngineStats {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn labels(&self) -> usize {
        self.labels.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct FakeBehavior {
    output: FakeOutput,
    configure_error: Option<EngineError>,
    delay: Duration,
    stats: Arc<FakeEngineStats>,
    logger: Arc<dyn Logger + Send + Sync>,
}

pub struct LabelEngineFake {
    behavior: FakeBehavior,
    load_error: Option<EngineError>,
    load_delay: Duration,
}

impl LabelEngineFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            behavior: FakeBehavior {
                output: FakeOutput::Random,
                configure_error: None,
                delay: Duration::ZERO,
                stats: Arc::new(FakeEngineStats::default()),
                logger: logger.with_namespace("label_engine").with_namespace("fake"),
            },
            load_error: None,
            load_delay: Duration::ZERO,
        }
    }

    pub fn with_output(mut self, output: FakeOutput) -> Self {
        self.behavior.output = output;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn failing_load(mut self, error: EngineError) -> Self {
        self.load_error = Some(error);
        self
    }

    pub fn failing_configure(mut self, error: EngineError) -> Self {
        self.behavior.configure_error = Some(error);
        self
    }

    pub fn stats(&self) -> Arc<FakeEngineStats> {
        self.behavior.stats.clone()
    }
}

impl LabelEngine for LabelEngineFake {
    fn load_model(&self, name: &str, asset_path: &Path) -> Result<Box<dyn LoadedModel>, EngineError> {
        let _ = self.behavior.logger.info(&format!(
            "Loading model {} from {}",
            name,
            asset_path.display()
        ));

        std::thread::sleep(self.load_delay);

        if let Some(error) = &self.load_error {
            return Err(error.clone());
        }

        self.behavior.stats.loads.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ModelFake {
            behavior: self.behavior.clone(),
        }))
    }
}

struct ModelFake {
    behavior: FakeBehavior,
}

impl LoadedModel for ModelFake {
    fn configure(self: Box<Self>, confidence_threshold: f32) -> Result<Box<dyn Labeler>, EngineError> {
        if let Some(error) = &self.behavior.configure_error {
            return Err(error.clone());
        }

        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(EngineError::Rejected(format!(
                "confidence threshold {} outside [0, 1]",
                confidence_threshold
            )));
        }

        Ok(Box::new(LabelerFake {
            behavior: self.behavior,
            confidence_threshold,
            closed: AtomicBool::new(false),
        }))
    }
}

struct LabelerFake {
    behavior: FakeBehavior,
    confidence_threshold: f32,
    closed: AtomicBool,
}

const OBJECTS: [&str; 8] = [
    "barrel", "not_barrel", "drum", "bucket", "tank", "can", "bottle", "chair",
];

fn random_labels() -> Result<Vec<Label>, EngineError> {
    let mut rng = rand::rng();

    let index_dist =
        Uniform::new(0, OBJECTS.len()).map_err(|e| EngineError::Inference(e.to_string()))?;
    let confidence_dist =
        Uniform::new(0.0f32, 1.0f32).map_err(|e| EngineError::Inference(e.to_string()))?;

    let mut labels: Vec<Label> = (0..4)
        .map(|_| Label::new(OBJECTS[index_dist.sample(&mut rng)], confidence_dist.sample(&mut rng)))
        .collect();
    labels.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    Ok(labels)
}

impl Labeler for LabelerFake {
    fn label(&self, image: &CapturedImage) -> Result<Vec<Label>, EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }

        let _ = self.behavior.logger.info(&format!(
            "Labeling {}x{} image",
            image.width, image.height
        ));

        std::thread::sleep(self.behavior.delay);
        self.behavior.stats.labels.fetch_add(1, Ordering::SeqCst);

        let labels = match &self.behavior.output {
            FakeOutput::Random => random_labels()?,
            FakeOutput::Labels(labels) => labels.clone(),
            FakeOutput::Fail(message) => return Err(EngineError::Inference(message.clone())),
        };

        Ok(labels
            .into_iter()
            .filter(|label| label.confidence >= self.confidence_threshold)
            .collect())
    }

    fn close(&self) -> Result<(), EngineError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        self.behavior.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
