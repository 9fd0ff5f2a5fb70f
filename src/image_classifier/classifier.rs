use crate::config::Config;
use crate::device_capture::captured_image::CapturedImage;
use crate::image_classifier::interface::{EngineError, LabelEngine, Labeler};
use crate::image_classifier::result::ClassificationResult;
use crate::library::logger::interface::Logger;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierInitError {
    #[error("Unable to load model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: EngineError,
    },
    #[error("Unable to configure labeler: {0}")]
    Configure(#[source] EngineError),
    #[error("Classifier is already initializing")]
    InProgress,
    #[error("Classifier was shut down while initializing")]
    ShutDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// Never initialized, failed to initialize, or already shut down.
    #[error("Uninitialized Classifier.")]
    Uninitialized,
    #[error("Error classifying frame: {0}")]
    Inference(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
    Closed,
}

enum Inner {
    Uninitialized,
    /// `shutdown_requested` is set when `shutdown` runs before the load finishes.
    Initializing { shutdown_requested: bool },
    Ready(Arc<dyn Labeler>),
    Failed(ClassifierInitError),
    Closed,
}

pub type ClassifyOutcome = Result<ClassificationResult, ClassificationError>;

/// Pending classification. Resolves exactly once.
pub struct ClassifyTask {
    receiver: Receiver<ClassifyOutcome>,
}

impl ClassifyTask {
    fn resolved(outcome: ClassifyOutcome) -> Self {
        let (tx, receiver) = channel();
        let _ = tx.send(outcome);
        Self { receiver }
    }

    /// Blocks until the classification completes.
    pub fn wait(self) -> ClassifyOutcome {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(ClassificationError::Inference(EngineError::Inference(
                "classification worker exited without a result".to_string(),
            )))
        })
    }

    pub fn try_result(&self) -> Option<ClassifyOutcome> {
        self.receiver.try_recv().ok()
    }
}

pub struct ImageClassifier {
    engine: Arc<dyn LabelEngine + Send + Sync>,
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    inner: Mutex<Inner>,
}

impl ImageClassifier {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        engine: Arc<dyn LabelEngine + Send + Sync>,
    ) -> Self {
        Self {
            engine,
            config,
            logger: logger.with_namespace("classifier"),
            inner: Mutex::new(Inner::Uninitialized),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ClassifierState {
        match *self.inner() {
            Inner::Uninitialized => ClassifierState::Uninitialized,
            Inner::Initializing { .. } => ClassifierState::Initializing,
            Inner::Ready(_) => ClassifierState::Ready,
            Inner::Failed(_) => ClassifierState::Failed,
            Inner::Closed => ClassifierState::Closed,
        }
    }

    /// Loads the bundled model and builds the labeler. A no-op once ready;
    /// after a failure the same error is returned without retrying.
    pub fn initialize(&self) -> Result<(), ClassifierInitError> {
        {
            let mut inner = self.inner();
            match &*inner {
                Inner::Ready(_) => return Ok(()),
                Inner::Failed(e) => return Err(e.clone()),
                Inner::Initializing { .. } => return Err(ClassifierInitError::InProgress),
                Inner::Uninitialized | Inner::Closed => {}
            }
            *inner = Inner::Initializing {
                shutdown_requested: false,
            };
        }

        let _ = self.logger.info(&format!(
            "Loading model {} from {}",
            self.config.model_name,
            self.config.model_path().display()
        ));

        let loaded = self.load_labeler();

        let mut inner = self.inner();

        if matches!(
            *inner,
            Inner::Initializing {
                shutdown_requested: true
            }
        ) {
            *inner = Inner::Closed;
            drop(inner);
            if let Ok(labeler) = loaded {
                self.close_labeler(labeler.as_ref());
            }
            return Err(ClassifierInitError::ShutDown);
        }

        match loaded {
            Ok(labeler) => {
                *inner = Inner::Ready(labeler);
                let _ = self.logger.info(&format!(
                    "Classifier ready (threshold {})",
                    self.config.confidence_threshold
                ));
                Ok(())
            }
            Err(e) => {
                let _ = self
                    .logger
                    .error(&format!("Classifier failed to initialize: {}", e));
                *inner = Inner::Failed(e.clone());
                Err(e)
            }
        }
    }

    fn load_labeler(&self) -> Result<Arc<dyn Labeler>, ClassifierInitError> {
        let model = self
            .engine
            .load_model(&self.config.model_name, &self.config.model_path())
            .map_err(|source| ClassifierInitError::ModelLoad {
                name: self.config.model_name.clone(),
                source,
            })?;

        let labeler = model
            .configure(self.config.confidence_threshold)
            .map_err(ClassifierInitError::Configure)?;

        Ok(Arc::from(labeler))
    }

    /// Runs the labeler on a worker thread. Every outcome, including an
    /// unusable classifier, is delivered through the returned task.
    pub fn classify(&self, image: Arc<CapturedImage>) -> ClassifyTask {
        let labeler = match &*self.inner() {
            Inner::Ready(labeler) => labeler.clone(),
            _ => return ClassifyTask::resolved(Err(ClassificationError::Uninitialized)),
        };

        let (tx, receiver) = channel();
        let failure_tx: Sender<ClassifyOutcome> = tx.clone();
        let threshold = self.config.confidence_threshold;
        let limit = self.config.results_to_show;
        let logger = self.logger.clone();

        let start_time = Instant::now();

        let spawned = std::thread::Builder::new()
            .name("classify".to_string())
            .spawn(move || {
                let labels = labeler.label(&image);
                let latency = start_time.elapsed();

                let outcome = match labels {
                    Ok(labels) => Ok(ClassificationResult::new(labels, latency, threshold, limit)),
                    Err(e) => {
                        let _ = logger.error(&format!("Error classifying frame: {}", e));
                        Err(ClassificationError::Inference(e))
                    }
                };

                let _ = tx.send(outcome);
            });

        if let Err(e) = spawned {
            let _ = failure_tx.send(Err(ClassificationError::Inference(EngineError::Inference(
                e.to_string(),
            ))));
        }

        ClassifyTask { receiver }
    }

    /// Releases the labeler. Safe to call any number of times. While a load
    /// is in flight the close happens as soon as it finishes.
    pub fn shutdown(&self) {
        let previous = {
            let mut inner = self.inner();
            if let Inner::Initializing { shutdown_requested } = &mut *inner {
                *shutdown_requested = true;
                let _ = self
                    .logger
                    .info("Shutdown requested while initializing; closing once loaded");
                return;
            }
            if !matches!(*inner, Inner::Ready(_)) {
                return;
            }
            std::mem::replace(&mut *inner, Inner::Closed)
        };

        if let Inner::Ready(labeler) = previous {
            self.close_labeler(labeler.as_ref());
        }
    }

    fn close_labeler(&self, labeler: &dyn Labeler) {
        match labeler.close() {
            Ok(()) => {
                let _ = self.logger.info("Labeler closed");
            }
            Err(e) => {
                let _ = self
                    .logger
                    .error(&format!("Error closing labeler: {}", e));
            }
        }
    }
}
